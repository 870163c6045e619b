//! Discount ledger business logic.
//!
//! Validates typed-in codes against the persisted catalog, computes the
//! adjusted price, and tracks per-code quotas and per-user usage. Expected
//! rejections are returned as [`RedeemOutcome`] variants so the interaction
//! layer can message the user; only storage failures surface as errors.
//! Every mutating operation holds the discount-codes mutex across its full
//! load-mutate-save cycle.

use crate::{
    errors::{Error, Result},
    models::{DiscountCode, DiscountKind, discount::UNLIMITED_USES},
    storage::JsonStore,
};
use tracing::info;

/// Details of a successfully applied discount.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedDiscount {
    /// Price after the discount, floored at zero.
    pub new_amount: f64,
    /// Amount subtracted from the base price.
    pub discount_amount: f64,
    /// Human-readable summary of what was applied, suitable for the user.
    pub description: String,
    /// True when the code was a single-use auto-delete code and is now gone
    /// from the catalog entirely.
    pub code_deleted: bool,
}

/// Result of a redemption attempt. All variants besides `Applied` are
/// user-correctable rejections, each independently reportable.
#[derive(Debug, Clone, PartialEq)]
pub enum RedeemOutcome {
    /// The code was valid; the catalog has been updated.
    Applied(AppliedDiscount),
    /// No such code in the catalog.
    NotFound,
    /// The code's redemption quota is spent.
    Exhausted,
    /// This user already redeemed this quota-limited code once.
    AlreadyUsedByUser,
}

/// Redeems `code_text` for `user_id` against `base_amount`.
///
/// Lookup is case-insensitive: the input is trimmed and uppercased first.
/// Unlimited codes (`max_uses == -1`) skip the per-user check entirely; a
/// user may reuse them freely. On success the usage counters are persisted
/// before returning, and a single-use auto-delete code is removed from the
/// catalog rather than left exhausted.
pub async fn redeem(
    store: &JsonStore,
    code_text: &str,
    user_id: &str,
    base_amount: f64,
) -> Result<RedeemOutcome> {
    let code = code_text.trim().to_uppercase();

    let _guard = store.lock_discount_codes().await;
    let mut catalog = store.load_discount_codes().await?;

    let Some(record) = catalog.get_mut(&code) else {
        return Ok(RedeemOutcome::NotFound);
    };

    if record.is_exhausted() {
        return Ok(RedeemOutcome::Exhausted);
    }
    if !record.is_unlimited() && record.used_by.iter().any(|u| u == user_id) {
        return Ok(RedeemOutcome::AlreadyUsedByUser);
    }

    let discount_amount = match record.kind {
        DiscountKind::Percentage => base_amount * record.value,
        // A fixed discount never drives the total negative.
        DiscountKind::Fixed => record.value.min(base_amount),
    };
    let new_amount = (base_amount - discount_amount).max(0.0);

    record.current_uses += 1;
    if !record.used_by.iter().any(|u| u == user_id) {
        record.used_by.push(user_id.to_string());
    }

    let delete_after_use = record.auto_delete && record.max_uses == 1;
    let mut description = match record.kind {
        DiscountKind::Percentage => format!("{} off", format_percent(record.value)),
        DiscountKind::Fixed => format!("${:.2} off", record.value),
    };
    if delete_after_use {
        description.push_str(" (single-use code, now removed)");
        catalog.remove(&code);
    }

    store.save_discount_codes(&catalog).await?;
    info!(%code, user_id, new_amount, deleted = delete_after_use, "discount code redeemed");

    Ok(RedeemOutcome::Applied(AppliedDiscount {
        new_amount,
        discount_amount,
        description,
        code_deleted: delete_after_use,
    }))
}

/// Returns the full catalog as `(code, record)` pairs, sorted by code.
pub async fn list_codes(store: &JsonStore) -> Result<Vec<(String, DiscountCode)>> {
    let catalog = store.load_discount_codes().await?;
    Ok(catalog.into_iter().collect())
}

/// Creates (or re-issues) a discount code after validating its definition.
///
/// The code is uppercased before insertion. Re-adding an existing code
/// replaces it, counters and all; callers that want to refuse duplicates
/// should check [`list_codes`] first.
///
/// # Errors
/// [`Error::InvalidDiscount`] when the value is out of range for its kind,
/// when `max_uses` is neither `-1` nor a positive integer, or when
/// `auto_delete` is requested on anything but a single-use code.
pub async fn add_code(
    store: &JsonStore,
    code_text: &str,
    kind: DiscountKind,
    value: f64,
    max_uses: i64,
    auto_delete: bool,
    description: String,
) -> Result<DiscountCode> {
    let code = code_text.trim().to_uppercase();
    if code.is_empty() {
        return Err(Error::InvalidDiscount {
            message: "code must not be empty".to_string(),
        });
    }
    match kind {
        DiscountKind::Percentage if !(value > 0.0 && value <= 1.0) => {
            return Err(Error::InvalidDiscount {
                message: format!("percentage value must be a fraction in (0, 1], got {value}"),
            });
        }
        DiscountKind::Fixed if value <= 0.0 => {
            return Err(Error::InvalidDiscount {
                message: format!("fixed value must be positive, got {value}"),
            });
        }
        _ => {}
    }
    if max_uses != UNLIMITED_USES && max_uses < 1 {
        return Err(Error::InvalidDiscount {
            message: format!("max_uses must be -1 (unlimited) or at least 1, got {max_uses}"),
        });
    }
    if auto_delete && max_uses != 1 {
        return Err(Error::InvalidDiscount {
            message: "auto_delete requires max_uses == 1".to_string(),
        });
    }

    let record = DiscountCode {
        kind,
        value,
        max_uses,
        current_uses: 0,
        used_by: Vec::new(),
        auto_delete,
        created_at: chrono::Utc::now().timestamp(),
        description,
    };

    let _guard = store.lock_discount_codes().await;
    let mut catalog = store.load_discount_codes().await?;
    catalog.insert(code.clone(), record.clone());
    store.save_discount_codes(&catalog).await?;

    info!(%code, ?kind, value, max_uses, "discount code created");
    Ok(record)
}

/// Deletes a code from the catalog. Returns whether it existed.
pub async fn remove_code(store: &JsonStore, code_text: &str) -> Result<bool> {
    let code = code_text.trim().to_uppercase();

    let _guard = store.lock_discount_codes().await;
    let mut catalog = store.load_discount_codes().await?;

    let existed = catalog.remove(&code).is_some();
    if existed {
        store.save_discount_codes(&catalog).await?;
        info!(%code, "discount code removed");
    }
    Ok(existed)
}

/// Clears a code's usage counters (`current_uses` and `used_by`). Returns
/// whether the code was found. An auto-deleted code is gone for good; this
/// cannot restore it.
pub async fn reset_usage(store: &JsonStore, code_text: &str) -> Result<bool> {
    let code = code_text.trim().to_uppercase();

    let _guard = store.lock_discount_codes().await;
    let mut catalog = store.load_discount_codes().await?;

    let Some(record) = catalog.get_mut(&code) else {
        return Ok(false);
    };
    record.current_uses = 0;
    record.used_by.clear();
    store.save_discount_codes(&catalog).await?;

    info!(%code, "discount code usage reset");
    Ok(true)
}

/// Formats a fraction as a percentage without trailing zero noise,
/// e.g. `0.10` becomes `10%` and `0.125` becomes `12.5%`.
fn format_percent(value: f64) -> String {
    let percent = value * 100.0;
    if (percent - percent.round()).abs() < 1e-9 {
        format!("{percent:.0}%")
    } else {
        format!("{percent:.1}%")
    }
}
