//! Discount code model - One redeemable code in the catalog.
//!
//! Codes are keyed by their uppercase code string in `discount_codes.json`.
//! The `max_uses` field uses `-1` as the unlimited sentinel, matching the
//! historical on-disk format.

use serde::{Deserialize, Serialize};

/// Sentinel value for [`DiscountCode::max_uses`] meaning "no quota".
pub const UNLIMITED_USES: i64 = -1;

/// How a code's value is applied to a price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    /// `value` is a fraction in `[0, 1]` of the base amount.
    Percentage,
    /// `value` is a flat currency amount, capped at the base amount.
    Fixed,
}

/// One redeemable discount code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscountCode {
    /// How the value is applied
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    /// Fraction (percentage) or currency amount (fixed)
    pub value: f64,
    /// Redemption quota; `-1` means unlimited
    pub max_uses: i64,
    /// Successful redemptions so far, monotonically increasing
    #[serde(default)]
    pub current_uses: i64,
    /// User IDs that have already redeemed this code
    #[serde(default)]
    pub used_by: Vec<String>,
    /// Remove the record entirely after its single use (requires `max_uses == 1`)
    #[serde(default)]
    pub auto_delete: bool,
    /// Unix timestamp of creation
    pub created_at: i64,
    /// Free-form admin note shown alongside the code
    #[serde(default)]
    pub description: String,
}

impl DiscountCode {
    /// Whether this code has no redemption quota.
    #[must_use]
    pub const fn is_unlimited(&self) -> bool {
        self.max_uses == UNLIMITED_USES
    }

    /// Whether the quota is spent. Unlimited codes are never exhausted.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        !self.is_unlimited() && self.current_uses >= self.max_uses
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn sample_code() -> DiscountCode {
        DiscountCode {
            kind: DiscountKind::Percentage,
            value: 0.10,
            max_uses: 5,
            current_uses: 0,
            used_by: Vec::new(),
            auto_delete: false,
            created_at: 1_709_856_000,
            description: "Spring promo".to_string(),
        }
    }

    #[test]
    fn test_wire_format_field_names() {
        let json = serde_json::to_value(sample_code()).unwrap();
        assert_eq!(json["type"], "percentage");
        assert_eq!(json["value"], 0.10);
        assert_eq!(json["max_uses"], 5);
        assert_eq!(json["current_uses"], 0);
        assert_eq!(json["used_by"], serde_json::json!([]));
        assert_eq!(json["auto_delete"], false);
        assert_eq!(json["created_at"], 1_709_856_000);
    }

    #[test]
    fn test_optional_fields_default_on_read() {
        // Older records omit the tracking fields entirely.
        let code: DiscountCode = serde_json::from_value(serde_json::json!({
            "type": "fixed",
            "value": 5.0,
            "max_uses": -1,
            "created_at": 1_700_000_000
        }))
        .unwrap();

        assert_eq!(code.kind, DiscountKind::Fixed);
        assert_eq!(code.current_uses, 0);
        assert!(code.used_by.is_empty());
        assert!(!code.auto_delete);
        assert!(code.description.is_empty());
    }

    #[test]
    fn test_exhaustion_checks() {
        let mut code = sample_code();
        assert!(!code.is_exhausted());

        code.current_uses = 5;
        assert!(code.is_exhausted());

        code.max_uses = UNLIMITED_USES;
        assert!(code.is_unlimited());
        assert!(!code.is_exhausted());
    }
}
