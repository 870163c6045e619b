//! Discount Discord commands - redemption and catalog administration.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, handlers::autocomplete},
        core::discount::{self, RedeemOutcome},
        errors::{Error, Result},
        models::{DiscountKind, discount::UNLIMITED_USES},
    };
    use std::fmt::Write;

    /// Slash-command choice wrapper for [`DiscountKind`].
    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum DiscountKindChoice {
        #[name = "percentage"]
        Percentage,
        #[name = "fixed"]
        Fixed,
    }

    impl From<DiscountKindChoice> for DiscountKind {
        fn from(choice: DiscountKindChoice) -> Self {
            match choice {
                DiscountKindChoice::Percentage => DiscountKind::Percentage,
                DiscountKindChoice::Fixed => DiscountKind::Fixed,
            }
        }
    }

    fn format_quota(current_uses: i64, max_uses: i64) -> String {
        if max_uses == UNLIMITED_USES {
            format!("{current_uses}/∞")
        } else {
            format!("{current_uses}/{max_uses}")
        }
    }

    /// Applies a discount code to an order amount.
    ///
    /// Codes are case-insensitive. Each rejection reason gets its own
    /// message so users know whether to fix a typo or give up.
    #[poise::command(slash_command)]
    pub async fn redeem(
        ctx: Context<'_>,
        #[description = "Discount code"] code: String,
        #[description = "Order amount before discount"] amount: f64,
    ) -> Result<()> {
        if amount.is_nan() || amount.is_infinite() || amount < 0.0 {
            ctx.say("❌ Amount must be a non-negative number.").await?;
            return Ok(());
        }

        let store = &ctx.data().store;
        let user_id = ctx.author().id.to_string();

        match discount::redeem(store, &code, &user_id, amount).await? {
            RedeemOutcome::Applied(applied) => {
                let mut response = format!(
                    "✅ **{}** applied: ${:.2} → ${:.2} ({})",
                    code.trim().to_uppercase(),
                    amount,
                    applied.new_amount,
                    applied.description
                );
                if applied.code_deleted {
                    response.push_str("\nℹ️ That was a single-use code; it has been retired.");
                }
                ctx.say(response).await?;
            }
            RedeemOutcome::NotFound => {
                ctx.say("❌ Unknown code. Check the spelling and try again.")
                    .await?;
            }
            RedeemOutcome::Exhausted => {
                ctx.say("❌ That code has reached its usage limit.").await?;
            }
            RedeemOutcome::AlreadyUsedByUser => {
                ctx.say("❌ You have already used that code.").await?;
            }
        }
        Ok(())
    }

    /// Lists every discount code with its usage counters (admin overview).
    #[poise::command(slash_command, required_permissions = "ADMINISTRATOR")]
    pub async fn discounts(ctx: Context<'_>) -> Result<()> {
        let store = &ctx.data().store;

        let codes = discount::list_codes(store).await?;
        if codes.is_empty() {
            ctx.say("📂 No discount codes configured. Create one with `/discount_add`.")
                .await?;
            return Ok(());
        }

        let mut response = String::from("📂 **Discount Codes**\n\n");
        for (code, record) in codes {
            let value = match record.kind {
                DiscountKind::Percentage => format!("{:.0}%", record.value * 100.0),
                DiscountKind::Fixed => format!("${:.2}", record.value),
            };
            let flags = if record.auto_delete { ", auto-delete" } else { "" };
            writeln!(
                &mut response,
                "• **{code}** - {value} off, used {}{flags}{}",
                format_quota(record.current_uses, record.max_uses),
                if record.description.is_empty() {
                    String::new()
                } else {
                    format!(" - {}", record.description)
                }
            )?;
        }
        ctx.say(response).await?;
        Ok(())
    }

    /// Creates a new discount code.
    ///
    /// Percentage values are fractions (0.1 for 10%); fixed values are
    /// currency amounts. `max_uses` of -1 means unlimited.
    #[poise::command(slash_command, required_permissions = "ADMINISTRATOR")]
    pub async fn discount_add(
        ctx: Context<'_>,
        #[description = "Code text (stored uppercase)"] code: String,
        #[description = "Discount kind"] kind: DiscountKindChoice,
        #[description = "Fraction (percentage) or amount (fixed)"] value: f64,
        #[description = "Usage quota, -1 for unlimited (default: unlimited)"] max_uses: Option<i64>,
        #[description = "Delete the code after its single use (default: false)"] auto_delete: Option<bool>,
        #[description = "Admin note shown in listings"] description: Option<String>,
    ) -> Result<()> {
        let store = &ctx.data().store;
        let max_uses = max_uses.unwrap_or(UNLIMITED_USES);
        let normalized = code.trim().to_uppercase();

        // Refuse silent replacement; re-issuing means removing first.
        let existing = discount::list_codes(store).await?;
        if existing.iter().any(|(c, _)| *c == normalized) {
            ctx.say(format!(
                "❌ Code **{normalized}** already exists. Remove it first with `/discount_remove`."
            ))
            .await?;
            return Ok(());
        }

        let result = discount::add_code(
            store,
            &code,
            kind.into(),
            value,
            max_uses,
            auto_delete.unwrap_or(false),
            description.unwrap_or_default(),
        )
        .await;

        match result {
            Ok(record) => {
                let value_str = match record.kind {
                    DiscountKind::Percentage => format!("{:.0}%", record.value * 100.0),
                    DiscountKind::Fixed => format!("${:.2}", record.value),
                };
                ctx.say(format!(
                    "✅ Created code **{normalized}**: {value_str} off, quota {}.",
                    format_quota(0, record.max_uses)
                ))
                .await?;
            }
            Err(Error::InvalidDiscount { message }) => {
                ctx.say(format!("❌ Invalid code definition: {message}")).await?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Deletes a discount code permanently.
    #[poise::command(slash_command, required_permissions = "ADMINISTRATOR")]
    pub async fn discount_remove(
        ctx: Context<'_>,
        #[description = "Code to delete"]
        #[autocomplete = "autocomplete::autocomplete_discount_code"]
        code: String,
    ) -> Result<()> {
        let store = &ctx.data().store;

        if discount::remove_code(store, &code).await? {
            ctx.say(format!("✅ Removed code **{}**.", code.trim().to_uppercase()))
                .await?;
        } else {
            ctx.say(format!("❌ Code **{}** not found.", code.trim().to_uppercase()))
                .await?;
        }
        Ok(())
    }

    /// Resets a code's usage counters so it can be redeemed again.
    #[poise::command(slash_command, required_permissions = "ADMINISTRATOR")]
    pub async fn discount_reset(
        ctx: Context<'_>,
        #[description = "Code to reset"]
        #[autocomplete = "autocomplete::autocomplete_discount_code"]
        code: String,
    ) -> Result<()> {
        let store = &ctx.data().store;

        if discount::reset_usage(store, &code).await? {
            ctx.say(format!(
                "✅ Reset usage for code **{}**.",
                code.trim().to_uppercase()
            ))
            .await?;
        } else {
            ctx.say(format!("❌ Code **{}** not found.", code.trim().to_uppercase()))
                .await?;
        }
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
