//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggestions are best-effort: a storage failure during autocomplete
//! degrades to an empty list rather than surfacing an error mid-typing.

use crate::{bot::Context, core::{discount, scheduler}, models::format_slot_key};

/// Suggests existing discount codes matching the partial input.
///
/// Returns up to 25 codes (the Discord autocomplete limit), sorted
/// alphabetically.
pub async fn autocomplete_discount_code(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let store = &ctx.data().store;

    let Ok(codes) = discount::list_codes(store).await else {
        return Vec::new();
    };

    let partial_upper = partial.to_uppercase();
    codes
        .into_iter()
        .map(|(code, _)| code)
        .filter(|code| code.contains(&partial_upper))
        .take(25)
        .collect()
}

/// Suggests currently bookable slot keys matching the partial input.
pub async fn autocomplete_slot_key(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let store = &ctx.data().store;
    let now = chrono::Local::now().naive_local();

    let Ok(available) = scheduler::list_available_slots(store, now, None).await else {
        return Vec::new();
    };

    available
        .iter()
        .flat_map(|(date, times)| times.iter().map(|&time| format_slot_key(*date, time)))
        .filter(|key| key.contains(partial))
        .take(25)
        .collect()
}
