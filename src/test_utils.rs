//! Shared test utilities for the Haze Visuals bot.
//!
//! Provides helpers for setting up throwaway on-disk stores and seeding
//! them with appointments and discount codes with sensible defaults.

use crate::{
    errors::Result,
    models::{Appointment, DiscountCode, DiscountKind},
    storage::JsonStore,
};
use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

/// Creates a [`JsonStore`] rooted in a fresh temporary directory.
///
/// The [`TempDir`] must be kept alive for the duration of the test; the
/// directory is deleted when it drops.
pub fn setup_test_store() -> Result<(JsonStore, TempDir)> {
    let dir = tempfile::tempdir()?;
    let store = JsonStore::new(dir.path())?;
    Ok((store, dir))
}

/// Builds a `NaiveDateTime` from its parts. Panics on invalid input, which
/// in a test is exactly what we want.
#[allow(clippy::unwrap_used)]
#[must_use]
pub fn dt(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, min, sec)
        .unwrap()
}

/// An appointment with placeholder identity fields for the given ticket.
#[must_use]
pub fn sample_appointment(ticket_name: &str) -> Appointment {
    Appointment {
        user_id: "100000000000000000".to_string(),
        user_name: "Test User".to_string(),
        ticket_name: ticket_name.to_string(),
        booked_at: dt(2024, 3, 1, 12, 0, 0),
    }
}

/// A percentage code with empty usage tracking.
#[must_use]
pub fn percentage_code(value: f64, max_uses: i64) -> DiscountCode {
    DiscountCode {
        kind: DiscountKind::Percentage,
        value,
        max_uses,
        current_uses: 0,
        used_by: Vec::new(),
        auto_delete: false,
        created_at: 1_709_000_000,
        description: String::new(),
    }
}

/// A fixed-amount code with empty usage tracking.
#[must_use]
pub fn fixed_code(value: f64, max_uses: i64) -> DiscountCode {
    DiscountCode {
        kind: DiscountKind::Fixed,
        ..percentage_code(value, max_uses)
    }
}

/// Inserts a code into the store's catalog under the given (uppercase) key.
pub async fn seed_code(store: &JsonStore, code: &str, record: DiscountCode) -> Result<()> {
    let mut catalog = store.load_discount_codes().await?;
    catalog.insert(code.to_string(), record);
    store.save_discount_codes(&catalog).await
}
