//! Appointment model - Represents one booked delivery-call slot.
//!
//! Appointments are keyed by their slot key (`YYYY-MM-DD_HH:MM`), which is the
//! uniqueness boundary: the persisted map can hold at most one appointment per
//! key by construction.

use crate::errors::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// One booked slot, stored under its slot key in `appointments.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    /// Discord user ID of the booker
    pub user_id: String,
    /// Display name of the booker at booking time
    pub user_name: String,
    /// Name of the originating order ticket, used for bulk release
    pub ticket_name: String,
    /// When the booking was created
    pub booked_at: NaiveDateTime,
}

/// Formats a `(date, time)` pair as a slot key, e.g. `2024-03-08_18:30`.
#[must_use]
pub fn format_slot_key(date: NaiveDate, time: NaiveTime) -> String {
    format!("{}_{}", date.format("%Y-%m-%d"), time.format("%H:%M"))
}

/// Parses a slot key back into its `(date, time)` pair.
///
/// # Errors
/// Returns [`Error::InvalidSlotKey`] if the key does not match
/// `YYYY-MM-DD_HH:MM`.
pub fn parse_slot_key(key: &str) -> Result<(NaiveDate, NaiveTime)> {
    let invalid = || Error::InvalidSlotKey {
        key: key.to_string(),
    };

    let (date_part, time_part) = key.split_once('_').ok_or_else(invalid)?;
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| invalid())?;
    let time = NaiveTime::parse_from_str(time_part, "%H:%M").map_err(|_| invalid())?;
    Ok((date, time))
}
