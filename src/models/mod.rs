//! Data model module - Contains the serde structs persisted by the JSON store.
//! Each model mirrors the on-disk document format field for field, so a file
//! written by the previous generation of the bot reads back unchanged.

pub mod appointment;
pub mod discount;

pub use appointment::{Appointment, format_slot_key, parse_slot_key};
pub use discount::{DiscountCode, DiscountKind};
