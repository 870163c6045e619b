//! Core business logic - framework-agnostic scheduling and discount operations.
//! Nothing in here knows about Discord; every function takes the store handle
//! plus primitive arguments and returns a value or a tagged outcome.

/// Discount ledger: redemption state machine and catalog administration
pub mod discount;
/// Appointment scheduler: slot catalog, booking, release, weekly cleanup
pub mod scheduler;
