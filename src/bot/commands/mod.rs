//! Discord command implementations organized by category.

/// Appointment scheduling commands
pub mod appointment;

/// Discount code commands
pub mod discount;
