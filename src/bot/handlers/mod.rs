//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions such as
//! autocomplete suggestions for command parameters.

/// Autocomplete handlers for discount codes and bookable slot keys
pub mod autocomplete;
