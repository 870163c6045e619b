//! Unified error types for the Haze Visuals bot.
//!
//! Expected business outcomes (a slot already taken, a discount code not
//! found or exhausted) are *not* errors. They are modeled as outcome enums
//! returned inside `Ok(..)` so callers are forced to branch on them. This
//! enum covers the unrecoverable cases only: storage I/O, malformed data,
//! configuration, and framework failures.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem.
        message: String,
    },

    /// The persisted document could not be read or written.
    #[error("Storage error: {message}")]
    Storage {
        /// Human-readable description of the problem.
        message: String,
    },

    /// Underlying filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted document failed to parse or serialize.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A required environment variable is missing or malformed.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Message formatting failed (writing into a reply buffer).
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    /// A slot key did not match the `YYYY-MM-DD_HH:MM` format.
    #[error("Invalid slot key: {key}")]
    InvalidSlotKey {
        /// The offending key as received.
        key: String,
    },

    /// A discount code definition failed validation.
    #[error("Invalid discount code: {message}")]
    InvalidDiscount {
        /// Human-readable description of the problem.
        message: String,
    },

    /// Serenity/Poise framework error.
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Error::Framework(Box::new(value))
    }
}

/// Convenience `Result` type.
pub type Result<T> = std::result::Result<T, Error>;
