//! # Validation Errors
//!
//! Field-level validation failures raised while constructing core values.
//! Each variant names the offending field so callers can surface it
//! unchanged.

use thiserror::Error;

/// A value failed a structural validation rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A timestamp string could not be parsed or was not UTC.
    #[error("invalid timestamp {value:?}: {reason}")]
    Timestamp {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A number space configuration is unusable.
    #[error("invalid number space: {0}")]
    NumberSpace(String),

    /// A selection number did not fit the raffle's number space.
    #[error("invalid selection number {value:?}: {reason}")]
    SelectionNumber {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}
