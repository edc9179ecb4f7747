//! Error types for value parsing in sensornode-types.

use thiserror::Error;

/// Errors that can occur when building measurement values from text.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// A display timestamp did not match `dd/mm/YYYY HH:MM:SS`.
    #[error("Invalid timestamp '{input}': {reason}")]
    InvalidTimestamp {
        /// The rejected input.
        input: String,
        /// What the parser complained about.
        reason: String,
    },
}

/// Result type alias using sensornode-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
