//! Error types for sensornode-store.
//!
//! Every variant maps onto one of three failure classes, see [`ErrorKind`]:
//!
//! | Kind | Variants | Caller strategy |
//! |------|----------|-----------------|
//! | [`ErrorKind::Open`] | [`Error::MediumUnavailable`], [`Error::CreateDirectory`], [`Error::Load`] | Retry `open` later |
//! | [`ErrorKind::Open`] | [`Error::InvalidConfig`] | Fix the configuration |
//! | [`ErrorKind::Write`] | [`Error::Persist`], [`Error::Encode`], [`Error::ReadOnly`] | Drop this write, ring state is unchanged |
//! | [`ErrorKind::Query`] | [`Error::Query`] | Report the engine message |
//!
//! The store never retries on its own.

use std::path::PathBuf;

use crate::config::ValidationError;

/// Result type for sensornode-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sensornode-store.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The key/value medium could not be mounted.
    #[error("Storage medium unavailable: {0}")]
    MediumUnavailable(String),

    /// Failed to create the storage directory.
    #[error("Failed to create storage directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The storage configuration was rejected before touching the medium.
    #[error("Invalid storage configuration: {}", join_errors(.0))]
    InvalidConfig(Vec<ValidationError>),

    /// A namespace could not be read from the medium.
    #[error("Failed to load namespace '{namespace}': {source}")]
    Load {
        namespace: String,
        source: std::io::Error,
    },

    /// A namespace could not be written back to the medium.
    #[error("Failed to persist namespace '{namespace}': {source}")]
    Persist {
        namespace: String,
        source: std::io::Error,
    },

    /// A namespace could not be encoded for the medium.
    #[error("Failed to encode namespace '{namespace}': {source}")]
    Encode {
        namespace: String,
        source: serde_json::Error,
    },

    /// A write was attempted through a read-only namespace session.
    #[error("Namespace '{0}' is open read-only")]
    ReadOnly(String),

    /// The relational engine reported a fault; carries the engine's message.
    #[error("Query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// Failure class of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The storage medium is unavailable; the store is unusable until reopened.
    Open,
    /// A single write failed; earlier data is unaffected.
    Write,
    /// The relational engine rejected a statement or hit an I/O fault.
    Query,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MediumUnavailable(_)
            | Error::CreateDirectory { .. }
            | Error::Load { .. }
            | Error::InvalidConfig(_) => ErrorKind::Open,
            Error::Persist { .. } | Error::Encode { .. } | Error::ReadOnly(_) => {
                ErrorKind::Write
            }
            Error::Query(_) => ErrorKind::Query,
        }
    }

    /// Whether the caller may reasonably retry the failed operation.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Open && !matches!(self, Error::InvalidConfig(_))
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
