//! Error types for the Strata client
//!
//! All failures a caller can observe are represented by [`Error`]. Errors are:
//! - **Structured**: each variant carries a human-readable reason
//! - **Cloneable**: a completed future hands its cause to every observer
//! - **Serializable**: errors attached by an engine can cross a wire boundary
//!
//! Contract violations (a future completed twice, a mutation attached to two
//! parents) are defects, not errors: they are either unrepresentable or they
//! panic.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Client errors.
///
/// # Categories
///
/// | Category | Variants | Raised |
/// |----------|----------|--------|
/// | Validation | `InvalidInput` | synchronously, by a builder's `build()` |
/// | Conversion | `Conversion` | by a future adapter's conversion step |
/// | Engine | `Transport`, `Remote`, `Rejected`, `Internal` | attached by the engine to its future |
/// | Cancellation | `Cancelled` | when reading a cancelled future |
/// | Serialization | `Serialization` | config files, wire objects |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum Error {
    // ==================== Validation ====================
    /// A required parameter is missing or invalid
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    // ==================== Conversion ====================
    /// An engine response could not be converted into the client type
    #[error("conversion failed: {reason}")]
    Conversion { reason: String },

    // ==================== Engine ====================
    /// The engine could not reach the cluster
    #[error("transport error: {reason}")]
    Transport { reason: String },

    /// The cluster answered with an error
    #[error("remote error: {reason}")]
    Remote { reason: String },

    /// The engine refused the submission (queue full or shut down)
    #[error("operation rejected: {reason}")]
    Rejected { reason: String },

    /// Engine bug or invariant violation
    #[error("internal error: {reason}")]
    Internal { reason: String },

    // ==================== Cancellation ====================
    /// The operation was cancelled before it started
    #[error("operation cancelled")]
    Cancelled,

    // ==================== Serialization ====================
    /// A wire object or config file could not be encoded or decoded
    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

impl Error {
    /// Create an `InvalidInput` error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create a `Conversion` error.
    pub fn conversion(reason: impl Into<String>) -> Self {
        Error::Conversion {
            reason: reason.into(),
        }
    }

    /// Create a `Serialization` error.
    pub fn serialization(reason: impl Into<String>) -> Self {
        Error::Serialization {
            reason: reason.into(),
        }
    }

    /// Create an `Internal` error.
    pub fn internal(reason: impl Into<String>) -> Self {
        Error::Internal {
            reason: reason.into(),
        }
    }

    /// True if this error was raised while validating a builder.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::InvalidInput { .. })
    }

    /// True if this error was attached by the engine rather than the client.
    pub fn is_engine(&self) -> bool {
        matches!(
            self,
            Error::Transport { .. }
                | Error::Remote { .. }
                | Error::Rejected { .. }
                | Error::Internal { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::serialization(e.to_string())
    }
}

/// Returned when a terminal-state cell is completed a second time.
///
/// The first outcome is kept; the rejected one is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("future already completed")]
pub struct AlreadyCompleted;
