//! Error taxonomy for provider operations.
//!
//! Lookups of missing paths are not errors; they return an absent record.
//! These variants are reserved for misuse and capability mismatches.

use thiserror::Error;

/// Result type for provider operations.
pub type VfsResult<T> = Result<T, VfsError>;

/// Provider operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VfsError {
    /// Reading content from a record that does not exist.
    #[error("file not found: {0}")]
    NotFound(String),
    /// Reading content from a directory, or wrapping a provider that is
    /// already writable.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    /// A disk path that would escape the provider's root.
    #[error("{0} would escape root directory")]
    OutOfRange(String),
    /// The provider exposes neither write capability.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    #[error("operation cancelled")]
    Cancelled,
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for VfsError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => VfsError::NotFound(err.to_string()),
            _ => VfsError::Io(err.to_string()),
        }
    }
}
