//! Error types for the hashing pipeline.
//!
//! Item-level failures and batch-level cancellation are deliberately
//! separate classes: a failed item becomes a message embedded in its
//! [`HashResult`](super::HashResult) and the batch still completes, while
//! cancellation is the one terminal outcome for a whole batch.

use thiserror::Error;

/// Terminal outcome of a superseded or explicitly cancelled batch.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Hashing operation was cancelled")]
pub struct HashingCancelled;

/// Per-item failure, recovered locally and surfaced as data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum ItemError {
    #[error("Cannot open input stream for asset")]
    CannotOpen,

    #[error("Permission denied accessing asset: {0}")]
    PermissionDenied(String),

    #[error("Failed to hash asset: {0}")]
    Io(String),
}

impl ItemError {
    /// Classify a failure to open the asset's backing file.
    pub fn from_open(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => Self::CannotOpen,
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(e.to_string()),
            _ => Self::Io(e.to_string()),
        }
    }

    /// Classify a failure while streaming the asset's bytes.
    pub fn from_read(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(e.to_string()),
            _ => Self::Io(e.to_string()),
        }
    }
}
