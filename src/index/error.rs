//! Error types for media index access.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while opening or querying the platform media index.
#[derive(Error, Debug)]
pub enum IndexError {
    /// Failed to open the index database file.
    #[error("Failed to open media index at {path}: {source}")]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },

    /// The index file exists but has never been initialized by the platform.
    #[error("Media index at {path} is uninitialized")]
    Uninitialized { path: PathBuf },

    /// The index schema version is newer than this engine supports.
    #[error("Media index version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: i32, supported: i32 },

    /// A query against the index failed.
    #[error("Media index query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// The connection lock was poisoned by a panicking thread.
    #[error("Media index connection is poisoned")]
    Poisoned,
}
