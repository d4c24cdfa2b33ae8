//! Platform media index access.
//!
//! The media index is a SQLite database maintained by the platform's media
//! scanner; the engine treats it as a read-only catalog and re-derives every
//! result from it at call time. The index's schema version (carried in the
//! `user_version` pragma) determines which optional columns are present —
//! resolved once into a [`Capability`] set at open.

pub mod capability;
pub mod error;
pub mod queries;
pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OpenFlags};

pub use capability::{Capability, ClassifierMarker};
pub use error::IndexError;

/// Handle to the platform media index.
///
/// Wrapped in a `Mutex` because `rusqlite::Connection` is not `Sync`; all
/// engine queries are short, synchronous, single-pass reads.
pub struct MediaIndex {
    conn: Mutex<Connection>,
    capability: Capability,
    version: i32,
    path: PathBuf,
}

impl std::fmt::Debug for MediaIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaIndex")
            .field("path", &self.path)
            .field("version", &self.version)
            .field("capability", &self.capability)
            .finish_non_exhaustive()
    }
}

impl MediaIndex {
    /// Open an existing media index read-only.
    ///
    /// Rejects files the platform has never initialized (version 0) and
    /// versions newer than the engine understands.
    pub fn open(path: &Path) -> Result<Self, IndexError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| IndexError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;

        let version = schema::get_index_version(&conn)?;
        Self::from_connection(conn, version, path.to_path_buf())
    }

    /// Open an in-memory index initialized at the given schema version.
    #[cfg(test)]
    pub(crate) fn open_in_memory(version: i32) -> Result<Self, IndexError> {
        let conn = Connection::open_in_memory().map_err(|e| IndexError::Open {
            path: PathBuf::from(":memory:"),
            source: e,
        })?;
        schema::initialize(&conn, version)?;
        Self::from_connection(conn, version, PathBuf::from(":memory:"))
    }

    fn from_connection(
        conn: Connection,
        version: i32,
        path: PathBuf,
    ) -> Result<Self, IndexError> {
        if version < schema::MIN_INDEX_VERSION {
            return Err(IndexError::Uninitialized { path });
        }
        if version > schema::MAX_INDEX_VERSION {
            return Err(IndexError::UnsupportedVersion {
                found: version,
                supported: schema::MAX_INDEX_VERSION,
            });
        }

        let capability = Capability::resolve(version);
        tracing::debug!(
            version,
            ?capability,
            "Opened media index at {}",
            path.display()
        );

        Ok(Self {
            conn: Mutex::new(conn),
            capability,
            version,
            path,
        })
    }

    /// The capability set resolved from the index version.
    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    /// The index schema version.
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Lock the underlying connection for a single query pass.
    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>, IndexError> {
        self.conn.lock().map_err(|_| IndexError::Poisoned)
    }

    /// Run rows of a test fixture through the index connection.
    #[cfg(test)]
    pub(crate) fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> T) -> T {
        let conn = self.conn.lock().expect("index lock");
        f(&conn)
    }
}
