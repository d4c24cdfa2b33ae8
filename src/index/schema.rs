//! Media index schema definitions.
//!
//! The index file itself is owned by the platform's media scanner; the
//! engine only reads it. The DDL lives here so that platform tooling and
//! tests can stand up an index at any supported schema version, and so the
//! column set for each version is documented in one place.

use rusqlite::Connection;

use super::error::IndexError;

/// Oldest index schema version the engine can read.
pub const MIN_INDEX_VERSION: i32 = 1;

/// Newest index schema version the engine understands.
pub const MAX_INDEX_VERSION: i32 = 3;

/// Base schema: every index version carries these columns.
const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS media_files (
    id INTEGER PRIMARY KEY,
    path TEXT,
    display_name TEXT,
    taken_at INTEGER DEFAULT 0,
    added_at INTEGER NOT NULL,
    modified_at INTEGER NOT NULL,
    kind INTEGER NOT NULL,
    bucket_id TEXT,
    bucket_name TEXT,
    width INTEGER DEFAULT 0,
    height INTEGER DEFAULT 0,
    duration_ms INTEGER DEFAULT 0,
    orientation INTEGER DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_media_files_bucket ON media_files(bucket_id);
CREATE INDEX IF NOT EXISTS idx_media_files_kind ON media_files(kind);
"#;

/// v2 additions: favorite flag and embedded XMP metadata blob.
const SCHEMA_V2: &str = r#"
ALTER TABLE media_files ADD COLUMN is_favorite INTEGER DEFAULT 0;
ALTER TABLE media_files ADD COLUMN xmp BLOB;
"#;

/// v3 additions: pre-computed special-format marker.
const SCHEMA_V3: &str = r#"
ALTER TABLE media_files ADD COLUMN special_format INTEGER;
"#;

/// Raw media-kind code the platform writes for still images.
pub const RAW_KIND_IMAGE: i64 = 1;

/// Raw media-kind code the platform writes for videos.
pub const RAW_KIND_VIDEO: i64 = 3;

/// `special_format` marker value for GIFs.
pub const SPECIAL_FORMAT_GIF: i64 = 1;

/// `special_format` marker value for motion photos.
pub const SPECIAL_FORMAT_MOTION_PHOTO: i64 = 2;

/// `special_format` marker value for animated WebP images.
pub const SPECIAL_FORMAT_ANIMATED_WEBP: i64 = 3;

/// Read the schema version from the `user_version` pragma.
pub(crate) fn get_index_version(conn: &Connection) -> Result<i32, IndexError> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

/// Initialize an empty database as a media index at the given version.
///
/// Idempotent per version step. Intended for platform tooling and tests;
/// the engine itself never creates or upgrades an index.
pub fn initialize(conn: &Connection, version: i32) -> Result<(), IndexError> {
    if !(MIN_INDEX_VERSION..=MAX_INDEX_VERSION).contains(&version) {
        return Err(IndexError::UnsupportedVersion {
            found: version,
            supported: MAX_INDEX_VERSION,
        });
    }

    conn.execute_batch(SCHEMA_V1)?;
    if version >= 2 {
        conn.execute_batch(SCHEMA_V2)?;
    }
    if version >= 3 {
        conn.execute_batch(SCHEMA_V3)?;
    }
    conn.pragma_update(None, "user_version", version)?;
    tracing::debug!("Initialized media index schema at version {}", version);
    Ok(())
}

/// Test fixture: one row of the `media_files` table with usable defaults.
#[cfg(test)]
pub(crate) struct RowFixture {
    pub id: i64,
    pub path: String,
    pub display_name: String,
    pub taken_at: i64,
    pub added_at: i64,
    pub modified_at: i64,
    pub kind: i64,
    pub bucket_id: String,
    pub bucket_name: String,
    pub width: i64,
    pub height: i64,
    pub duration_ms: i64,
    pub orientation: i64,
    pub is_favorite: bool,
    pub xmp: Option<Vec<u8>>,
    pub special_format: Option<i64>,
}

#[cfg(test)]
impl RowFixture {
    pub fn image(id: i64, path: &str) -> Self {
        Self {
            id,
            path: path.to_string(),
            display_name: format!("IMG_{id:04}.jpg"),
            taken_at: 0,
            added_at: 1_700_000_000,
            modified_at: 1_700_000_000,
            kind: RAW_KIND_IMAGE,
            bucket_id: "100".to_string(),
            bucket_name: "Camera".to_string(),
            width: 4000,
            height: 3000,
            duration_ms: 0,
            orientation: 0,
            is_favorite: false,
            xmp: None,
            special_format: None,
        }
    }

    pub fn video(id: i64, path: &str) -> Self {
        Self {
            display_name: format!("VID_{id:04}.mp4"),
            kind: RAW_KIND_VIDEO,
            duration_ms: 12_500,
            ..Self::image(id, path)
        }
    }

    pub fn bucket(mut self, id: &str, name: &str) -> Self {
        self.bucket_id = id.to_string();
        self.bucket_name = name.to_string();
        self
    }

    /// Insert the row, writing only the columns the given version carries.
    pub fn insert(&self, conn: &Connection, version: i32) {
        let mut columns = vec![
            "id",
            "path",
            "display_name",
            "taken_at",
            "added_at",
            "modified_at",
            "kind",
            "bucket_id",
            "bucket_name",
            "width",
            "height",
            "duration_ms",
            "orientation",
        ];
        let mut values: Vec<rusqlite::types::Value> = vec![
            self.id.into(),
            self.path.clone().into(),
            self.display_name.clone().into(),
            self.taken_at.into(),
            self.added_at.into(),
            self.modified_at.into(),
            self.kind.into(),
            self.bucket_id.clone().into(),
            self.bucket_name.clone().into(),
            self.width.into(),
            self.height.into(),
            self.duration_ms.into(),
            self.orientation.into(),
        ];
        if version >= 2 {
            columns.push("is_favorite");
            values.push(i64::from(self.is_favorite).into());
            columns.push("xmp");
            values.push(match &self.xmp {
                Some(blob) => rusqlite::types::Value::Blob(blob.clone()),
                None => rusqlite::types::Value::Null,
            });
        }
        if version >= 3 {
            columns.push("special_format");
            values.push(match self.special_format {
                Some(v) => v.into(),
                None => rusqlite::types::Value::Null,
            });
        }

        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO media_files ({}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        );
        conn.execute(&sql, rusqlite::params_from_iter(values))
            .expect("fixture insert");
    }
}
