//! Album aggregation.

use std::collections::HashMap;

use rusqlite::params_from_iter;
use rusqlite::types::Value;
use serde::Serialize;

use crate::index::queries::{push_kind_selection, HAS_ALBUM_SELECTION};
use crate::index::{IndexError, MediaIndex};

use super::types::KindFilter;

/// Display name used when the index reports no name for an album. The
/// platform commonly leaves the root directory's bucket unnamed.
pub(crate) const DEFAULT_ALBUM_NAME: &str = "Internal Storage";

/// One album as reported by the media index, with a derived member count.
///
/// Recomputed on every call; the engine caches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumRecord {
    pub id: String,
    pub display_name: String,
    /// Modification time (seconds since epoch) of the album's most recently
    /// modified row.
    pub last_modified_at: i64,
    /// Local albums are never shared.
    pub is_shared: bool,
    /// Number of rows carrying this album id, valid and invalid alike.
    pub asset_count: i64,
}

/// Group all image/video rows by album id.
///
/// The intake pass runs in modification-time-descending order so the first
/// occurrence of each album decides its display name and timestamp; the
/// final list is re-sorted by album id ascending.
pub(crate) fn list_albums(index: &MediaIndex) -> Result<Vec<AlbumRecord>, IndexError> {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();
    push_kind_selection(KindFilter::Any, &mut clauses, &mut params);

    let sql = format!(
        "SELECT bucket_id, bucket_name, modified_at FROM media_files \
         WHERE {HAS_ALBUM_SELECTION} AND {} ORDER BY modified_at DESC",
        clauses.join(" AND ")
    );

    let conn = index.lock()?;
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(params))?;

    let mut albums: Vec<AlbumRecord> = Vec::new();
    let mut counts: HashMap<String, i64> = HashMap::new();
    while let Some(row) = rows.next()? {
        let id: String = row.get(0)?;
        let count = counts.entry(id.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            continue;
        }

        let name: Option<String> = row.get(1)?;
        let display_name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ALBUM_NAME.to_string());
        albums.push(AlbumRecord {
            id,
            display_name,
            last_modified_at: row.get(2)?,
            is_shared: false,
            asset_count: 0,
        });
    }

    for album in &mut albums {
        album.asset_count = counts.get(&album.id).copied().unwrap_or(0);
    }
    albums.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(albums)
}
