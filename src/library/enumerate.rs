//! Asset enumeration — a single forward pass over index rows.

use std::path::Path;

use rusqlite::params_from_iter;
use rusqlite::types::Value;

use crate::classify::{self, ClassifyRow};
use crate::index::queries::{
    asset_projection, push_kind_selection, ALBUM_SELECTION, UPDATED_SINCE_SELECTION,
};
use crate::index::schema::RAW_KIND_IMAGE;
use crate::index::{Capability, ClassifierMarker, IndexError, MediaIndex};

use super::asset::{AssetRecord, EnumeratedAsset};
use super::types::{KindFilter, MediaKind};

/// Row restriction for one enumeration pass.
#[derive(Debug, Clone)]
pub struct AssetFilter {
    pub kinds: KindFilter,
    pub album_id: Option<String>,
    /// Strict cursor: rows qualify when modified-time OR add-time advanced
    /// past it.
    pub updated_since: Option<i64>,
}

impl AssetFilter {
    pub fn new(kinds: KindFilter) -> Self {
        Self {
            kinds,
            album_id: None,
            updated_since: None,
        }
    }

    pub fn album(mut self, album_id: &str) -> Self {
        self.album_id = Some(album_id.to_string());
        self
    }

    pub fn updated_since(mut self, timestamp: i64) -> Self {
        self.updated_since = Some(timestamp);
        self
    }
}

impl Default for AssetFilter {
    fn default() -> Self {
        Self::new(KindFilter::Any)
    }
}

/// Drive one pass over the matching rows, in the index's natural row order,
/// feeding each result to the sink. The pass is lazy and non-restartable;
/// nothing is materialized here.
pub(crate) fn scan_assets(
    index: &MediaIndex,
    filter: &AssetFilter,
    mut sink: impl FnMut(EnumeratedAsset),
) -> Result<(), IndexError> {
    let capability = *index.capability();

    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();
    push_kind_selection(filter.kinds, &mut clauses, &mut params);
    if let Some(album_id) = &filter.album_id {
        clauses.push(ALBUM_SELECTION.to_string());
        params.push(album_id.clone().into());
    }
    if let Some(cursor) = filter.updated_since {
        clauses.push(UPDATED_SINCE_SELECTION.to_string());
        params.push(cursor.into());
        params.push(cursor.into());
    }

    let sql = format!(
        "SELECT {} FROM media_files WHERE {}",
        asset_projection(&capability),
        clauses.join(" AND ")
    );

    let conn = index.lock()?;
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(params), |row| map_row(row, &capability))?;
    for row in rows {
        sink(row?);
    }
    Ok(())
}

/// Collect the ids of every row in an album, valid or not.
pub(crate) fn asset_ids_for_album(
    index: &MediaIndex,
    album_id: &str,
) -> Result<Vec<String>, IndexError> {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Value> = vec![album_id.to_string().into()];
    push_kind_selection(KindFilter::Any, &mut clauses, &mut params);

    let sql = format!(
        "SELECT id FROM media_files WHERE {ALBUM_SELECTION} AND {}",
        clauses.join(" AND ")
    );

    let conn = index.lock()?;
    let mut stmt = conn.prepare(&sql)?;
    let ids = stmt
        .query_map(params_from_iter(params), |row| {
            row.get::<_, i64>(0).map(|id| id.to_string())
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

/// Convert one index row into an enumeration result.
///
/// A row with a blank display name, blank album id, blank path, or a missing
/// backing file becomes an invalid marker — a signal for the caller to prune
/// the id, never an error.
fn map_row(
    row: &rusqlite::Row<'_>,
    capability: &Capability,
) -> rusqlite::Result<EnumeratedAsset> {
    let numeric_id: i64 = row.get("id")?;
    let id = numeric_id.to_string();

    let display_name = non_blank(row.get("display_name")?);
    let bucket_id = non_blank(row.get("bucket_id")?);
    let path = non_blank(row.get("path")?);
    let (display_name, album_id, path) = match (display_name, bucket_id, path) {
        (Some(name), Some(bucket), Some(path)) => (name, bucket, path),
        _ => return Ok(EnumeratedAsset::Invalid { id }),
    };
    if !Path::new(&path).exists() {
        return Ok(EnumeratedAsset::Invalid { id });
    }

    let raw_kind: i64 = row.get("kind")?;
    let kind = MediaKind::from_raw(raw_kind);

    // Taken time is in milliseconds; add and modification times in seconds.
    let taken_at: i64 = row.get("taken_at")?;
    let added_at: i64 = row.get("added_at")?;
    let created_at = if taken_at > 0 { taken_at / 1000 } else { added_at };
    let modified_at: i64 = row.get("modified_at")?;

    let duration_ms: i64 = row.get("duration_ms")?;
    let duration_secs = if raw_kind == RAW_KIND_IMAGE {
        0
    } else {
        duration_ms / 1000
    };

    let is_favorite = if capability.is_favorite {
        row.get::<_, Option<i64>>("is_favorite")?.unwrap_or(0) != 0
    } else {
        false
    };

    let special_format = match capability.marker {
        ClassifierMarker::SpecialFormat => row.get("special_format")?,
        _ => None,
    };
    let xmp: Option<Vec<u8>> = match capability.marker {
        ClassifierMarker::Xmp => row.get("xmp")?,
        _ => None,
    };

    let playback_style = classify::detect_playback_style(
        capability,
        &ClassifyRow {
            raw_kind,
            special_format,
            xmp: xmp.as_deref(),
            path: Path::new(&path),
        },
    );

    Ok(EnumeratedAsset::Valid {
        asset: AssetRecord {
            id,
            display_name,
            kind,
            created_at,
            modified_at,
            width: row.get("width")?,
            height: row.get("height")?,
            duration_secs,
            orientation: row.get("orientation")?,
            is_favorite,
            playback_style,
        },
        album_id,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
