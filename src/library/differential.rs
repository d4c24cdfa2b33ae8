//! Differential queries — enumeration restricted to items that changed
//! after a caller-supplied cursor.

use rusqlite::params_from_iter;
use rusqlite::types::Value;

use crate::index::queries::{push_kind_selection, ADDED_SINCE_SELECTION, ALBUM_SELECTION};
use crate::index::{IndexError, MediaIndex};

use super::asset::AssetRecord;
use super::enumerate::{scan_assets, AssetFilter};
use super::types::KindFilter;

/// Count the rows in an album added strictly after `timestamp`.
pub(crate) fn assets_count_since(
    index: &MediaIndex,
    album_id: &str,
    timestamp: i64,
) -> Result<i64, IndexError> {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Value> = vec![album_id.to_string().into(), timestamp.into()];
    push_kind_selection(KindFilter::Any, &mut clauses, &mut params);

    let sql = format!(
        "SELECT COUNT(*) FROM media_files \
         WHERE {ALBUM_SELECTION} AND {ADDED_SINCE_SELECTION} AND {}",
        clauses.join(" AND ")
    );

    let conn = index.lock()?;
    let count = conn.query_row(&sql, params_from_iter(params), |row| row.get(0))?;
    Ok(count)
}

/// List the valid assets of an album, optionally restricted to rows whose
/// modified-time or add-time advanced past `updated_time_cond`.
///
/// Invalid rows are filtered out here, unlike raw enumeration which
/// surfaces them.
pub(crate) fn assets_for_album(
    index: &MediaIndex,
    album_id: &str,
    updated_time_cond: Option<i64>,
) -> Result<Vec<AssetRecord>, IndexError> {
    let mut filter = AssetFilter::new(KindFilter::Any).album(album_id);
    if let Some(cursor) = updated_time_cond {
        filter = filter.updated_since(cursor);
    }

    let mut assets = Vec::new();
    scan_assets(index, &filter, |row| {
        if let Some(asset) = row.into_valid() {
            assets.push(asset);
        }
    })?;
    Ok(assets)
}
