//! Device media library — enumeration, album grouping, and differential
//! queries over the platform media index.
//!
//! Everything here runs synchronously on the caller's thread: these are
//! bounded, index- and filesystem-bound single-pass operations with no
//! internal parallelism. No state is persisted — every call re-derives its
//! result from the live index.

mod album;
mod asset;
mod differential;
mod enumerate;
mod types;

pub use album::AlbumRecord;
pub use asset::{AssetRecord, EnumeratedAsset};
pub use enumerate::AssetFilter;
pub use types::{KindFilter, MediaKind, PlaybackStyle};

use std::sync::Arc;

use crate::index::{IndexError, MediaIndex};

/// Enumeration surface of the sync engine.
#[derive(Debug, Clone)]
pub struct DeviceLibrary {
    index: Arc<MediaIndex>,
}

impl DeviceLibrary {
    pub fn new(index: Arc<MediaIndex>) -> Self {
        Self { index }
    }

    /// Run one enumeration pass, feeding each row's result to `sink` in the
    /// index's natural row order. The pass is lazy, finite, and
    /// non-restartable; a bad row becomes an [`EnumeratedAsset::Invalid`]
    /// marker and the pass continues.
    pub fn enumerate(
        &self,
        filter: &AssetFilter,
        sink: impl FnMut(EnumeratedAsset),
    ) -> Result<(), IndexError> {
        enumerate::scan_assets(&self.index, filter, sink)
    }

    /// All albums, with derived member counts, ordered by album id.
    pub fn list_albums(&self) -> Result<Vec<AlbumRecord>, IndexError> {
        album::list_albums(&self.index)
    }

    /// Ids of every row in an album, valid or not.
    pub fn asset_ids_for_album(&self, album_id: &str) -> Result<Vec<String>, IndexError> {
        enumerate::asset_ids_for_album(&self.index, album_id)
    }

    /// Number of rows in an album added strictly after `timestamp`.
    pub fn assets_count_since(&self, album_id: &str, timestamp: i64) -> Result<i64, IndexError> {
        differential::assets_count_since(&self.index, album_id, timestamp)
    }

    /// Valid assets of an album; with a cursor, only rows whose
    /// modified-time or add-time advanced strictly past it.
    pub fn assets_for_album(
        &self,
        album_id: &str,
        updated_time_cond: Option<i64>,
    ) -> Result<Vec<AssetRecord>, IndexError> {
        differential::assets_for_album(&self.index, album_id, updated_time_cond)
    }
}
