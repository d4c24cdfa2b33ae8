//! Asset records produced by enumeration.

use serde::Serialize;

use super::types::{MediaKind, PlaybackStyle};

/// Immutable snapshot of one media item at enumeration time.
///
/// Never mutated after construction — callers re-enumerate to refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRecord {
    /// Identifier unique within the device index.
    pub id: String,
    /// File display name.
    pub display_name: String,
    /// Image or video.
    pub kind: MediaKind,
    /// Seconds since epoch. Taken-time when the platform recorded one,
    /// otherwise the time the item was added to the index.
    pub created_at: i64,
    /// Seconds since epoch.
    pub modified_at: i64,
    /// Pixels.
    pub width: i64,
    /// Pixels.
    pub height: i64,
    /// Whole seconds; 0 for images.
    pub duration_secs: i64,
    /// Degrees.
    pub orientation: i64,
    pub is_favorite: bool,
    pub playback_style: PlaybackStyle,
}

/// One enumerated row: either a usable asset or a marker telling the caller
/// to drop the id from its local view.
///
/// A row is invalid when a required field is blank or the backing file is
/// gone — that is stale-index housekeeping for the caller, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum EnumeratedAsset {
    Valid { asset: AssetRecord, album_id: String },
    Invalid { id: String },
}

impl EnumeratedAsset {
    /// The asset, if this row was valid.
    pub fn into_valid(self) -> Option<AssetRecord> {
        match self {
            Self::Valid { asset, .. } => Some(asset),
            Self::Invalid { .. } => None,
        }
    }

    /// The row's id, valid or not.
    pub fn id(&self) -> &str {
        match self {
            Self::Valid { asset, .. } => &asset.id,
            Self::Invalid { id } => id,
        }
    }
}
