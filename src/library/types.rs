//! Public enums shared across the library surface.

use serde::{Deserialize, Serialize};

use crate::index::schema::{RAW_KIND_IMAGE, RAW_KIND_VIDEO};

/// Media kind of an asset, with the engine's wire codes.
///
/// The platform index stores its own historical kind codes; the enumerator
/// maps them here. Anything unrecognized maps to `Unknown` — the kind filter
/// should make that impossible, but a defensive default beats a bad row
/// aborting enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Unknown,
    Image,
    Video,
}

impl MediaKind {
    /// Engine wire code: image = 1, video = 2, unknown = 0.
    pub fn code(&self) -> i64 {
        match self {
            Self::Unknown => 0,
            Self::Image => 1,
            Self::Video => 2,
        }
    }

    /// Map a raw platform kind code to the engine's kind.
    pub(crate) fn from_raw(raw: i64) -> Self {
        match raw {
            RAW_KIND_IMAGE => Self::Image,
            RAW_KIND_VIDEO => Self::Video,
            _ => Self::Unknown,
        }
    }
}

/// How an asset should be rendered during playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStyle {
    Image,
    ImageAnimated,
    LivePhoto,
    Video,
    Unknown,
}

impl PlaybackStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::ImageAnimated => "image_animated",
            Self::LivePhoto => "live_photo",
            Self::Video => "video",
            Self::Unknown => "unknown",
        }
    }
}

/// Media-kind restriction for an enumeration pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindFilter {
    Image,
    Video,
    /// Both images and videos.
    Any,
}
