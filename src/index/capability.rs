//! Capability resolution for the platform media index.
//!
//! Different platform generations maintain different index schemas. Rather
//! than scattering version checks through enumeration and classification,
//! the version is resolved once into an explicit [`Capability`] set and
//! everything downstream branches on set membership. An unavailable marker
//! means "skip that classification tier", never an error.

/// Which classifier marker column the index carries, if any.
///
/// The two markers are mutually exclusive: an index new enough to carry the
/// `special_format` column no longer exposes raw XMP blobs to readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierMarker {
    /// No marker columns; classification falls back to probing files.
    None,
    /// The index carries an embedded `xmp` metadata blob per row.
    Xmp,
    /// The index carries a pre-computed `special_format` marker per row.
    SpecialFormat,
}

/// The set of optional signals a given index version provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    /// Marker column available for playback-style classification.
    pub marker: ClassifierMarker,
    /// Whether the index tracks the user's favorite flag.
    pub is_favorite: bool,
}

impl Capability {
    /// Resolve the capability set for an index schema version.
    ///
    /// Pure function of the version; no side effects.
    pub fn resolve(version: i32) -> Self {
        match version {
            v if v >= 3 => Self {
                marker: ClassifierMarker::SpecialFormat,
                is_favorite: true,
            },
            2 => Self {
                marker: ClassifierMarker::Xmp,
                is_favorite: true,
            },
            _ => Self {
                marker: ClassifierMarker::None,
                is_favorite: false,
            },
        }
    }
}
