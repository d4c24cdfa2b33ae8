//! Selection and projection fragments for media index queries.
//!
//! Centralized so every query agrees on which columns exist per capability
//! tier — selecting a column an older index doesn't carry is a hard query
//! error, not a NULL.

use rusqlite::types::Value;

use super::capability::{Capability, ClassifierMarker};
use super::schema::{RAW_KIND_IMAGE, RAW_KIND_VIDEO};
use crate::library::KindFilter;

/// Columns every index version carries, in the order the enumerator reads them.
const BASE_PROJECTION: &[&str] = &[
    "id",
    "path",
    "display_name",
    "taken_at",
    "added_at",
    "modified_at",
    "kind",
    "bucket_id",
    "width",
    "height",
    "duration_ms",
    "orientation",
];

/// Build the asset projection for a capability tier.
///
/// Marker columns are mutually exclusive: the newest indexes expose
/// `special_format` and no longer surface raw XMP to readers.
pub(crate) fn asset_projection(capability: &Capability) -> String {
    let mut columns: Vec<&str> = BASE_PROJECTION.to_vec();
    if capability.is_favorite {
        columns.push("is_favorite");
    }
    match capability.marker {
        ClassifierMarker::SpecialFormat => columns.push("special_format"),
        ClassifierMarker::Xmp => columns.push("xmp"),
        ClassifierMarker::None => {}
    }
    columns.join(", ")
}

/// Append the media-kind selection for a filter, pushing its parameters.
pub(crate) fn push_kind_selection(
    filter: KindFilter,
    clauses: &mut Vec<String>,
    params: &mut Vec<Value>,
) {
    match filter {
        KindFilter::Image => {
            clauses.push("kind = ?".to_string());
            params.push(RAW_KIND_IMAGE.into());
        }
        KindFilter::Video => {
            clauses.push("kind = ?".to_string());
            params.push(RAW_KIND_VIDEO.into());
        }
        KindFilter::Any => {
            clauses.push("(kind = ? OR kind = ?)".to_string());
            params.push(RAW_KIND_IMAGE.into());
            params.push(RAW_KIND_VIDEO.into());
        }
    }
}

/// Selection fragment restricting rows to one album.
pub(crate) const ALBUM_SELECTION: &str = "bucket_id = ?";

/// Selection fragment for rows with a usable album id.
pub(crate) const HAS_ALBUM_SELECTION: &str = "bucket_id IS NOT NULL AND bucket_id <> ''";

/// Selection fragment for the differential cursor: a row qualifies when
/// either its modification time or its add time advanced past the cursor.
pub(crate) const UPDATED_SINCE_SELECTION: &str = "(modified_at > ? OR added_at > ?)";

/// Selection fragment for rows added strictly after a timestamp.
pub(crate) const ADDED_SINCE_SELECTION: &str = "added_at > ?";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_gates_marker_columns() {
        let v1 = asset_projection(&Capability::resolve(1));
        assert!(!v1.contains("xmp"));
        assert!(!v1.contains("special_format"));
        assert!(!v1.contains("is_favorite"));

        let v2 = asset_projection(&Capability::resolve(2));
        assert!(v2.contains("xmp"));
        assert!(!v2.contains("special_format"));
        assert!(v2.contains("is_favorite"));

        let v3 = asset_projection(&Capability::resolve(3));
        assert!(!v3.contains("xmp"));
        assert!(v3.contains("special_format"));
    }

    #[test]
    fn kind_selection_binds_raw_codes() {
        let mut clauses = Vec::new();
        let mut params = Vec::new();
        push_kind_selection(KindFilter::Any, &mut clauses, &mut params);
        assert_eq!(clauses, vec!["(kind = ? OR kind = ?)".to_string()]);
        assert_eq!(params.len(), 2);
    }
}
