//! Playback-style classification.
//!
//! Assigns a [`PlaybackStyle`] to an enumerated row via an ordered chain of
//! tiers, tried until one produces an answer. Videos short-circuit; the
//! marker tier consults the index's pre-computed column when the capability
//! set carries one; the fallback tiers probe the backing file itself. Probe
//! I/O failures are logged and treated as "tier did not match" —
//! classification must never fail the enclosing enumeration.

mod sniff;
mod xmp;

use std::path::Path;

use crate::index::schema::{
    RAW_KIND_IMAGE, RAW_KIND_VIDEO, SPECIAL_FORMAT_ANIMATED_WEBP, SPECIAL_FORMAT_GIF,
    SPECIAL_FORMAT_MOTION_PHOTO,
};
use crate::index::{Capability, ClassifierMarker};
use crate::library::PlaybackStyle;

use sniff::ImageSignature;

/// Row-level inputs to classification.
pub(crate) struct ClassifyRow<'a> {
    /// Raw platform kind code.
    pub raw_kind: i64,
    /// `special_format` column value, when the index carries the column.
    pub special_format: Option<i64>,
    /// `xmp` blob, when the index carries the column.
    pub xmp: Option<&'a [u8]>,
    /// Backing file, for the probe tiers.
    pub path: &'a Path,
}

/// Classify one row. First matching tier wins.
pub(crate) fn detect_playback_style(capability: &Capability, row: &ClassifyRow<'_>) -> PlaybackStyle {
    // Videos have no special formats; skip all marker and probe work.
    if row.raw_kind == RAW_KIND_VIDEO {
        return PlaybackStyle::Video;
    }

    if capability.marker == ClassifierMarker::SpecialFormat {
        return special_format_tier(row);
    }

    if row.raw_kind != RAW_KIND_IMAGE {
        return PlaybackStyle::Unknown;
    }

    xmp_tier(capability, row)
        .or_else(|| signature_tier(row))
        .unwrap_or(PlaybackStyle::Image)
}

/// Marker tier: the index has already classified the format.
fn special_format_tier(row: &ClassifyRow<'_>) -> PlaybackStyle {
    match row.special_format {
        Some(SPECIAL_FORMAT_MOTION_PHOTO) => PlaybackStyle::LivePhoto,
        Some(SPECIAL_FORMAT_GIF) | Some(SPECIAL_FORMAT_ANIMATED_WEBP) => {
            PlaybackStyle::ImageAnimated
        }
        _ if row.raw_kind == RAW_KIND_IMAGE => PlaybackStyle::Image,
        _ => PlaybackStyle::Unknown,
    }
}

/// XMP tier: a motion-photo tag in the embedded metadata packet.
///
/// The packet comes from the row when the index carries it, otherwise from
/// the backing file.
fn xmp_tier(capability: &Capability, row: &ClassifyRow<'_>) -> Option<PlaybackStyle> {
    let packet: Option<String> = if capability.marker == ClassifierMarker::Xmp {
        row.xmp
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    } else {
        match xmp::read_xmp_packet(row.path) {
            Ok(packet) => packet,
            Err(e) => {
                tracing::debug!("Failed to read XMP from {}: {}", row.path.display(), e);
                None
            }
        }
    };

    match packet {
        Some(text) if text.contains(xmp::MOTION_PHOTO_TAG) => Some(PlaybackStyle::LivePhoto),
        _ => None,
    }
}

/// Signature tier: sniff the raw bytes for an animated container.
fn signature_tier(row: &ClassifyRow<'_>) -> Option<PlaybackStyle> {
    match sniff::sniff_signature(row.path) {
        Ok(ImageSignature::Gif) | Ok(ImageSignature::AnimatedWebp) => {
            Some(PlaybackStyle::ImageAnimated)
        }
        Ok(ImageSignature::Other) => None,
        Err(e) => {
            tracing::debug!(
                "Failed to sniff image signature of {}: {}",
                row.path.display(),
                e
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn test_dir(case: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("devicesync-tests").join(case);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn row<'a>(raw_kind: i64, path: &'a Path) -> ClassifyRow<'a> {
        ClassifyRow {
            raw_kind,
            special_format: None,
            xmp: None,
            path,
        }
    }

    #[test]
    fn video_short_circuits_regardless_of_markers() {
        let path = Path::new("/nonexistent/clip.mp4");
        let mut r = row(RAW_KIND_VIDEO, path);
        r.special_format = Some(SPECIAL_FORMAT_MOTION_PHOTO);
        assert_eq!(
            detect_playback_style(&Capability::resolve(3), &r),
            PlaybackStyle::Video
        );
        assert_eq!(
            detect_playback_style(&Capability::resolve(1), &r),
            PlaybackStyle::Video
        );
    }

    #[test]
    fn special_format_marker_wins() {
        let path = Path::new("/nonexistent/a.jpg");
        let cap = Capability::resolve(3);

        let mut r = row(RAW_KIND_IMAGE, path);
        r.special_format = Some(SPECIAL_FORMAT_MOTION_PHOTO);
        assert_eq!(detect_playback_style(&cap, &r), PlaybackStyle::LivePhoto);

        r.special_format = Some(SPECIAL_FORMAT_GIF);
        assert_eq!(detect_playback_style(&cap, &r), PlaybackStyle::ImageAnimated);

        r.special_format = Some(SPECIAL_FORMAT_ANIMATED_WEBP);
        assert_eq!(detect_playback_style(&cap, &r), PlaybackStyle::ImageAnimated);

        r.special_format = None;
        assert_eq!(detect_playback_style(&cap, &r), PlaybackStyle::Image);
    }

    #[test]
    fn unmarked_non_image_is_unknown_on_marker_tier() {
        let path = Path::new("/nonexistent/odd.bin");
        let r = row(99, path);
        assert_eq!(
            detect_playback_style(&Capability::resolve(3), &r),
            PlaybackStyle::Unknown
        );
        assert_eq!(
            detect_playback_style(&Capability::resolve(1), &r),
            PlaybackStyle::Unknown
        );
    }

    #[test]
    fn row_xmp_blob_marks_live_photo() {
        let path = Path::new("/nonexistent/a.jpg");
        let xmp = b"<x:xmpmeta Camera:MotionPhoto=\"1\"></x:xmpmeta>";
        let mut r = row(RAW_KIND_IMAGE, path);
        r.xmp = Some(xmp);
        assert_eq!(
            detect_playback_style(&Capability::resolve(2), &r),
            PlaybackStyle::LivePhoto
        );
    }

    #[test]
    fn file_xmp_packet_marks_live_photo_without_column() {
        let dir = test_dir("classify_xmp");
        let path = dir.join("motion.jpg");
        let mut bytes = vec![0xFFu8, 0xD8, 0xFF, 0xE1];
        bytes.extend_from_slice(b"<x:xmpmeta Camera:MotionPhoto=\"1\"></x:xmpmeta>");
        fs::write(&path, bytes).unwrap();

        let r = row(RAW_KIND_IMAGE, &path);
        assert_eq!(
            detect_playback_style(&Capability::resolve(1), &r),
            PlaybackStyle::LivePhoto
        );
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn gif_signature_marks_animated() {
        let dir = test_dir("classify_sniff");
        let path = dir.join("anim.gif");
        fs::write(&path, b"GIF89a\x01\x00\x01\x00").unwrap();

        let r = row(RAW_KIND_IMAGE, &path);
        assert_eq!(
            detect_playback_style(&Capability::resolve(1), &r),
            PlaybackStyle::ImageAnimated
        );
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn plain_image_with_no_markers_defaults_to_image() {
        let dir = test_dir("classify_plain");
        let path = dir.join("plain.jpg");
        fs::write(&path, [0xFFu8, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0]).unwrap();

        let r = row(RAW_KIND_IMAGE, &path);
        assert_eq!(
            detect_playback_style(&Capability::resolve(1), &r),
            PlaybackStyle::Image
        );
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn probe_failures_fall_through_to_image() {
        // Backing file vanished between enumeration and probing.
        let r = row(RAW_KIND_IMAGE, Path::new("/nonexistent/gone.jpg"));
        assert_eq!(
            detect_playback_style(&Capability::resolve(1), &r),
            PlaybackStyle::Image
        );
    }
}
