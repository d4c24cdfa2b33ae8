//! XMP packet extraction for motion-photo detection.
//!
//! Cameras that record motion photos embed an XMP packet near the start of
//! the image file. Detection only needs a substring check against the
//! packet, so the reader scans the file head for the packet delimiters
//! rather than pulling in a full XML parser.

use std::io::Read;
use std::path::Path;

/// Tag substring that marks a motion photo in the embedded XMP packet.
pub(crate) const MOTION_PHOTO_TAG: &str = "Camera:MotionPhoto";

/// XMP packets sit in the file header; scanning past this is wasted I/O.
const XMP_SCAN_LIMIT: usize = 256 * 1024;

const XMP_OPEN: &[u8] = b"<x:xmpmeta";
const XMP_CLOSE: &[u8] = b"</x:xmpmeta>";

/// Read the embedded XMP packet from the head of a file, if present.
pub(crate) fn read_xmp_packet(path: &Path) -> std::io::Result<Option<String>> {
    let mut file = std::fs::File::open(path)?;
    let mut head = vec![0u8; XMP_SCAN_LIMIT];
    let mut filled = 0;
    loop {
        let n = file.read(&mut head[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
        if filled == head.len() {
            break;
        }
    }
    head.truncate(filled);
    Ok(extract_packet(&head).map(|bytes| String::from_utf8_lossy(bytes).into_owned()))
}

fn extract_packet(head: &[u8]) -> Option<&[u8]> {
    let start = find_subslice(head, XMP_OPEN)?;
    let end = find_subslice(&head[start..], XMP_CLOSE)? + start + XMP_CLOSE.len();
    Some(&head[start..end])
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
