use crate::mjpeg::{EOI, SOI};

/// Split an MJPEG stream into complete JPEG frames by scanning for SOI/EOI pairs.
///
/// Bytes outside a pair are skipped; a trailing SOI without its EOI is dropped.
pub fn parse_jpeg_frames(bytes: &[u8]) -> Vec<&[u8]> {
    let mut frames = Vec::new();
    let mut pos = 0usize;
    while let Some(start) = find_marker(bytes, pos, SOI) {
        let Some(eoi) = find_marker(bytes, start + 2, EOI) else {
            tracing::debug!(offset = start, "dropping truncated trailing jpeg");
            break;
        };
        let end = eoi + 2;
        frames.push(&bytes[start..end]);
        pos = end;
    }
    frames
}

fn find_marker(bytes: &[u8], from: usize, marker: [u8; 2]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(2)
        .position(|w| w == marker)
        .map(|i| from + i)
}

/// `true` when `frame` starts with SOI and ends with EOI.
pub fn is_complete_jpeg(frame: &[u8]) -> bool {
    frame.len() >= 4 && frame.starts_with(&SOI) && frame.ends_with(&EOI)
}

#[cfg(test)]
#[path = "../../tests/unit/mjpeg/parse.rs"]
mod tests;
