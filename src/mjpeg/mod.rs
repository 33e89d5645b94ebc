//! Motion-JPEG streams: raw concatenations of complete JPEG files.

/// Output concatenation, seek index and JPEG encoding.
pub mod assemble;
/// SOI/EOI frame scanning.
pub mod parse;

/// Start-of-image marker.
pub const SOI: [u8; 2] = [0xFF, 0xD8];
/// End-of-image marker.
pub const EOI: [u8; 2] = [0xFF, 0xD9];
