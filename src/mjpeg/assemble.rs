use image::codecs::jpeg::JpegEncoder;

use crate::foundation::core::Fps;
use crate::foundation::error::{AnimError, AnimResult};
use crate::mjpeg::parse::is_complete_jpeg;
use crate::raster::frame::RasterFrame;

/// Byte range of one frame inside the assembled stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MjpegFrameEntry {
    pub offset: u64,
    pub length: u64,
}

/// Per-frame seek table for an assembled stream.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MjpegIndex {
    pub fps: Fps,
    pub frames: Vec<MjpegFrameEntry>,
}

impl MjpegIndex {
    pub fn to_json(&self) -> AnimResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AnimError::encode(format!("serialize mjpeg index: {e}")))
    }
}

/// Concatenates complete JPEGs with no extra framing.
#[derive(Debug, Default)]
pub struct MjpegAssembler {
    out: Vec<u8>,
    frames: Vec<MjpegFrameEntry>,
}

impl MjpegAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one JPEG; it must carry its own SOI and EOI markers.
    pub fn push_frame(&mut self, jpeg: &[u8]) -> AnimResult<()> {
        if !is_complete_jpeg(jpeg) {
            return Err(AnimError::encode(format!(
                "frame {} is not a complete jpeg stream",
                self.frames.len()
            )));
        }
        self.frames.push(MjpegFrameEntry {
            offset: self.out.len() as u64,
            length: jpeg.len() as u64,
        });
        self.out.extend_from_slice(jpeg);
        Ok(())
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Return the stream and its seek index.
    pub fn finish(self, fps: Fps) -> (Vec<u8>, MjpegIndex) {
        (
            self.out,
            MjpegIndex {
                fps,
                frames: self.frames,
            },
        )
    }
}

/// Baseline JPEG encode of an RGB raster.
pub fn encode_jpeg(frame: &RasterFrame, quality: u8) -> AnimResult<Vec<u8>> {
    let img = frame.to_rgb_image()?;
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
        .encode_image(&img)
        .map_err(|e| AnimError::encode(format!("jpeg encode: {e}")))?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/mjpeg/assemble.rs"]
mod tests;
