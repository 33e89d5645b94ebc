use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{AnimError, AnimResult};
use crate::raster::frame::RasterFrame;

const FRAME_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "webp"];

/// Decode encoded image bytes to straight-alpha RGBA8.
pub fn decode_mask(bytes: &[u8]) -> AnimResult<image::RgbaImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode mask image from memory")?;
    Ok(dyn_img.to_rgba8())
}

/// Decode encoded image bytes to an RGB raster, dropping alpha.
pub fn decode_raster(bytes: &[u8]) -> AnimResult<RasterFrame> {
    let dyn_img = image::load_from_memory(bytes).context("decode raster from memory")?;
    RasterFrame::from_rgb_image(dyn_img.to_rgb8())
}

/// Load every still image in `dir`, sorted by file name, as source frames.
///
/// All frames must share the first frame's dimensions.
pub fn load_frames_dir(dir: &Path) -> AnimResult<Vec<RasterFrame>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("read frame directory '{}'", dir.display()))?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("list frame directory '{}'", dir.display()))?
            .path();
        let is_frame = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        if is_frame {
            paths.push(path);
        }
    }
    paths.sort();

    let mut frames = Vec::with_capacity(paths.len());
    for path in &paths {
        let bytes =
            std::fs::read(path).with_context(|| format!("read frame '{}'", path.display()))?;
        let frame = decode_raster(&bytes)?;
        if let Some(first) = frames.first().map(RasterFrame::dimensions)
            && frame.dimensions() != first
        {
            return Err(AnimError::validation(format!(
                "frame '{}' is {}, expected {first}",
                path.display(),
                frame.dimensions()
            )));
        }
        frames.push(frame);
    }
    tracing::debug!(frames = frames.len(), dir = %dir.display(), "loaded source frames");
    Ok(frames)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
