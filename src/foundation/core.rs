use crate::foundation::error::{AnimError, AnimResult};

/// Raster dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create a validated size with both sides non-zero.
    pub fn new(width: u32, height: u32) -> AnimResult<Self> {
        if width == 0 || height == 0 {
            return Err(AnimError::validation(format!(
                "dimensions must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Number of pixels (`width * height`).
    pub fn pixel_count(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Integer playback rate of a timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Fps(pub u32);

impl Fps {
    /// Create a validated rate.
    pub fn new(fps: u32) -> AnimResult<Self> {
        if fps == 0 {
            return Err(AnimError::validation("fps must be > 0"));
        }
        Ok(Self(fps))
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        1.0 / f64::from(self.0.max(1))
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self(30)
    }
}

/// Tunables for every pipeline stage.
///
/// All stages take this explicitly so the pipeline can run at other sizes in tests.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Target raster width. The display is 240 wide.
    pub width: u32,
    /// Target raster height. The display is 280 tall.
    pub height: u32,
    /// Pixels whose channel mean is below this are forced to palette index 0 and
    /// are left out of palette sampling.
    pub black_floor: u8,
    /// Composited pixels with every channel below this are snapped to pure black.
    pub composite_black_snap: u8,
    /// HSV saturation scale applied to non-reserved palette entries.
    pub saturation_boost: f32,
    /// Floyd–Steinberg attenuation in `[0, 1]`. Zero disables error diffusion.
    pub dither_strength: f32,
    /// Unsharp-mask amount. Zero disables sharpening.
    pub sharpen_amount: f32,
    /// Unsharp-mask Gaussian radius in pixels.
    pub sharpen_radius: u32,
    /// Unsharp-mask Gaussian sigma.
    pub sharpen_sigma: f32,
    /// Upper bound on evenly spaced frames sampled for the palette.
    pub palette_sample_frames: usize,
    /// Pixel stride used inside each sampled frame.
    pub palette_pixel_stride: usize,
    /// Quality for freshly composited MJPEG frames (1..=100).
    pub jpeg_quality: u8,
    /// Worker threads for mask fetches. `None` uses rayon defaults.
    pub fetch_threads: Option<usize>,
    /// Worker threads for per-frame quantisation. `None` uses rayon defaults.
    pub encode_threads: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            width: 240,
            height: 280,
            black_floor: 20,
            composite_black_snap: 12,
            saturation_boost: 1.15,
            dither_strength: 0.0,
            sharpen_amount: 0.0,
            sharpen_radius: 1,
            sharpen_sigma: 1.0,
            palette_sample_frames: 30,
            palette_pixel_stride: 4,
            jpeg_quality: 85,
            fetch_threads: None,
            encode_threads: None,
        }
    }
}

impl PipelineConfig {
    /// Target dimensions as a validated [`Dimensions`].
    pub fn dimensions(&self) -> AnimResult<Dimensions> {
        Dimensions::new(self.width, self.height)
    }

    /// Check every field against the range the encoders accept.
    pub fn validate(&self) -> AnimResult<()> {
        let dims = self.dimensions()?;
        if dims.width > u32::from(u16::MAX) || dims.height > u32::from(u16::MAX) {
            return Err(AnimError::validation(format!(
                "target {dims} does not fit the u16 header fields"
            )));
        }
        if !self.dither_strength.is_finite() || !(0.0..=1.0).contains(&self.dither_strength) {
            return Err(AnimError::validation("dither_strength must be within [0, 1]"));
        }
        if !self.sharpen_amount.is_finite() || self.sharpen_amount < 0.0 {
            return Err(AnimError::validation(
                "sharpen_amount must be finite and >= 0",
            ));
        }
        if self.sharpen_amount > 0.0
            && self.sharpen_radius > 0
            && (!self.sharpen_sigma.is_finite() || self.sharpen_sigma <= 0.0)
        {
            return Err(AnimError::validation("sharpen_sigma must be > 0"));
        }
        if !self.saturation_boost.is_finite() || self.saturation_boost < 1.0 {
            return Err(AnimError::validation("saturation_boost must be >= 1"));
        }
        if self.palette_sample_frames == 0 {
            return Err(AnimError::validation("palette_sample_frames must be >= 1"));
        }
        if self.palette_pixel_stride == 0 {
            return Err(AnimError::validation("palette_pixel_stride must be >= 1"));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(AnimError::validation("jpeg_quality must be within 1..=100"));
        }
        for (name, threads) in [
            ("fetch_threads", self.fetch_threads),
            ("encode_threads", self.encode_threads),
        ] {
            if threads == Some(0) {
                return Err(AnimError::validation(format!(
                    "{name} must be >= 1 when set"
                )));
            }
        }
        Ok(())
    }
}

pub(crate) fn build_thread_pool(threads: Option<usize>) -> AnimResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        if n == 0 {
            return Err(AnimError::validation("thread count must be >= 1 when set"));
        }
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| AnimError::encode(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
