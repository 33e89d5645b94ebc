use crate::color::space::{boost_saturation, rgb_to_rgb565};
use crate::foundation::core::PipelineConfig;
use crate::foundation::math::mean_luma;
use crate::raster::frame::RasterFrame;

/// Entries in every palette, including the reserved black.
pub const PALETTE_SIZE: usize = 256;
/// Entries available to median-cut after index 0 is reserved.
pub const CONTENT_COLORS: usize = PALETTE_SIZE - 1;
/// Palette index always holding pure black.
pub const BLACK_INDEX: u8 = 0;

/// Pixels gathered from the final-resolution frames for palette construction.
///
/// This is the only input [`Palette::build`] accepts, so a palette cannot exist
/// before the sampling pass has finished.
#[derive(Clone, Debug, Default)]
pub struct PaletteSamples {
    pixels: Vec<[u8; 3]>,
}

impl PaletteSamples {
    /// Sample at most `palette_sample_frames` evenly spaced frames, taking every
    /// `palette_pixel_stride`-th pixel and skipping pixels under the black floor.
    pub fn collect(frames: &[RasterFrame], cfg: &PipelineConfig) -> Self {
        let stride = cfg.palette_pixel_stride.max(1);
        let mut pixels = Vec::new();
        for idx in sample_frame_indices(frames.len(), cfg.palette_sample_frames) {
            pixels.extend(
                frames[idx]
                    .pixels()
                    .step_by(stride)
                    .filter(|&px| mean_luma(px) >= cfg.black_floor),
            );
        }
        Self { pixels }
    }

    /// Build samples from an explicit pixel list, applying the black floor.
    pub fn from_pixels(pixels: impl IntoIterator<Item = [u8; 3]>, black_floor: u8) -> Self {
        Self {
            pixels: pixels
                .into_iter()
                .filter(|&px| mean_luma(px) >= black_floor)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

/// Indices of at most `max_frames` frames spread evenly over `frame_count`.
pub fn sample_frame_indices(frame_count: usize, max_frames: usize) -> Vec<usize> {
    let max_frames = max_frames.max(1);
    if frame_count <= max_frames {
        return (0..frame_count).collect();
    }
    (0..max_frames)
        .map(|i| i * frame_count / max_frames)
        .collect()
}

/// A 256-entry palette with index 0 pinned to black.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    rgb: [[u8; 3]; PALETTE_SIZE],
    rgb565: [u16; PALETTE_SIZE],
    content_len: usize,
}

impl Palette {
    /// Run median-cut over `samples` and boost the saturation of the result.
    ///
    /// Empty samples produce an all-black palette.
    #[tracing::instrument(skip(samples), fields(sample_count = samples.len()))]
    pub fn build(samples: &PaletteSamples, saturation_boost: f32) -> Self {
        let colors = median_cut(samples.pixels.clone(), CONTENT_COLORS);

        let mut rgb = [[0u8; 3]; PALETTE_SIZE];
        for (slot, color) in rgb[1..].iter_mut().zip(&colors) {
            *slot = boost_saturation(*color, saturation_boost);
        }
        let mut rgb565 = [0u16; PALETTE_SIZE];
        for (dst, color) in rgb565.iter_mut().zip(&rgb) {
            *dst = rgb_to_rgb565(*color);
        }

        tracing::debug!(content_colors = colors.len(), "palette built");
        Self {
            rgb,
            rgb565,
            content_len: colors.len(),
        }
    }

    /// Palette entries as 8-bit RGB.
    pub fn rgb(&self) -> &[[u8; 3]; PALETTE_SIZE] {
        &self.rgb
    }

    /// Palette entries as RGB565, the form stored in the container.
    pub fn rgb565(&self) -> &[u16; PALETTE_SIZE] {
        &self.rgb565
    }

    pub fn color(&self, index: u8) -> [u8; 3] {
        self.rgb[usize::from(index)]
    }

    /// Number of entries produced by median-cut; the rest are black filler.
    pub fn content_len(&self) -> usize {
        self.content_len
    }

    /// Index of the entry with the smallest squared RGB distance.
    ///
    /// Ties resolve to the lowest index, so black filler never shadows index 0.
    pub fn nearest(&self, px: [u8; 3]) -> u8 {
        let mut best = 0usize;
        let mut best_dist = u32::MAX;
        for (i, c) in self.rgb.iter().enumerate() {
            let dr = i32::from(px[0]) - i32::from(c[0]);
            let dg = i32::from(px[1]) - i32::from(c[1]);
            let db = i32::from(px[2]) - i32::from(c[2]);
            let dist = (dr * dr + dg * dg + db * db) as u32;
            if dist < best_dist {
                best = i;
                best_dist = dist;
                if dist == 0 {
                    break;
                }
            }
        }
        best as u8
    }
}

struct Bucket {
    pixels: Vec<[u8; 3]>,
}

impl Bucket {
    /// Channel with the largest value spread and that spread.
    fn widest_channel(&self) -> (usize, u8) {
        let mut lo = [u8::MAX; 3];
        let mut hi = [u8::MIN; 3];
        for px in &self.pixels {
            for c in 0..3 {
                lo[c] = lo[c].min(px[c]);
                hi[c] = hi[c].max(px[c]);
            }
        }
        (0..3)
            .map(|c| (c, hi[c].saturating_sub(lo[c])))
            .fold((0, 0), |best, cur| if cur.1 > best.1 { cur } else { best })
    }

    fn split(mut self, channel: usize) -> (Bucket, Bucket) {
        self.pixels.sort_unstable_by_key(|px| px[channel]);
        let upper = self.pixels.split_off(self.pixels.len() / 2);
        (self, Bucket { pixels: upper })
    }

    fn mean(&self) -> [u8; 3] {
        let n = self.pixels.len().max(1) as u64;
        let mut sum = [0u64; 3];
        for px in &self.pixels {
            for c in 0..3 {
                sum[c] += u64::from(px[c]);
            }
        }
        [
            ((sum[0] + n / 2) / n) as u8,
            ((sum[1] + n / 2) / n) as u8,
            ((sum[2] + n / 2) / n) as u8,
        ]
    }
}

/// Split the bucket with the widest channel at its median until `max_colors`
/// buckets exist or none can be split, then average each bucket.
pub(crate) fn median_cut(pixels: Vec<[u8; 3]>, max_colors: usize) -> Vec<[u8; 3]> {
    if pixels.is_empty() || max_colors == 0 {
        return Vec::new();
    }

    let mut buckets = vec![Bucket { pixels }];
    while buckets.len() < max_colors {
        let mut pick: Option<(usize, usize, u8)> = None;
        for (i, b) in buckets.iter().enumerate() {
            if b.pixels.len() < 2 {
                continue;
            }
            let (channel, spread) = b.widest_channel();
            if spread > 0 && pick.is_none_or(|(_, _, best)| spread > best) {
                pick = Some((i, channel, spread));
            }
        }
        let Some((idx, channel, _)) = pick else {
            break;
        };
        let (lo, hi) = buckets.remove(idx).split(channel);
        buckets.push(lo);
        buckets.push(hi);
    }

    buckets.iter().map(Bucket::mean).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/color/palette.rs"]
mod tests;
