use crate::color::palette::{BLACK_INDEX, Palette};
use crate::foundation::core::{Dimensions, PipelineConfig};
use crate::foundation::error::{AnimError, AnimResult};
use crate::foundation::math::{clamp_u8, mean_luma};
use crate::raster::frame::RasterFrame;

/// One palette index per pixel, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedRaster {
    dims: Dimensions,
    indices: Vec<u8>,
}

impl IndexedRaster {
    /// Wrap `indices`, checking the length against `dims`.
    pub fn new(dims: Dimensions, indices: Vec<u8>) -> AnimResult<Self> {
        if indices.len() != dims.pixel_count() {
            return Err(AnimError::validation(format!(
                "indexed raster {dims} expects {} indices, got {}",
                dims.pixel_count(),
                indices.len()
            )));
        }
        Ok(Self { dims, indices })
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    pub fn into_indices(self) -> Vec<u8> {
        self.indices
    }
}

/// Quantiser settings taken from [`PipelineConfig`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuantizeOpts {
    pub black_floor: u8,
    pub dither_strength: f32,
}

impl From<&PipelineConfig> for QuantizeOpts {
    fn from(cfg: &PipelineConfig) -> Self {
        Self {
            black_floor: cfg.black_floor,
            dither_strength: cfg.dither_strength,
        }
    }
}

// Floyd–Steinberg taps as (dx, dy, weight/16).
const FS_TAPS: [(isize, usize, f32); 4] = [
    (1, 0, 7.0 / 16.0),
    (-1, 1, 3.0 / 16.0),
    (0, 1, 5.0 / 16.0),
    (1, 1, 1.0 / 16.0),
];

/// Map `frame` onto `palette`.
///
/// Pixels under the black floor take index 0 without a search and neither emit
/// nor keep diffused error. Other pixels take the nearest entry, and with a
/// non-zero `dither_strength` push the scaled error to unvisited neighbours.
pub fn quantize(frame: &RasterFrame, palette: &Palette, opts: QuantizeOpts) -> IndexedRaster {
    let dims = frame.dimensions();
    let (w, h) = (dims.width as usize, dims.height as usize);
    let src = frame.as_bytes();
    let strength = opts.dither_strength.clamp(0.0, 1.0);
    let diffuse = strength > 0.0;

    let mut work: Vec<f32> = if diffuse {
        src.iter().copied().map(f32::from).collect()
    } else {
        Vec::new()
    };
    let mut indices = vec![BLACK_INDEX; dims.pixel_count()];

    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            let o = i * 3;
            let px = [src[o], src[o + 1], src[o + 2]];
            if mean_luma(px) < opts.black_floor {
                continue;
            }
            if !diffuse {
                indices[i] = palette.nearest(px);
                continue;
            }

            let cur = [clamp_u8(work[o]), clamp_u8(work[o + 1]), clamp_u8(work[o + 2])];
            let idx = palette.nearest(cur);
            indices[i] = idx;

            let pal = palette.color(idx);
            let err = [
                (f32::from(cur[0]) - f32::from(pal[0])) * strength,
                (f32::from(cur[1]) - f32::from(pal[1])) * strength,
                (f32::from(cur[2]) - f32::from(pal[2])) * strength,
            ];
            for (dx, dy, weight) in FS_TAPS {
                let nx = x as isize + dx;
                let ny = y + dy;
                if nx < 0 || nx as usize >= w || ny >= h {
                    continue;
                }
                let n = (ny * w + nx as usize) * 3;
                for c in 0..3 {
                    work[n + c] += err[c] * weight;
                }
            }
        }
    }

    IndexedRaster { dims, indices }
}

#[cfg(test)]
#[path = "../../tests/unit/color/quantize.rs"]
mod tests;
