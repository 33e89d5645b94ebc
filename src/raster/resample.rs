use image::imageops::{self, FilterType};

use crate::foundation::core::Dimensions;
use crate::raster::frame::RasterFrame;

/// Source-space sample positions for a cover-crop from `src` to `dst`.
///
/// One uniform scale fills the whole target; the excess is cropped evenly on
/// both sides. Positions are pixel-centre based and clamped into the source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverMapping {
    src: Dimensions,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl CoverMapping {
    pub fn new(src: Dimensions, dst: Dimensions) -> Self {
        let (sw, sh) = (f64::from(src.width), f64::from(src.height));
        let (tw, th) = (f64::from(dst.width), f64::from(dst.height));
        let scale = (tw / sw).max(th / sh);
        Self {
            src,
            scale,
            offset_x: (sw * scale - tw) / 2.0,
            offset_y: (sh * scale - th) / 2.0,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Source x coordinate sampled for target column `x`.
    pub fn source_x(&self, x: u32) -> f64 {
        Self::map(x, self.offset_x, self.scale, self.src.width)
    }

    /// Source y coordinate sampled for target row `y`.
    pub fn source_y(&self, y: u32) -> f64 {
        Self::map(y, self.offset_y, self.scale, self.src.height)
    }

    fn map(t: u32, offset: f64, scale: f64, src_len: u32) -> f64 {
        let s = (f64::from(t) + 0.5 + offset) / scale - 0.5;
        s.clamp(0.0, f64::from(src_len - 1))
    }
}

struct Tap {
    i0: usize,
    i1: usize,
    frac: f32,
}

fn taps(len: u32, src_len: u32, map: impl Fn(u32) -> f64) -> Vec<Tap> {
    (0..len)
        .map(|t| {
            let s = map(t);
            let i0 = s.floor() as usize;
            Tap {
                i0,
                i1: (i0 + 1).min(src_len as usize - 1),
                frac: (s - i0 as f64) as f32,
            }
        })
        .collect()
}

/// Scale `src` to cover `dst` and crop centrally, sampling bilinearly.
///
/// Always returns a fresh buffer; same-size input is copied unchanged.
pub fn cover_crop(src: &RasterFrame, dst: Dimensions) -> RasterFrame {
    let sd = src.dimensions();
    if sd == dst {
        return src.clone();
    }

    let mapping = CoverMapping::new(sd, dst);
    let xs = taps(dst.width, sd.width, |x| mapping.source_x(x));
    let ys = taps(dst.height, sd.height, |y| mapping.source_y(y));

    let sw = sd.width as usize;
    let data = src.as_bytes();
    let mut out = Vec::with_capacity(dst.pixel_count() * 3);
    for ty in &ys {
        let row0 = ty.i0 * sw;
        let row1 = ty.i1 * sw;
        for tx in &xs {
            let p00 = (row0 + tx.i0) * 3;
            let p01 = (row0 + tx.i1) * 3;
            let p10 = (row1 + tx.i0) * 3;
            let p11 = (row1 + tx.i1) * 3;
            for c in 0..3 {
                let top = lerp(data[p00 + c], data[p01 + c], tx.frac);
                let bottom = lerp(data[p10 + c], data[p11 + c], tx.frac);
                let v = top + (bottom - top) * ty.frac;
                out.push(v.round().clamp(0.0, 255.0) as u8);
            }
        }
    }

    RasterFrame::from_raw_parts(dst, out)
}

fn lerp(a: u8, b: u8, t: f32) -> f32 {
    let a = f32::from(a);
    a + (f32::from(b) - a) * t
}

/// Scale an RGBA image to fit inside `dst` without cropping, centred on a
/// transparent canvas.
pub fn contain_fit_rgba(img: &image::RgbaImage, dst: Dimensions) -> image::RgbaImage {
    let (sw, sh) = img.dimensions();
    if (sw, sh) == (dst.width, dst.height) {
        return img.clone();
    }

    let scale = (f64::from(dst.width) / f64::from(sw)).min(f64::from(dst.height) / f64::from(sh));
    let fit_w = ((f64::from(sw) * scale).round() as u32).clamp(1, dst.width);
    let fit_h = ((f64::from(sh) * scale).round() as u32).clamp(1, dst.height);
    let resized = imageops::resize(img, fit_w, fit_h, FilterType::Triangle);

    let mut canvas = image::RgbaImage::new(dst.width, dst.height);
    imageops::replace(
        &mut canvas,
        &resized,
        i64::from((dst.width - fit_w) / 2),
        i64::from((dst.height - fit_h) / 2),
    );
    canvas
}

#[cfg(test)]
#[path = "../../tests/unit/raster/resample.rs"]
mod tests;
