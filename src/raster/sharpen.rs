use crate::foundation::error::{AnimError, AnimResult};
use crate::raster::frame::RasterFrame;

/// Unsharp mask: `out = src + amount * (src - gaussian(src))`.
///
/// `amount == 0` or `radius == 0` returns an unchanged copy.
pub fn unsharp_mask(
    frame: &RasterFrame,
    radius: u32,
    sigma: f32,
    amount: f32,
) -> AnimResult<RasterFrame> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(AnimError::validation("sharpen amount must be finite and >= 0"));
    }
    if amount == 0.0 || radius == 0 {
        return Ok(frame.clone());
    }

    let dims = frame.dimensions();
    let src = frame.as_bytes();
    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; src.len()];
    let mut blurred = vec![0u8; src.len()];
    horizontal_pass(src, &mut tmp, dims.width, dims.height, &kernel);
    vertical_pass(&tmp, &mut blurred, dims.width, dims.height, &kernel);

    let out = src
        .iter()
        .zip(&blurred)
        .map(|(&s, &b)| {
            let s = f32::from(s);
            (s + amount * (s - f32::from(b))).round().clamp(0.0, 255.0) as u8
        })
        .collect();
    Ok(RasterFrame::from_raw_parts(dims, out))
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> AnimResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(AnimError::validation("sharpen sigma must be > 0"));
    }

    let r = radius as i32;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    // Push rounding drift into the centre tap so the kernel sums to exactly 1.0.
    let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let mid = weights.len() / 2;
    weights[mid] = (i64::from(weights[mid]) + 65536 - acc).clamp(0, 65536) as u32;

    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 3];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 3;
                for c in 0..3 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 3;
            for c in 0..3 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 3];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 3;
                for c in 0..3 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 3;
            for c in 0..3 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/raster/sharpen.rs"]
mod tests;
