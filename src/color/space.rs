/// Pack 8-bit RGB into RGB565 (`rrrrrggg gggbbbbb`).
pub fn rgb_to_rgb565(rgb: [u8; 3]) -> u16 {
    let r = u16::from(rgb[0] >> 3);
    let g = u16::from(rgb[1] >> 2);
    let b = u16::from(rgb[2] >> 3);
    (r << 11) | (g << 5) | b
}

/// Expand RGB565 back to 8-bit RGB, replicating high bits into the low ones.
pub fn rgb565_to_rgb(v: u16) -> [u8; 3] {
    let r = ((v >> 11) & 0x1f) as u8;
    let g = ((v >> 5) & 0x3f) as u8;
    let b = (v & 0x1f) as u8;
    [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
}

/// Hue in degrees `[0, 360)`, saturation and value in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

pub fn rgb_to_hsv(rgb: [u8; 3]) -> Hsv {
    let r = f32::from(rgb[0]) / 255.0;
    let g = f32::from(rgb[1]) / 255.0;
    let b = f32::from(rgb[2]) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta <= f32::EPSILON {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let s = if max <= f32::EPSILON { 0.0 } else { delta / max };

    Hsv { h, s, v: max }
}

pub fn hsv_to_rgb(hsv: Hsv) -> [u8; 3] {
    let h = hsv.h.rem_euclid(360.0);
    let s = hsv.s.clamp(0.0, 1.0);
    let v = hsv.v.clamp(0.0, 1.0);

    let c = v * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let to_u8 = |f: f32| ((f + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_u8(r), to_u8(g), to_u8(b)]
}

/// Scale HSV saturation by `factor`, clamped to a valid saturation.
pub fn boost_saturation(rgb: [u8; 3], factor: f32) -> [u8; 3] {
    let mut hsv = rgb_to_hsv(rgb);
    if hsv.s <= 0.0 {
        return rgb;
    }
    hsv.s = (hsv.s * factor).clamp(0.0, 1.0);
    hsv_to_rgb(hsv)
}

#[cfg(test)]
#[path = "../../tests/unit/color/space.rs"]
mod tests;
