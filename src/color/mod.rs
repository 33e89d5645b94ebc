//! Palette construction and palette quantisation.

/// Median-cut palette builder.
pub mod palette;
/// Nearest-colour mapping with attenuated error diffusion.
pub mod quantize;
/// RGB565 and HSV conversions.
pub mod space;
