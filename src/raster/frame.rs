use crate::foundation::core::Dimensions;
use crate::foundation::error::{AnimError, AnimResult};

/// Interleaved RGB8 pixels, row-major, tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterFrame {
    dims: Dimensions,
    data: Vec<u8>,
}

impl RasterFrame {
    /// Wrap RGB8 bytes, checking the length against `width * height * 3`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> AnimResult<Self> {
        let dims = Dimensions::new(width, height)?;
        let expected = dims
            .pixel_count()
            .checked_mul(3)
            .ok_or_else(|| AnimError::validation("raster size overflow"))?;
        if data.len() != expected {
            return Err(AnimError::validation(format!(
                "raster {dims} expects {expected} rgb bytes, got {}",
                data.len()
            )));
        }
        Ok(Self { dims, data })
    }

    /// Internal constructor for buffers the caller sized from `dims`.
    pub(crate) fn from_raw_parts(dims: Dimensions, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), dims.pixel_count() * 3);
        Self { dims, data }
    }

    /// Solid `(0, 0, 0)` frame.
    pub fn black(dims: Dimensions) -> Self {
        Self {
            dims,
            data: vec![0u8; dims.pixel_count() * 3],
        }
    }

    /// Solid frame of one colour.
    pub fn filled(dims: Dimensions, rgb: [u8; 3]) -> Self {
        Self {
            dims,
            data: rgb.repeat(dims.pixel_count()),
        }
    }

    pub fn from_rgb_image(img: image::RgbImage) -> AnimResult<Self> {
        let (w, h) = img.dimensions();
        Self::new(w, h, img.into_raw())
    }

    /// Copy into an `image` buffer, e.g. for JPEG encoding.
    pub fn to_rgb_image(&self) -> AnimResult<image::RgbImage> {
        image::RgbImage::from_raw(self.dims.width, self.dims.height, self.data.clone())
            .ok_or_else(|| AnimError::encode("raster buffer does not match its dimensions"))
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn width(&self) -> u32 {
        self.dims.width
    }

    pub fn height(&self) -> u32 {
        self.dims.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = ((y as usize) * (self.dims.width as usize) + (x as usize)) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Pixels in raster order.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.data.chunks_exact(3).map(|p| [p[0], p[1], p[2]])
    }

    /// `true` when every channel of every pixel is zero.
    pub fn is_black(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/frame.rs"]
mod tests;
