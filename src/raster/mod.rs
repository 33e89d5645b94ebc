//! RGB raster buffers and the operations applied to them before quantisation.

/// The `RasterFrame` RGB8 buffer.
pub mod frame;
/// Cover-crop and contain-fit resizing.
pub mod resample;
/// Unsharp masking.
pub mod sharpen;
