//! `lcdanim` builds the two animation assets a small embedded LCD plays back:
//!
//! - **ANIM**: 256-colour indexed frames, run-length encoded, with an RGB565 palette.
//! - **MJPEG**: a raw concatenation of complete JPEG frames.
//!
//! Both are driven by an operator-authored [`Timeline`] that reuses decoded source
//! frames or layers pre-positioned mask images over black. Entry points are
//! [`encode_anim`] and [`encode_mjpeg`].
#![forbid(unsafe_code)]

/// ANIM container and RLE codec.
pub mod anim;
/// Mask fetching and source decoding.
pub mod assets;
/// Palettes and quantisation.
pub mod color;
mod foundation;
/// MJPEG parsing and assembly.
pub mod mjpeg;
/// Encode entry points.
pub mod pipeline;
/// RGB rasters, resampling and sharpening.
pub mod raster;
/// Timeline model and compositor.
pub mod timeline;

pub use crate::foundation::core::{Dimensions, Fps, PipelineConfig};
pub use crate::foundation::error::{AnimError, AnimResult};

pub use crate::anim::container::{AnimFile, AnimHeader, AnimWriter};
pub use crate::assets::fetch::{DirFetcher, ImageFetcher, MemoryFetcher};
pub use crate::color::palette::{Palette, PaletteSamples};
pub use crate::color::quantize::IndexedRaster;
pub use crate::mjpeg::assemble::{MjpegAssembler, MjpegIndex};
pub use crate::mjpeg::parse::parse_jpeg_frames;
pub use crate::pipeline::{
    AnimOutput, EncodeStats, MjpegOutput, encode_anim, encode_mjpeg, encode_mjpeg_stream,
};
pub use crate::raster::frame::RasterFrame;
pub use crate::timeline::compositor::{Fallback, SlotResolution, resolve_slot_or_fallback};
pub use crate::timeline::model::{
    Artifact, HardwareAction, Phase, Region, Regions, SlotKind, Timeline, TimelineSlot,
};
