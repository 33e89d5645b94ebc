use std::collections::HashMap;

use crate::assets::decode::decode_mask;
use crate::foundation::core::Dimensions;
use crate::foundation::error::{AnimError, AnimResult};
use crate::foundation::math::mul_div255_u8;
use crate::raster::frame::RasterFrame;
use crate::raster::resample::contain_fit_rgba;
use crate::timeline::model::{HardwareAction, Phase, Region, SlotKind, Timeline, TimelineSlot};

type PremulRgba8 = [u8; 4];

/// Decoded mask images keyed by URL, each fitted to the target size.
#[derive(Clone, Debug)]
pub struct MaskSet {
    dims: Dimensions,
    masks: HashMap<String, image::RgbaImage>,
}

impl MaskSet {
    pub fn new(dims: Dimensions) -> Self {
        Self {
            dims,
            masks: HashMap::new(),
        }
    }

    /// Add a mask, contain-fitting it when its size differs from the target.
    pub fn insert(&mut self, url: impl Into<String>, img: &image::RgbaImage) {
        self.masks.insert(url.into(), contain_fit_rgba(img, self.dims));
    }

    /// Decode encoded image bytes and add them as a mask.
    pub fn insert_encoded(&mut self, url: impl Into<String>, bytes: &[u8]) -> AnimResult<()> {
        let url = url.into();
        let img = decode_mask(bytes)
            .map_err(|e| AnimError::fetch_with_cause(format!("decode mask '{url}'"), e))?;
        self.insert(url, &img);
        Ok(())
    }

    pub fn get(&self, url: &str) -> Option<&image::RgbaImage> {
        self.masks.get(url)
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }
}

/// Why a slot was replaced by a black frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fallback {
    SourceOutOfRange { index: i64, len: usize },
    NoUsableLayers,
}

impl std::fmt::Display for Fallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fallback::SourceOutOfRange { index, len } => {
                write!(f, "source frame {index} outside 0..{len}")
            }
            Fallback::NoUsableLayers => f.write_str("composite slot has no usable mask images"),
        }
    }
}

/// What one slot resolves to before any pixels are produced.
#[derive(Clone, Debug, PartialEq)]
pub enum SlotResolution<'a> {
    /// Pass through source frame `n`.
    Source(usize),
    /// Layer these masks over black, in order.
    Composite(Vec<&'a image::RgbaImage>),
    /// Substitute a solid black frame.
    Black(Fallback),
}

/// Resolve `slot` against `source_len` decoded frames and the available masks.
///
/// Out-of-range source references and composites without any available mask
/// degrade to [`SlotResolution::Black`] instead of failing the job.
pub fn resolve_slot_or_fallback<'a>(
    slot: &TimelineSlot,
    source_len: usize,
    masks: &'a MaskSet,
) -> SlotResolution<'a> {
    match &slot.kind {
        SlotKind::Full { source_frame_index } => match usize::try_from(*source_frame_index) {
            Ok(i) if i < source_len => SlotResolution::Source(i),
            _ => SlotResolution::Black(Fallback::SourceOutOfRange {
                index: *source_frame_index,
                len: source_len,
            }),
        },
        kind @ SlotKind::Composite { .. } => {
            let layers: Vec<_> = kind
                .layers()
                .into_iter()
                .filter_map(Region::mask_url)
                .filter_map(|url| masks.get(url))
                .collect();
            if layers.is_empty() {
                SlotResolution::Black(Fallback::NoUsableLayers)
            } else {
                SlotResolution::Composite(layers)
            }
        }
    }
}

/// Alpha-composite `layers` over opaque black, then snap near-black pixels.
///
/// Masks are full-frame images already positioned by the editor, so layering
/// happens at the origin with no translation.
pub fn composite_layers(
    layers: &[&image::RgbaImage],
    dims: Dimensions,
    black_snap: u8,
) -> AnimResult<RasterFrame> {
    let mut dst: Vec<PremulRgba8> = vec![[0, 0, 0, 255]; dims.pixel_count()];
    for layer in layers {
        if layer.dimensions() != (dims.width, dims.height) {
            return Err(AnimError::validation(format!(
                "mask {}x{} does not match target {dims}",
                layer.width(),
                layer.height()
            )));
        }
        for (d, s) in dst.iter_mut().zip(layer.as_raw().chunks_exact(4)) {
            *d = over(*d, premultiply([s[0], s[1], s[2], s[3]]));
        }
    }

    let mut rgb = Vec::with_capacity(dims.pixel_count() * 3);
    for px in dst {
        if px[0] < black_snap && px[1] < black_snap && px[2] < black_snap {
            rgb.extend_from_slice(&[0, 0, 0]);
        } else {
            rgb.extend_from_slice(&px[..3]);
        }
    }
    Ok(RasterFrame::from_raw_parts(dims, rgb))
}

fn premultiply(px: [u8; 4]) -> PremulRgba8 {
    let a = u16::from(px[3]);
    [
        mul_div255_u8(u16::from(px[0]), a),
        mul_div255_u8(u16::from(px[1]), a),
        mul_div255_u8(u16::from(px[2]), a),
        px[3],
    ]
}

fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

/// Produces concrete output for each resolved slot.
///
/// Each output path (raster frames, JPEG bytes) implements this once.
pub trait SlotRenderer {
    type Output;

    /// Pass through source frame `index`, known to be in range.
    fn source(&mut self, index: usize) -> AnimResult<Self::Output>;
    /// Emit a freshly composited raster.
    fn composite(&mut self, frame: RasterFrame) -> AnimResult<Self::Output>;
    /// Emit the black fallback frame.
    fn black(&mut self) -> AnimResult<Self::Output>;
}

/// How an output frame was produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameOrigin {
    Source(usize),
    Composite,
    Fallback(Fallback),
}

/// One output frame in timeline order.
#[derive(Clone, Debug)]
pub struct ResolvedFrame<T> {
    pub global: usize,
    pub phase: Phase,
    pub local: usize,
    pub origin: FrameOrigin,
    pub output: T,
    /// The slot's hardware directives, unchanged.
    pub actions: Vec<HardwareAction>,
}

/// Walks a timeline and renders every slot through a [`SlotRenderer`].
pub struct Compositor<'a> {
    timeline: &'a Timeline,
    masks: &'a MaskSet,
    source_len: usize,
    black_snap: u8,
}

impl<'a> Compositor<'a> {
    pub fn new(
        timeline: &'a Timeline,
        masks: &'a MaskSet,
        source_len: usize,
        black_snap: u8,
    ) -> Self {
        Self {
            timeline,
            masks,
            source_len,
            black_snap,
        }
    }

    /// Render every slot in output order.
    pub fn render_all<R: SlotRenderer>(
        &self,
        renderer: &mut R,
    ) -> AnimResult<Vec<ResolvedFrame<R::Output>>> {
        let dims = self.masks.dimensions();
        let mut out = Vec::with_capacity(self.timeline.total_frames());
        for slot_ref in self.timeline.iter_slots() {
            let resolution = resolve_slot_or_fallback(slot_ref.slot, self.source_len, self.masks);
            let (origin, output) = match resolution {
                SlotResolution::Source(i) => (FrameOrigin::Source(i), renderer.source(i)?),
                SlotResolution::Composite(layers) => {
                    let frame = composite_layers(&layers, dims, self.black_snap)?;
                    (FrameOrigin::Composite, renderer.composite(frame)?)
                }
                SlotResolution::Black(reason) => {
                    tracing::warn!(
                        frame = slot_ref.global,
                        phase = %slot_ref.phase,
                        slot = slot_ref.local,
                        %reason,
                        "substituting black frame"
                    );
                    (FrameOrigin::Fallback(reason), renderer.black()?)
                }
            };
            out.push(ResolvedFrame {
                global: slot_ref.global,
                phase: slot_ref.phase,
                local: slot_ref.local,
                origin,
                output,
                actions: slot_ref.slot.actions.clone(),
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/compositor.rs"]
mod tests;
