//! The two encode entry points.
//!
//! Both validate first, fetch every mask once, then resolve the timeline in
//! output order. The ANIM path finishes its palette from all resolved frames
//! before quantising any of them.

use rayon::prelude::*;

use crate::anim::container::AnimWriter;
use crate::anim::rle;
use crate::assets::fetch::{ImageFetcher, fetch_masks};
use crate::color::palette::{Palette, PaletteSamples};
use crate::color::quantize::{QuantizeOpts, quantize};
use crate::foundation::core::{Dimensions, PipelineConfig, build_thread_pool};
use crate::foundation::error::{AnimError, AnimResult};
use crate::mjpeg::assemble::{MjpegAssembler, MjpegIndex, encode_jpeg};
use crate::mjpeg::parse::parse_jpeg_frames;
use crate::raster::frame::RasterFrame;
use crate::raster::resample::cover_crop;
use crate::raster::sharpen::unsharp_mask;
use crate::timeline::compositor::{Compositor, FrameOrigin, ResolvedFrame, SlotRenderer};
use crate::timeline::model::{HardwareAction, Timeline};

/// Per-job counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct EncodeStats {
    pub frames_total: usize,
    pub frames_source: usize,
    pub frames_composite: usize,
    pub frames_fallback: usize,
    pub output_bytes: usize,
}

impl EncodeStats {
    fn from_resolved<T>(frames: &[ResolvedFrame<T>]) -> Self {
        let mut stats = Self {
            frames_total: frames.len(),
            ..Self::default()
        };
        for f in frames {
            match f.origin {
                FrameOrigin::Source(_) => stats.frames_source += 1,
                FrameOrigin::Composite => stats.frames_composite += 1,
                FrameOrigin::Fallback(_) => stats.frames_fallback += 1,
            }
        }
        stats
    }
}

/// Encoded ANIM file plus per-frame passthrough metadata.
#[derive(Clone, Debug)]
pub struct AnimOutput {
    pub bytes: Vec<u8>,
    /// Hardware directives of each output frame, in timeline order.
    pub actions: Vec<Vec<HardwareAction>>,
    pub stats: EncodeStats,
}

/// Encoded MJPEG stream, its seek index and per-frame passthrough metadata.
#[derive(Clone, Debug)]
pub struct MjpegOutput {
    pub bytes: Vec<u8>,
    pub index: MjpegIndex,
    /// Hardware directives of each output frame, in timeline order.
    pub actions: Vec<Vec<HardwareAction>>,
    pub stats: EncodeStats,
}

fn validate_job(timeline: &Timeline, cfg: &PipelineConfig) -> AnimResult<Dimensions> {
    cfg.validate()?;
    timeline.validate()?;
    cfg.dimensions()
}

struct RasterRenderer<'a> {
    sources: &'a [RasterFrame],
    dims: Dimensions,
}

impl SlotRenderer for RasterRenderer<'_> {
    type Output = RasterFrame;

    fn source(&mut self, index: usize) -> AnimResult<RasterFrame> {
        Ok(cover_crop(&self.sources[index], self.dims))
    }

    fn composite(&mut self, frame: RasterFrame) -> AnimResult<RasterFrame> {
        Ok(frame)
    }

    fn black(&mut self) -> AnimResult<RasterFrame> {
        Ok(RasterFrame::black(self.dims))
    }
}

/// Encode `timeline` over decoded `source_frames` into an ANIM buffer.
#[tracing::instrument(skip_all, fields(slots = timeline.total_frames(), sources = source_frames.len()))]
pub fn encode_anim(
    timeline: &Timeline,
    source_frames: &[RasterFrame],
    fetcher: &dyn ImageFetcher,
    cfg: &PipelineConfig,
) -> AnimResult<AnimOutput> {
    let dims = validate_job(timeline, cfg)?;
    if timeline.total_frames() > usize::from(u16::MAX) {
        return Err(AnimError::validation(format!(
            "timeline has {} frames, anim supports at most {}",
            timeline.total_frames(),
            u16::MAX
        )));
    }

    let masks = fetch_masks(timeline, fetcher, dims, cfg.fetch_threads)?;
    let mut renderer = RasterRenderer {
        sources: source_frames,
        dims,
    };
    let resolved = Compositor::new(timeline, &masks, source_frames.len(), cfg.composite_black_snap)
        .render_all(&mut renderer)?;
    let mut stats = EncodeStats::from_resolved(&resolved);
    let (frames, actions): (Vec<RasterFrame>, Vec<Vec<HardwareAction>>) =
        resolved.into_iter().map(|f| (f.output, f.actions)).unzip();

    let pool = build_thread_pool(cfg.encode_threads)?;
    let frames = if cfg.sharpen_amount > 0.0 {
        pool.install(|| {
            frames
                .par_iter()
                .map(|f| unsharp_mask(f, cfg.sharpen_radius, cfg.sharpen_sigma, cfg.sharpen_amount))
                .collect::<AnimResult<Vec<_>>>()
        })?
    } else {
        frames
    };

    // Every frame is final here; the palette is fixed before any quantisation.
    let palette = Palette::build(&PaletteSamples::collect(&frames, cfg), cfg.saturation_boost);

    let opts = QuantizeOpts::from(cfg);
    let blocks: Vec<Vec<u8>> = pool.install(|| {
        frames
            .par_iter()
            .map(|f| rle::encode(quantize(f, &palette, opts).indices()))
            .collect()
    });

    let mut writer = AnimWriter::new(dims, &palette)?;
    for block in blocks {
        writer.push_block(block)?;
    }
    let bytes = writer.finish()?;
    stats.output_bytes = bytes.len();

    tracing::debug!(?stats, palette_colors = palette.content_len(), "anim encoded");
    Ok(AnimOutput {
        bytes,
        actions,
        stats,
    })
}

struct JpegRenderer<'a, S> {
    sources: &'a [S],
    dims: Dimensions,
    quality: u8,
    black: Option<Vec<u8>>,
}

impl<S: AsRef<[u8]>> SlotRenderer for JpegRenderer<'_, S> {
    type Output = Vec<u8>;

    fn source(&mut self, index: usize) -> AnimResult<Vec<u8>> {
        Ok(self.sources[index].as_ref().to_vec())
    }

    fn composite(&mut self, frame: RasterFrame) -> AnimResult<Vec<u8>> {
        encode_jpeg(&frame, self.quality)
    }

    fn black(&mut self) -> AnimResult<Vec<u8>> {
        if let Some(jpeg) = &self.black {
            return Ok(jpeg.clone());
        }
        let jpeg = encode_jpeg(&RasterFrame::black(self.dims), self.quality)?;
        self.black = Some(jpeg.clone());
        Ok(jpeg)
    }
}

/// Encode `timeline` over already-split source JPEGs into an MJPEG stream.
#[tracing::instrument(skip_all, fields(slots = timeline.total_frames(), sources = source_jpegs.len()))]
pub fn encode_mjpeg<S: AsRef<[u8]>>(
    timeline: &Timeline,
    source_jpegs: &[S],
    fetcher: &dyn ImageFetcher,
    cfg: &PipelineConfig,
) -> AnimResult<MjpegOutput> {
    let dims = validate_job(timeline, cfg)?;

    let masks = fetch_masks(timeline, fetcher, dims, cfg.fetch_threads)?;
    let mut renderer = JpegRenderer {
        sources: source_jpegs,
        dims,
        quality: cfg.jpeg_quality,
        black: None,
    };
    let resolved = Compositor::new(timeline, &masks, source_jpegs.len(), cfg.composite_black_snap)
        .render_all(&mut renderer)?;
    let mut stats = EncodeStats::from_resolved(&resolved);

    let mut assembler = MjpegAssembler::new();
    let mut actions = Vec::with_capacity(resolved.len());
    for frame in resolved {
        assembler.push_frame(&frame.output)?;
        actions.push(frame.actions);
    }
    let (bytes, index) = assembler.finish(timeline.fps);
    stats.output_bytes = bytes.len();

    tracing::debug!(?stats, "mjpeg encoded");
    Ok(MjpegOutput {
        bytes,
        index,
        actions,
        stats,
    })
}

/// Split a raw MJPEG buffer into source frames and encode as [`encode_mjpeg`].
pub fn encode_mjpeg_stream(
    timeline: &Timeline,
    source_mjpeg: &[u8],
    fetcher: &dyn ImageFetcher,
    cfg: &PipelineConfig,
) -> AnimResult<MjpegOutput> {
    let sources = parse_jpeg_frames(source_mjpeg);
    tracing::debug!(frames = sources.len(), "parsed source mjpeg");
    encode_mjpeg(timeline, &sources, fetcher, cfg)
}
