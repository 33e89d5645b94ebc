use std::path::{Path, PathBuf};

use crate::foundation::core::Fps;
use crate::foundation::error::{AnimError, AnimResult};
use crate::raster::frame::RasterFrame;

#[derive(Clone, Debug)]
/// Basic metadata about a source video file.
pub struct VideoSourceInfo {
    /// Source path used for probing/decoding.
    #[cfg_attr(not(feature = "media-ffmpeg"), allow(dead_code))]
    pub source_path: PathBuf,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Probe source video dimensions through `ffprobe`.
#[cfg(feature = "media-ffmpeg")]
pub fn probe_video(source_path: &Path) -> AnimResult<VideoSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
    }

    let out = std::process::Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_streams"])
        .arg(source_path)
        .output()
        .map_err(|e| AnimError::fetch_with_cause("failed to run ffprobe", e))?;
    if !out.status.success() {
        return Err(AnimError::fetch(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| AnimError::fetch_with_cause("ffprobe json parse failed", e))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| AnimError::fetch("no video stream found"))?;
    let (Some(width), Some(height)) = (video_stream.width, video_stream.height) else {
        return Err(AnimError::fetch("missing video dimensions from ffprobe"));
    };

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Probe source video dimensions through `ffprobe`.
///
/// Returns an error when `media-ffmpeg` feature is disabled.
pub fn probe_video(_source_path: &Path) -> AnimResult<VideoSourceInfo> {
    Err(AnimError::validation(
        "video sources require the 'media-ffmpeg' feature",
    ))
}

#[cfg(feature = "media-ffmpeg")]
/// Decode the whole video to RGB rasters resampled to `fps`.
pub fn decode_video_frames_rgb8(source: &VideoSourceInfo, fps: Fps) -> AnimResult<Vec<RasterFrame>> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(&source.source_path)
        .args([
            "-vf",
            &format!("fps={}", fps.0),
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "pipe:1",
        ])
        .output()
        .map_err(|e| AnimError::fetch_with_cause("failed to run ffmpeg for video decode", e))?;
    if !out.status.success() {
        return Err(AnimError::fetch(format!(
            "ffmpeg video decode failed for '{}': {}",
            source.source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let frame_len = source.width as usize * source.height as usize * 3;
    if frame_len == 0 {
        return Err(AnimError::fetch(
            "decoded video frame size is zero (invalid source dimensions)",
        ));
    }
    if !out.stdout.len().is_multiple_of(frame_len) {
        return Err(AnimError::fetch(format!(
            "decoded video has invalid size: got {} bytes, expected multiples of {frame_len}",
            out.stdout.len()
        )));
    }

    out.stdout
        .chunks_exact(frame_len)
        .map(|chunk| RasterFrame::new(source.width, source.height, chunk.to_vec()))
        .collect()
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Decode the whole video to RGB rasters resampled to `fps`.
///
/// Returns an error when `media-ffmpeg` feature is disabled.
pub fn decode_video_frames_rgb8(
    _source: &VideoSourceInfo,
    _fps: Fps,
) -> AnimResult<Vec<RasterFrame>> {
    Err(AnimError::validation(
        "video sources require the 'media-ffmpeg' feature",
    ))
}

#[cfg(feature = "media-ffmpeg")]
/// Transcode the video to a raw MJPEG stream at `fps`.
///
/// `quality` follows JPEG conventions (1..=100) and is mapped onto ffmpeg's `-q:v` scale.
pub fn extract_mjpeg(source_path: &Path, fps: Fps, quality: u8) -> AnimResult<Vec<u8>> {
    let qscale = 2 + (100u32.saturating_sub(u32::from(quality.clamp(1, 100))) * 29) / 99;
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(source_path)
        .args([
            "-vf",
            &format!("fps={}", fps.0),
            "-an",
            "-c:v",
            "mjpeg",
            "-q:v",
            &qscale.to_string(),
            "-f",
            "mjpeg",
            "pipe:1",
        ])
        .output()
        .map_err(|e| AnimError::fetch_with_cause("failed to run ffmpeg for mjpeg extract", e))?;
    if !out.status.success() {
        return Err(AnimError::fetch(format!(
            "ffmpeg mjpeg extract failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    Ok(out.stdout)
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Transcode the video to a raw MJPEG stream at `fps`.
///
/// Returns an error when `media-ffmpeg` feature is disabled.
pub fn extract_mjpeg(_source_path: &Path, _fps: Fps, _quality: u8) -> AnimResult<Vec<u8>> {
    Err(AnimError::validation(
        "video sources require the 'media-ffmpeg' feature",
    ))
}

// No unit tests here: these functions shell out to `ffprobe`/`ffmpeg` and are covered by the
// feature-gated integration test in `tests/media_ffmpeg.rs`.
