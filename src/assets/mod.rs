//! Getting pixels into the pipeline from outside the crate.

/// Image decoding and frame-directory loading.
pub mod decode;
/// `ImageFetcher` trait and bounded parallel fetching.
pub mod fetch;
/// Source-video decode through system `ffmpeg`.
pub mod media;
