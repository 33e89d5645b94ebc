//! Configuration and error types shared by every stage.

/// Dimensions, frame rate and pipeline configuration.
pub mod core;
/// Crate-wide error type.
pub mod error;
pub(crate) mod math;
