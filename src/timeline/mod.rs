//! Operator-authored timelines and their resolution into output frames.

/// Slot resolution, fallback policy and mask compositing.
pub mod compositor;
/// JSON-facing timeline model.
pub mod model;
