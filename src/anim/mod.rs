//! The ANIM container: a fixed header and RGB565 palette followed by RLE frame blocks.
//!
//! Layout (little-endian throughout):
//!
//! | offset | size | field |
//! |---|---|---|
//! | 0 | 4 | magic `ANIM` |
//! | 4 | 1 | version (1) |
//! | 5 | 2 | frame count |
//! | 7 | 2 | width |
//! | 9 | 2 | height |
//! | 11 | 1 | palette size (0 = 256) |
//! | 12 | 2 | reserved (0) |
//!
//! followed by `palette size` RGB565 `u16`s and, per frame, a `u32` byte length
//! and that many RLE bytes.

/// Container writer and reader.
pub mod container;
/// `(run, index)` run-length codec.
pub mod rle;
