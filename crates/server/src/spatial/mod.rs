//! Spatial indexing utilities.
//!
//! Uniform grid over the arena, rebuilt every tick from snake bodies.

mod grid;

pub use grid::{GridEntry, SpatialGrid};
