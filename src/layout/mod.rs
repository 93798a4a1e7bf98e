//! Grid planning for sprite atlases.

/// Frame count, grid dimension, atlas size and per-frame placement.
pub mod planner;
