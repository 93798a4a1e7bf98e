//! Pose sources, capture targets, and pose sampling.

/// JSON-loadable keyframe clips.
pub mod clip;
/// `Pose` value type and the source/target traits.
pub mod pose;
/// Applying a clip sample to a target.
pub mod sampler;
