use crate::foundation::error::SpritebakeResult;
use std::collections::BTreeMap;

/// One sampled pose: the clip time it was taken at and the value of every animated channel.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pose {
    /// Clip time in seconds.
    pub time_secs: f64,
    /// Channel name to sampled value.
    pub channels: BTreeMap<String, f64>,
}

impl Pose {
    /// Empty pose at `time_secs`.
    pub fn at(time_secs: f64) -> Self {
        Self {
            time_secs,
            channels: BTreeMap::new(),
        }
    }

    /// Builder-style channel insert.
    pub fn with_channel(mut self, name: impl Into<String>, value: f64) -> Self {
        self.channels.insert(name.into(), value);
        self
    }

    /// Value of `name`, if the clip animates it.
    pub fn channel(&self, name: &str) -> Option<f64> {
        self.channels.get(name).copied()
    }
}

/// A time-parameterized pose producer (an animation clip).
///
/// Owned by the host; a capture only borrows it.
pub trait PoseSource {
    /// Clip length in seconds.
    fn duration_secs(&self) -> f64;

    /// Whether the clip can be sampled directly at an arbitrary time without evaluating an
    /// animation graph. Capture and preview refuse clips that cannot.
    fn is_legacy(&self) -> bool {
        true
    }

    /// Evaluate the pose at absolute clip time `time_secs`.
    fn pose_at(&self, time_secs: f64) -> SpritebakeResult<Pose>;
}

/// The entity whose visual state a pose drives.
///
/// Implementations may defer deformation (skinning, mesh updates) until the host's next update
/// tick; renderers must not assume an applied pose is visible before then.
pub trait CaptureTarget {
    /// Apply `pose` to the target's deformation state.
    fn apply_pose(&mut self, pose: &Pose);
}
