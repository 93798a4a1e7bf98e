use crate::animation::pose::{Pose, PoseSource};
use crate::foundation::error::{SpritebakeError, SpritebakeResult};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Interpolation strategy between keyframes.
pub enum InterpMode {
    /// Hold the previous key value until the next keyframe.
    Hold,
    /// Interpolate linearly between keyframes.
    #[default]
    Linear,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One keyframe of a scalar channel.
pub struct Keyframe {
    /// Clip time in seconds.
    pub time: f64,
    /// Value at `time`.
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Keyframed scalar channel.
pub struct Channel {
    /// Keyframes sorted by `time`.
    pub keys: Vec<Keyframe>,
    /// Interpolation mode between adjacent keyframes.
    #[serde(default)]
    pub mode: InterpMode,
}

impl Channel {
    /// Linear channel from `(time, value)` pairs.
    pub fn linear(keys: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self {
            keys: keys
                .into_iter()
                .map(|(time, value)| Keyframe { time, value })
                .collect(),
            mode: InterpMode::Linear,
        }
    }

    fn validate(&self, name: &str) -> SpritebakeResult<()> {
        if self.keys.is_empty() {
            return Err(SpritebakeError::validation(format!(
                "channel '{name}' must have at least one key"
            )));
        }
        if self.keys.iter().any(|k| !k.time.is_finite() || !k.value.is_finite()) {
            return Err(SpritebakeError::validation(format!(
                "channel '{name}' has non-finite keys"
            )));
        }
        if !self.keys.windows(2).all(|w| w[0].time <= w[1].time) {
            return Err(SpritebakeError::validation(format!(
                "channel '{name}' keys must be sorted by time"
            )));
        }
        Ok(())
    }

    /// Sample at clip time `t`; clamps to the first/last key outside the keyed range.
    pub fn sample(&self, t: f64) -> Option<f64> {
        let first = self.keys.first()?;
        let idx = self.keys.partition_point(|k| k.time <= t);
        if idx == 0 {
            return Some(first.value);
        }
        if idx >= self.keys.len() {
            return self.keys.last().map(|k| k.value);
        }

        let a = self.keys[idx - 1];
        let b = self.keys[idx];
        let span = b.time - a.time;
        if span <= 0.0 {
            return Some(a.value);
        }
        match self.mode {
            InterpMode::Hold => Some(a.value),
            InterpMode::Linear => {
                let u = (t - a.time) / span;
                Some(a.value + (b.value - a.value) * u)
            }
        }
    }
}

/// A directly-sampleable clip of named scalar channels.
///
/// This is the JSON-facing clip format: each channel is evaluated independently and the pose
/// carries one value per channel.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct KeyframeClip {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Clip length in seconds.
    pub duration_secs: f64,
    /// Whether the clip supports direct time sampling.
    #[serde(default = "default_legacy")]
    pub legacy: bool,
    /// Channel name to keyframes.
    #[serde(default)]
    pub channels: BTreeMap<String, Channel>,
}

fn default_legacy() -> bool {
    true
}

impl KeyframeClip {
    /// Empty legacy clip of `duration_secs`.
    pub fn new(name: impl Into<String>, duration_secs: f64) -> Self {
        Self {
            name: name.into(),
            duration_secs,
            legacy: true,
            channels: BTreeMap::new(),
        }
    }

    /// Builder-style channel insert.
    pub fn with_channel(mut self, name: impl Into<String>, channel: Channel) -> Self {
        self.channels.insert(name.into(), channel);
        self
    }

    /// Parse a clip from a JSON reader and validate it.
    pub fn from_reader<R: std::io::Read>(r: R) -> SpritebakeResult<Self> {
        let clip: Self = serde_json::from_reader(r)
            .map_err(|e| SpritebakeError::serde(format!("parse clip JSON: {e}")))?;
        clip.validate()?;
        Ok(clip)
    }

    /// Parse a clip from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SpritebakeResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SpritebakeError::validation(format!("open clip JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Validate duration and channel invariants.
    pub fn validate(&self) -> SpritebakeResult<()> {
        if !self.duration_secs.is_finite() || self.duration_secs < 0.0 {
            return Err(SpritebakeError::validation(format!(
                "clip '{}' duration must be finite and >= 0",
                self.name
            )));
        }
        for (name, channel) in &self.channels {
            channel.validate(name)?;
        }
        Ok(())
    }
}

impl PoseSource for KeyframeClip {
    fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    fn is_legacy(&self) -> bool {
        self.legacy
    }

    fn pose_at(&self, time_secs: f64) -> SpritebakeResult<Pose> {
        let mut pose = Pose::at(time_secs);
        for (name, channel) in &self.channels {
            let value = channel.sample(time_secs).ok_or_else(|| {
                SpritebakeError::validation(format!("channel '{name}' has no keys"))
            })?;
            pose.channels.insert(name.clone(), value);
        }
        Ok(pose)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/clip.rs"]
mod tests;
