use crate::animation::pose::{CaptureTarget, PoseSource};
use crate::foundation::error::{SpritebakeError, SpritebakeResult};

/// Sample `source` at `time_secs` and apply the pose to `target`.
///
/// A missing source or target is reported (logged and returned as a config error) and leaves the
/// target untouched. `time_secs` must lie in `[0, duration)`; a zero-length clip accepts `0`.
///
/// The applied pose may only become visible to a renderer after the host's next update tick.
pub fn sample_pose(
    source: Option<&dyn PoseSource>,
    target: Option<&mut dyn CaptureTarget>,
    time_secs: f64,
) -> SpritebakeResult<()> {
    let (Some(source), Some(target)) = (source, target) else {
        tracing::warn!("clip and target should be set before sampling an animation");
        return Err(SpritebakeError::config(
            "clip and target must be set before sampling",
        ));
    };

    let duration = source.duration_secs();
    let in_range = if duration > 0.0 {
        (0.0..duration).contains(&time_secs)
    } else {
        time_secs == 0.0
    };
    if !time_secs.is_finite() || !in_range {
        return Err(SpritebakeError::validation(format!(
            "sample time {time_secs}s outside clip [0, {duration})"
        )));
    }

    let pose = source.pose_at(time_secs)?;
    target.apply_pose(&pose);
    tracing::trace!(time_secs, channels = pose.channels.len(), "pose applied");
    Ok(())
}

/// Clip time of capture frame `frame`: `frame / frame_count * duration`.
pub fn frame_time(frame: u32, frame_count: u32, duration_secs: f64) -> f64 {
    if frame_count == 0 {
        return 0.0;
    }
    (f64::from(frame) / f64::from(frame_count)) * duration_secs
}

#[cfg(test)]
#[path = "../../tests/unit/animation/sampler.rs"]
mod tests;
