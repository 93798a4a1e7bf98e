use crate::animation::pose::{CaptureTarget, PoseSource};
use crate::animation::sampler::{frame_time, sample_pose};
use crate::capture::settings::CaptureSettings;
use crate::foundation::error::{SpritebakeError, SpritebakeResult};

/// Preview scrub position, kept apart from [`CaptureSettings`] and from capture sessions.
///
/// A running capture borrows the target mutably, so previews cannot interleave with it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PreviewCursor {
    frame: u32,
}

impl PreviewCursor {
    /// Cursor at frame 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last frame successfully previewed.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Pose the target at capture frame `frame`, clamped to the clip's frame range.
    ///
    /// Returns the sampled clip time. On error the cursor does not move.
    pub fn seek(
        &mut self,
        settings: &CaptureSettings,
        clip: Option<&dyn PoseSource>,
        target: Option<&mut dyn CaptureTarget>,
        frame: u32,
    ) -> SpritebakeResult<f64> {
        let (Some(clip), Some(target)) = (clip, target) else {
            tracing::warn!("assign the target and clip to start previewing");
            return Err(SpritebakeError::config(
                "target and clip must be set to preview",
            ));
        };
        if !clip.is_legacy() {
            return Err(SpritebakeError::config(
                "clip must be directly sampleable (legacy) to be previewed",
            ));
        }

        let duration = clip.duration_secs();
        let frames = settings.frame_count(duration)?;
        let frame = frame.min(frames - 1);
        let time = frame_time(frame, frames, duration);
        sample_pose(Some(clip), Some(target), time)?;
        self.frame = frame;
        Ok(time)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/preview.rs"]
mod tests;
