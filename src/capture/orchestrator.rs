use crate::animation::pose::{CaptureTarget, PoseSource};
use crate::animation::sampler::{frame_time, sample_pose};
use crate::atlas::pair::AtlasPair;
use crate::capture::settings::CaptureSettings;
use crate::foundation::error::{SpritebakeError, SpritebakeResult};
use crate::layout::planner::AtlasLayout;
use crate::render::device::{CaptureCamera, RenderDevice};
use crate::render::dual_pass::render_cell;
use crate::render::scope::RenderScope;

/// Completion handoff, invoked once with the finished atlases.
pub type OnComplete<'a> = Box<dyn FnOnce(AtlasPair) + 'a>;

/// Scene references a capture borrows for its whole duration.
///
/// `target`, `clip` and `camera` are user configuration and may be unset; starting a capture with
/// any of them missing is a configuration error.
pub struct CaptureRig<'a> {
    /// Entity the clip is sampled onto.
    pub target: Option<&'a mut dyn CaptureTarget>,
    /// Clip to capture.
    pub clip: Option<&'a dyn PoseSource>,
    /// Camera that renders the target.
    pub camera: Option<&'a mut dyn CaptureCamera>,
    /// Device owning the offscreen render texture.
    pub device: &'a mut dyn RenderDevice,
}

impl<'a> CaptureRig<'a> {
    /// Rig with only a device; set the rest with the builder methods.
    pub fn new(device: &'a mut dyn RenderDevice) -> Self {
        Self {
            target: None,
            clip: None,
            camera: None,
            device,
        }
    }

    /// Set the capture target.
    pub fn with_target(mut self, target: &'a mut dyn CaptureTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the clip.
    pub fn with_clip(mut self, clip: &'a dyn PoseSource) -> Self {
        self.clip = Some(clip);
        self
    }

    /// Set the camera.
    pub fn with_camera(mut self, camera: &'a mut dyn CaptureCamera) -> Self {
        self.camera = Some(camera);
        self
    }

    fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.target.is_none() {
            missing.push("target");
        }
        if self.clip.is_none() {
            missing.push("clip");
        }
        if self.camera.is_none() {
            missing.push("camera");
        }
        missing
    }
}

/// Lifecycle of an orchestrator's most recent capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureState {
    /// No capture started yet.
    Idle,
    /// A session is in progress.
    Running,
    /// The last capture finished and its atlases were handed off.
    Completed,
    /// The last capture was rejected, failed, or cancelled; nothing was handed off.
    Aborted,
}

/// Result of one [`CaptureOrchestrator::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepStatus {
    /// No capture has been started.
    Idle,
    /// More ticks are needed.
    Continue,
    /// The capture completed; the completion callback has run.
    Done,
    /// The capture was aborted.
    Aborted,
}

/// Where a running session is within the current frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FramePhase {
    /// The next step samples the current frame's pose.
    SamplePose,
    /// The pose is applied; the next step renders it, one host tick later.
    AwaitingRenderTick,
}

struct CaptureSession<'a> {
    layout: AtlasLayout,
    duration_secs: f64,
    frame: u32,
    phase: FramePhase,
    target: &'a mut dyn CaptureTarget,
    clip: &'a dyn PoseSource,
    scope: RenderScope<'a>,
    atlases: AtlasPair,
    on_complete: OnComplete<'a>,
}

impl CaptureSession<'_> {
    fn sample_current(&mut self) -> SpritebakeResult<()> {
        let time = frame_time(self.frame, self.layout.frame_count, self.duration_secs);
        let target: &mut dyn CaptureTarget = &mut *self.target;
        sample_pose(Some(self.clip), Some(target), time)?;
        tracing::debug!(frame = self.frame, time, "pose sampled");
        self.phase = FramePhase::AwaitingRenderTick;
        Ok(())
    }

    fn render_current(&mut self) -> SpritebakeResult<()> {
        let cells = render_cell(&mut self.scope)?;
        self.atlases
            .write_frame(self.frame, &cells.color, &cells.normal)?;
        tracing::debug!(frame = self.frame, "frame written");
        self.frame += 1;
        self.phase = FramePhase::SamplePose;
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.frame >= self.layout.frame_count
    }
}

/// Resumable capture state machine, stepped once per host tick.
///
/// Each frame takes two steps: one samples the pose, the next (after the host has run an update
/// and deformation has settled) renders both passes and writes them into the atlases. The render
/// step samples the following frame before returning, so `n` frames take `n + 1` steps.
///
/// At most one session runs at a time. The session holds the camera, device and offscreen texture
/// exclusively; cancelling, failing, completing, or dropping the orchestrator restores them.
pub struct CaptureOrchestrator<'a> {
    settings: CaptureSettings,
    state: CaptureState,
    session: Option<CaptureSession<'a>>,
    last_error: Option<SpritebakeError>,
}

impl<'a> CaptureOrchestrator<'a> {
    /// Create an idle orchestrator.
    pub fn new(settings: CaptureSettings) -> Self {
        Self {
            settings,
            state: CaptureState::Idle,
            session: None,
            last_error: None,
        }
    }

    /// Current persistent settings.
    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    /// Replace settings; a running session keeps the layout it started with.
    pub fn set_settings(&mut self, settings: CaptureSettings) -> SpritebakeResult<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    /// Lifecycle state.
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Whether a session is in progress.
    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Index of the frame being processed, while running.
    pub fn current_frame(&self) -> Option<u32> {
        self.session.as_ref().map(|s| s.frame)
    }

    /// Phase within the current frame, while running.
    pub fn phase(&self) -> Option<FramePhase> {
        self.session.as_ref().map(|s| s.phase)
    }

    /// Layout of the running session.
    pub fn layout(&self) -> Option<AtlasLayout> {
        self.session.as_ref().map(|s| s.layout)
    }

    /// Error that aborted the last session mid-capture, if any.
    pub fn last_error(&self) -> Option<&SpritebakeError> {
        self.last_error.as_ref()
    }

    /// Validate `rig` and the settings, acquire render resources, and enter `Running`.
    ///
    /// Rejected with [`SpritebakeError::Busy`] while a session runs; the running session is not
    /// touched. Any other failure leaves the orchestrator `Aborted` with no resources held.
    #[tracing::instrument(skip_all, fields(fps = self.settings.fps.get()))]
    pub fn start(
        &mut self,
        rig: CaptureRig<'a>,
        on_complete: impl FnOnce(AtlasPair) + 'a,
    ) -> SpritebakeResult<()> {
        if self.is_running() {
            let err = SpritebakeError::busy("a capture is already running on this orchestrator");
            tracing::warn!(%err, "capture start rejected");
            return Err(err);
        }

        match self.open_session(rig, Box::new(on_complete)) {
            Ok(session) => {
                tracing::info!(
                    frames = session.layout.frame_count,
                    grid = session.layout.grid_dim,
                    width = session.layout.atlas.width,
                    height = session.layout.atlas.height,
                    "capture started"
                );
                self.session = Some(session);
                self.state = CaptureState::Running;
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%err, "capture not started");
                self.state = CaptureState::Aborted;
                Err(err)
            }
        }
    }

    fn open_session(
        &self,
        rig: CaptureRig<'a>,
        on_complete: OnComplete<'a>,
    ) -> SpritebakeResult<CaptureSession<'a>> {
        let missing = rig.missing();
        let CaptureRig {
            target: Some(target),
            clip: Some(clip),
            camera: Some(camera),
            device,
        } = rig
        else {
            return Err(SpritebakeError::config(format!(
                "{} must be set before capturing",
                missing.join(", ")
            )));
        };

        if !clip.is_legacy() {
            return Err(SpritebakeError::config(
                "clip must be directly sampleable (legacy) to be captured",
            ));
        }

        let duration_secs = clip.duration_secs();
        let layout = self.settings.plan(duration_secs)?;
        layout.enforce_cap(self.settings.max_atlas_dim, self.settings.oversize_policy)?;

        let atlases = AtlasPair::cleared(layout)?;
        let scope = RenderScope::acquire(camera, device, layout.cell)?;

        Ok(CaptureSession {
            layout,
            duration_secs,
            frame: 0,
            phase: FramePhase::SamplePose,
            target,
            clip,
            scope,
            atlases,
            on_complete,
        })
    }

    /// Advance the running session by one host tick.
    pub fn step(&mut self) -> StepStatus {
        let Some(session) = self.session.as_mut() else {
            return match self.state {
                CaptureState::Completed => StepStatus::Done,
                CaptureState::Aborted => StepStatus::Aborted,
                CaptureState::Idle | CaptureState::Running => StepStatus::Idle,
            };
        };

        let result = match session.phase {
            FramePhase::SamplePose => session.sample_current(),
            FramePhase::AwaitingRenderTick => match session.render_current() {
                Ok(()) if !session.is_finished() => session.sample_current(),
                other => other,
            },
        };
        let finished = session.is_finished();

        match result {
            Err(err) => {
                self.abort(err);
                StepStatus::Aborted
            }
            Ok(()) if finished => {
                self.complete();
                StepStatus::Done
            }
            Ok(()) => StepStatus::Continue,
        }
    }

    /// Cancel the running session: render state is restored and the partial atlases discarded
    /// before this returns. Returns `false` when nothing was running.
    pub fn cancel(&mut self) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        let frame = session.frame;
        drop(session);
        self.state = CaptureState::Aborted;
        tracing::info!(frame, "capture cancelled");
        true
    }

    fn abort(&mut self, err: SpritebakeError) {
        let frame = self.current_frame();
        self.session = None;
        self.state = CaptureState::Aborted;
        tracing::error!(%err, ?frame, "capture aborted");
        self.last_error = Some(err);
    }

    fn complete(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let CaptureSession {
            layout,
            scope,
            atlases,
            on_complete,
            ..
        } = session;
        drop(scope);

        self.state = CaptureState::Completed;
        tracing::info!(
            frames = layout.frame_count,
            width = layout.atlas.width,
            height = layout.atlas.height,
            "capture completed"
        );
        on_complete(atlases);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/orchestrator.rs"]
mod tests;
