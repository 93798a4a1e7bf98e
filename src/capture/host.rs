use crate::capture::orchestrator::{CaptureOrchestrator, StepStatus};
use crate::foundation::error::{SpritebakeError, SpritebakeResult};

/// The host's per-tick update (scene deformation, transforms, and so on).
pub trait HostLoop {
    /// Run one host update.
    fn tick(&mut self);
}

/// Step `orchestrator` once per host tick until it leaves `Running`.
///
/// Each iteration steps the orchestrator, then runs the host update, so a pose applied in one step
/// has been through a full host tick before the next step renders it. If the session is still
/// running after `max_ticks`, it is cancelled and a validation error is returned.
pub fn drive(
    orchestrator: &mut CaptureOrchestrator<'_>,
    host: &mut dyn HostLoop,
    max_ticks: u64,
) -> SpritebakeResult<StepStatus> {
    for _ in 0..max_ticks {
        match orchestrator.step() {
            StepStatus::Continue => host.tick(),
            status => return Ok(status),
        }
    }
    if orchestrator.is_running() {
        orchestrator.cancel();
        return Err(SpritebakeError::validation(format!(
            "capture did not finish within {max_ticks} ticks"
        )));
    }
    Ok(orchestrator.step())
}
