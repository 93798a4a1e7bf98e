//! Capture sessions: configuration, the step-per-tick orchestrator, host driving, preview.

/// Host update loop trait and the tick driver.
pub mod host;
/// The capture state machine.
pub mod orchestrator;
/// Preview scrubbing outside of captures.
pub mod preview;
/// Persistent capture settings.
pub mod settings;
