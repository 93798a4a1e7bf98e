use crate::foundation::core::{CellSize, Fps};
use crate::foundation::error::{SpritebakeError, SpritebakeResult};
use crate::layout::planner::{AtlasLayout, DEFAULT_MAX_ATLAS_DIM, OversizePolicy, frame_count};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Persistent capture configuration.
///
/// Holds only what a user edits between captures; per-capture progress lives in the session and
/// preview position in [`crate::PreviewCursor`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Capture rate.
    pub fps: Fps,
    /// Size of one rendered frame.
    pub cell_size: CellSize,
    /// Behaviour when the planned atlas exceeds `max_atlas_dim`.
    pub oversize_policy: OversizePolicy,
    /// Platform cap on atlas width and height.
    pub max_atlas_dim: u32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            fps: Fps::default(),
            cell_size: CellSize::default(),
            oversize_policy: OversizePolicy::default(),
            max_atlas_dim: DEFAULT_MAX_ATLAS_DIM,
        }
    }
}

impl CaptureSettings {
    /// Parse settings from a JSON reader; missing fields take their defaults.
    pub fn from_reader<R: std::io::Read>(r: R) -> SpritebakeResult<Self> {
        let settings: Self = serde_json::from_reader(r)
            .map_err(|e| SpritebakeError::serde(format!("parse capture settings JSON: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SpritebakeResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SpritebakeError::validation(format!(
                "open capture settings '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check value invariants. Deserialization bypasses the validating constructors, so this
    /// re-checks them.
    pub fn validate(&self) -> SpritebakeResult<()> {
        Fps::new(self.fps.get())?;
        self.cell_size.validate()?;
        if self.max_atlas_dim == 0 {
            return Err(SpritebakeError::validation("max_atlas_dim must be >= 1"));
        }
        Ok(())
    }

    /// Frames captured for a clip of `duration_secs`.
    pub fn frame_count(&self, duration_secs: f64) -> SpritebakeResult<u32> {
        frame_count(duration_secs, self.fps)
    }

    /// Layout for a clip of `duration_secs`, without applying the cap.
    pub fn plan(&self, duration_secs: f64) -> SpritebakeResult<AtlasLayout> {
        self.validate()?;
        AtlasLayout::plan(self.frame_count(duration_secs)?, self.cell_size)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/settings.rs"]
mod tests;
