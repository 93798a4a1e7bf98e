use crate::foundation::core::{AtlasSize, CellSize, Fps, PixelPos};
use crate::foundation::error::{SpritebakeError, SpritebakeResult};

/// Platform cap on atlas width and height.
pub const DEFAULT_MAX_ATLAS_DIM: u32 = 4096;

/// Largest atlas axis ever allocated, whatever the configured cap and policy.
pub const HARD_MAX_ATLAS_DIM: u32 = 16384;

// Absorbs float noise in `duration * fps` (e.g. 0.1 s at 30 fps is 3.0000000000000004).
const FRAME_COUNT_EPSILON: f64 = 1e-9;

/// What to do when the planned atlas exceeds the cap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OversizePolicy {
    /// Report the condition and refuse to start the capture.
    #[default]
    Abort,
    /// Report the condition as a warning and allocate the full-size atlas anyway.
    Proceed,
}

/// Number of frames captured for a clip: `ceil(duration * fps)`, never less than one.
pub fn frame_count(duration_secs: f64, fps: Fps) -> SpritebakeResult<u32> {
    if !duration_secs.is_finite() || duration_secs < 0.0 {
        return Err(SpritebakeError::validation(format!(
            "clip duration must be finite and >= 0, got {duration_secs}"
        )));
    }
    let raw = (duration_secs * fps.as_f64() - FRAME_COUNT_EPSILON).ceil().max(1.0);
    if raw > f64::from(u32::MAX) {
        return Err(SpritebakeError::validation(format!(
            "clip of {duration_secs}s at {} fps produces too many frames",
            fps.get()
        )));
    }
    Ok(raw as u32)
}

/// Smallest `n` with `n * n >= frame_count`.
pub fn grid_dim(frame_count: u32) -> u32 {
    let fc = u64::from(frame_count);
    let mut n = (fc as f64).sqrt() as u64;
    while n * n < fc {
        n += 1;
    }
    while n > 0 && (n - 1) * (n - 1) >= fc {
        n -= 1;
    }
    n as u32
}

/// Bottom-left pixel of `frame` in an atlas of `grid_dim` x `grid_dim` cells, in texture
/// coordinates (`y` grows upwards, see [`crate::AtlasBuffer`]).
///
/// Frame 0 sits at `(0, atlas_height - cell_height)`, the top-left cell; frames advance left to
/// right and drop one row after every `grid_dim` frames. Saved images therefore read top to
/// bottom in frame order.
pub fn position_of(frame: u32, grid_dim: u32, cell: CellSize) -> SpritebakeResult<PixelPos> {
    let cells = u64::from(grid_dim) * u64::from(grid_dim);
    if u64::from(frame) >= cells {
        return Err(SpritebakeError::out_of_bounds(format!(
            "frame {frame} does not fit a {grid_dim}x{grid_dim} grid"
        )));
    }
    let row = frame / grid_dim;
    let col = frame % grid_dim;
    let x = u64::from(col) * u64::from(cell.width);
    let y = u64::from(grid_dim - 1 - row) * u64::from(cell.height);
    let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
        return Err(SpritebakeError::out_of_bounds(format!(
            "frame {frame} at ({x}, {y}) is not addressable with {}x{} cells",
            cell.width, cell.height
        )));
    };
    Ok(PixelPos { x, y })
}

/// Grid layout of a capture: cell count per axis and the resulting atlas size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AtlasLayout {
    /// Frames to be packed.
    pub frame_count: u32,
    /// Cells per row and per column.
    pub grid_dim: u32,
    /// Size of one cell.
    pub cell: CellSize,
    /// `grid_dim * cell` in both axes.
    pub atlas: AtlasSize,
}

impl AtlasLayout {
    /// Plan a near-square grid for `frame_count` cells of size `cell`.
    ///
    /// This never applies the platform cap; see [`AtlasLayout::check_cap`].
    #[tracing::instrument(level = "debug")]
    pub fn plan(frame_count: u32, cell: CellSize) -> SpritebakeResult<Self> {
        if frame_count == 0 {
            return Err(SpritebakeError::validation("frame count must be >= 1"));
        }
        cell.validate()?;

        let grid_dim = grid_dim(frame_count);
        let width = u64::from(grid_dim) * u64::from(cell.width);
        let height = u64::from(grid_dim) * u64::from(cell.height);
        let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(height)) else {
            return Err(SpritebakeError::Oversize {
                width,
                height,
                cap: u32::MAX,
            });
        };

        Ok(Self {
            frame_count,
            grid_dim,
            cell,
            atlas: AtlasSize {
                width: w,
                height: h,
            },
        })
    }

    /// Return `true` when either axis exceeds `cap`.
    pub fn exceeds(&self, cap: u32) -> bool {
        self.atlas.width > cap || self.atlas.height > cap
    }

    /// Report an [`SpritebakeError::Oversize`] when either axis exceeds `cap`.
    pub fn check_cap(&self, cap: u32) -> SpritebakeResult<()> {
        if self.exceeds(cap) {
            return Err(SpritebakeError::Oversize {
                width: u64::from(self.atlas.width),
                height: u64::from(self.atlas.height),
                cap,
            });
        }
        Ok(())
    }

    /// Apply `policy` to the cap check. Oversize is always logged; only `Abort` turns it into an
    /// error.
    pub fn enforce_cap(&self, cap: u32, policy: OversizePolicy) -> SpritebakeResult<()> {
        let Err(err) = self.check_cap(cap) else {
            return Ok(());
        };
        match policy {
            OversizePolicy::Abort => {
                tracing::warn!(%err, "refusing to capture oversize atlas");
                Err(err)
            }
            OversizePolicy::Proceed => {
                tracing::warn!(%err, "capturing oversize atlas as configured");
                Ok(())
            }
        }
    }

    /// Pixel position of `frame`.
    pub fn position_of(&self, frame: u32) -> SpritebakeResult<PixelPos> {
        if frame >= self.frame_count {
            return Err(SpritebakeError::out_of_bounds(format!(
                "frame {frame} outside capture of {} frames",
                self.frame_count
            )));
        }
        position_of(frame, self.grid_dim, self.cell)
    }

    /// Positions of every frame in capture order.
    pub fn positions(&self) -> impl Iterator<Item = PixelPos> + '_ {
        (0..self.frame_count).filter_map(|f| self.position_of(f).ok())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/planner.rs"]
mod tests;
