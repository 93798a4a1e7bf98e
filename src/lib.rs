//! spritebake captures an animation clip into a sprite sheet: two co-registered square atlases,
//! one shaded (diffuse) and one holding view-space normals, for flipbook playback with runtime
//! lighting.
//!
//! # Pipeline overview
//!
//! 1. **Plan**: `clip duration + fps + cell size -> AtlasLayout` (near-square grid, frame 0 top-left)
//! 2. **Sample**: apply the clip pose for frame `i` to the target
//! 3. **Settle**: yield one host tick so lazy deformation (skinning) catches up
//! 4. **Render**: shaded pass and normal-override pass into one cell-sized offscreen texture
//! 5. **Pack**: blit both cells into their atlases; after the last frame hand the [`AtlasPair`] off
//!
//! Steps 2-5 run inside [`CaptureOrchestrator`], an explicit state machine the host advances with
//! one [`CaptureOrchestrator::step`] call per tick. Camera and render-target state is held by a
//! scope guard and restored on completion, failure, cancellation, or drop.
//!
//! The engine side (clips, targets, cameras, render devices) is reached through traits. The
//! [`render::cpu`] module provides a software implementation of all of them.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;

/// Pose sources, capture targets, and pose sampling.
pub mod animation;
/// Atlas pixel storage.
pub mod atlas;
/// Capture sessions.
pub mod capture;
/// Persisting finished atlases.
pub mod encode;
/// Grid planning.
pub mod layout;
/// Rendering seams and the CPU backend.
pub mod render;

pub use crate::foundation::core::{
    AtlasSize, CellSize, Fps, LinearRgba, NEUTRAL_NORMAL_RGBA8, PixelPos, Point, Rgba, RgbaImage,
    TRANSPARENT_RGBA8, Vec2,
};
pub use crate::foundation::error::{SpritebakeError, SpritebakeResult};

pub use crate::animation::clip::{Channel, InterpMode, Keyframe, KeyframeClip};
pub use crate::animation::pose::{CaptureTarget, Pose, PoseSource};
pub use crate::animation::sampler::{frame_time, sample_pose};
pub use crate::atlas::buffer::AtlasBuffer;
pub use crate::atlas::pair::AtlasPair;
pub use crate::capture::host::{HostLoop, drive};
pub use crate::capture::orchestrator::{
    CaptureOrchestrator, CaptureRig, CaptureState, FramePhase, OnComplete, StepStatus,
};
pub use crate::capture::preview::PreviewCursor;
pub use crate::capture::settings::CaptureSettings;
pub use crate::encode::png_pair::{NORMAL_MAP_SUFFIX, normal_map_path, save_png_pair};
pub use crate::layout::planner::{
    AtlasLayout, DEFAULT_MAX_ATLAS_DIM, HARD_MAX_ATLAS_DIM, OversizePolicy, frame_count, grid_dim,
    position_of,
};
pub use crate::render::device::{
    CaptureCamera, FilterMode, RenderDevice, RenderTextureDesc, RenderTextureHandle, Shading,
};
pub use crate::render::dual_pass::{CellPair, render_cell};
pub use crate::render::scope::{RenderScope, SavedRenderState};
