//! Rendering: device and camera seams, the scoped offscreen target, the dual-pass cell renderer,
//! and the CPU reference backend.

/// Software reference backend.
pub mod cpu;
/// Render device and camera traits.
pub mod device;
/// Two-pass (shaded + view-space normal) cell rendering.
pub mod dual_pass;
/// RAII hold on camera state and the offscreen texture.
pub mod scope;
