//! Atlas pixel storage.

/// Clearable RGBA8 buffer with checked blits.
pub mod buffer;
/// The diffuse/normal atlas pair produced by a capture.
pub mod pair;
