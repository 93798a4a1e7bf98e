//! Persisting finished atlases.

/// Matched diffuse/normal PNG output.
pub mod png_pair;
