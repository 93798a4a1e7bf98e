/// Convenience result type used across spritebake.
pub type SpritebakeResult<T> = Result<T, SpritebakeError>;

/// Top-level error taxonomy reported to the invoking host.
#[derive(thiserror::Error, Debug)]
pub enum SpritebakeError {
    /// Missing or unusable capture configuration (target, clip, camera).
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid user-provided values (fps, cell size, sample time, clip data).
    #[error("validation error: {0}")]
    Validation(String),

    /// Planned atlas exceeds the platform cap in at least one axis.
    #[error("oversize atlas: {width}x{height} exceeds the {cap}x{cap} cap")]
    Oversize {
        /// Planned atlas width in pixels.
        width: u64,
        /// Planned atlas height in pixels.
        height: u64,
        /// Maximum allowed size per axis.
        cap: u32,
    },

    /// A render resource could not be acquired or read back.
    #[error("resource error: {0}")]
    Resource(String),

    /// A capture session is already running on this orchestrator.
    #[error("capture busy: {0}")]
    Busy(String),

    /// A pixel write or lookup fell outside the addressed buffer.
    #[error("out of bounds: {0}")]
    OutOfBounds(String),

    /// Errors when serializing or deserializing settings and clips.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SpritebakeError {
    /// Build a [`SpritebakeError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`SpritebakeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SpritebakeError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`SpritebakeError::Busy`] value.
    pub fn busy(msg: impl Into<String>) -> Self {
        Self::Busy(msg.into())
    }

    /// Build a [`SpritebakeError::OutOfBounds`] value.
    pub fn out_of_bounds(msg: impl Into<String>) -> Self {
        Self::OutOfBounds(msg.into())
    }

    /// Build a [`SpritebakeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
