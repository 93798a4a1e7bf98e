use crate::foundation::error::{SpritebakeError, SpritebakeResult};

pub use image::{Rgba, RgbaImage};
pub use kurbo::{Point, Vec2};

/// Fully transparent black, the clear value of the diffuse atlas.
pub const TRANSPARENT_RGBA8: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Flat tangent-space normal `(0.5, 0.5, 1.0)` with zero alpha, the clear value of the normal atlas.
pub const NEUTRAL_NORMAL_RGBA8: Rgba<u8> = Rgba([128, 128, 255, 0]);

/// Width x height in pixels of one captured frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CellSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CellSize {
    /// Create a validated cell size, both axes must be >= 1.
    pub fn new(width: u32, height: u32) -> SpritebakeResult<Self> {
        let size = Self { width, height };
        size.validate()?;
        Ok(size)
    }

    /// Check the positivity invariant.
    pub fn validate(self) -> SpritebakeResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SpritebakeError::validation(format!(
                "cell size must be >= 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Number of pixels in one cell.
    pub fn pixel_count(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl Default for CellSize {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
        }
    }
}

/// Pixel dimensions of a whole atlas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AtlasSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Pixel position in atlas texture coordinates: origin at the bottom-left, y grows upwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PixelPos {
    /// Column of the left edge.
    pub x: u32,
    /// Row of the bottom edge, counted from the bottom of the atlas.
    pub y: u32,
}

impl PixelPos {
    /// Construct a position.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Integer capture rate in frames per second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Fps(u32);

impl Fps {
    /// Create a validated rate, must be >= 1.
    pub fn new(fps: u32) -> SpritebakeResult<Self> {
        if fps == 0 {
            return Err(SpritebakeError::validation("fps must be >= 1"));
        }
        Ok(Self(fps))
    }

    /// Raw frames-per-second value.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self(30)
    }
}

/// Linear floating-point color with straight alpha, used for camera backgrounds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LinearRgba {
    /// Red in `[0, 1]`.
    pub r: f32,
    /// Green in `[0, 1]`.
    pub g: f32,
    /// Blue in `[0, 1]`.
    pub b: f32,
    /// Alpha in `[0, 1]`.
    pub a: f32,
}

impl LinearRgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    /// Flat normal encoded as a color, zero alpha.
    pub const NEUTRAL_NORMAL: Self = Self::new(0.5, 0.5, 1.0, 0.0);

    /// Construct a color from components.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Quantize to RGBA8, rounding to nearest and clamping to `[0, 255]`.
    pub fn to_rgba8(self) -> Rgba<u8> {
        fn q(c: f32) -> u8 {
            (c * 255.0).round().clamp(0.0, 255.0) as u8
        }
        Rgba([q(self.r), q(self.g), q(self.b), q(self.a)])
    }
}

impl Default for LinearRgba {
    fn default() -> Self {
        Self::new(0.19, 0.3, 0.47, 0.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
