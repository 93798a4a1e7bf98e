use crate::foundation::core::{AtlasSize, PixelPos, Rgba, RgbaImage};
use crate::foundation::error::{SpritebakeError, SpritebakeResult};
use image::GenericImage;

/// Clearable RGBA8 pixel grid addressed like a GPU texture: `(0, 0)` is the bottom-left pixel and
/// `y` grows upwards.
///
/// Storage is top row first, the order image files are written in, so [`AtlasBuffer::image`] can
/// be encoded as is. Cell images are upright (top row first) on the way in and out.
///
/// Used for both the diffuse and the normal atlas. Writes never blend and never clip: a blit that
/// would leave the buffer is rejected as a whole.
#[derive(Clone, Debug, PartialEq)]
pub struct AtlasBuffer {
    image: RgbaImage,
}

impl AtlasBuffer {
    /// Allocate a buffer of `size` with every pixel set to `fill`.
    pub fn new(size: AtlasSize, fill: Rgba<u8>) -> Self {
        Self {
            image: RgbaImage::from_pixel(size.width, size.height, fill),
        }
    }

    /// Buffer dimensions.
    pub fn size(&self) -> AtlasSize {
        AtlasSize {
            width: self.image.width(),
            height: self.image.height(),
        }
    }

    /// Set every pixel to `fill`.
    pub fn clear(&mut self, fill: Rgba<u8>) {
        for px in self.image.pixels_mut() {
            *px = fill;
        }
    }

    /// Copy `cell` into the buffer with its bottom-left corner at `at`, overwriting.
    pub fn blit(&mut self, cell: &RgbaImage, at: PixelPos) -> SpritebakeResult<()> {
        if !self.contains(at, cell.width(), cell.height()) {
            return Err(SpritebakeError::out_of_bounds(format!(
                "{}x{} blit at ({}, {}) leaves {}x{} buffer",
                cell.width(),
                cell.height(),
                at.x,
                at.y,
                self.image.width(),
                self.image.height()
            )));
        }
        let row = self.storage_row(at.y, cell.height());
        self.image
            .copy_from(cell, at.x, row)
            .map_err(|e| SpritebakeError::out_of_bounds(e.to_string()))
    }

    /// Read one pixel, `y` counted from the bottom row.
    pub fn pixel(&self, x: u32, y: u32) -> SpritebakeResult<Rgba<u8>> {
        let height = self.image.height();
        let px = if y < height {
            self.image.get_pixel_checked(x, height - 1 - y)
        } else {
            None
        };
        px.copied().ok_or_else(|| {
            SpritebakeError::out_of_bounds(format!(
                "pixel ({x}, {y}) outside {}x{} buffer",
                self.image.width(),
                self.image.height()
            ))
        })
    }

    /// Copy out the upright `width` x `height` region whose bottom-left corner is `at`.
    pub fn region(&self, at: PixelPos, width: u32, height: u32) -> SpritebakeResult<RgbaImage> {
        if !self.contains(at, width, height) {
            return Err(SpritebakeError::out_of_bounds(format!(
                "{width}x{height} region at ({}, {}) leaves {}x{} buffer",
                at.x,
                at.y,
                self.image.width(),
                self.image.height()
            )));
        }
        let row = self.storage_row(at.y, height);
        Ok(image::imageops::crop_imm(&self.image, at.x, row, width, height).to_image())
    }

    fn contains(&self, at: PixelPos, width: u32, height: u32) -> bool {
        let right = u64::from(at.x) + u64::from(width);
        let top = u64::from(at.y) + u64::from(height);
        right <= u64::from(self.image.width()) && top <= u64::from(self.image.height())
    }

    // Storage row of the top edge of a `height`-tall span starting at bottom-up row `y`.
    // Callers check `contains` first.
    fn storage_row(&self, y: u32, height: u32) -> u32 {
        self.image.height() - y - height
    }

    /// Borrow the underlying image, top row first.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Take the underlying image.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

#[cfg(test)]
#[path = "../../tests/unit/atlas/buffer.rs"]
mod tests;
