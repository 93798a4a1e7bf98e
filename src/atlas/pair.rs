use crate::atlas::buffer::AtlasBuffer;
use crate::foundation::core::{NEUTRAL_NORMAL_RGBA8, RgbaImage, TRANSPARENT_RGBA8};
use crate::foundation::error::{SpritebakeError, SpritebakeResult};
use crate::layout::planner::{AtlasLayout, HARD_MAX_ATLAS_DIM};

/// Finished, co-registered diffuse and normal atlases of one capture.
///
/// Both buffers share the same dimensions and frame `i` sits at `layout.position_of(i)` in each.
#[derive(Clone, Debug)]
pub struct AtlasPair {
    /// Grid layout both atlases were packed with.
    pub layout: AtlasLayout,
    /// Shaded (albedo/diffuse) frames.
    pub diffuse: AtlasBuffer,
    /// View-space normal frames.
    pub normal: AtlasBuffer,
}

impl AtlasPair {
    /// Allocate a pair for `layout`, cleared to transparent and flat-normal respectively.
    ///
    /// Layouts beyond [`HARD_MAX_ATLAS_DIM`] are refused before any allocation.
    pub(crate) fn cleared(layout: AtlasLayout) -> SpritebakeResult<Self> {
        if layout.exceeds(HARD_MAX_ATLAS_DIM) {
            return Err(SpritebakeError::resource(format!(
                "{}x{} atlas pair exceeds the {HARD_MAX_ATLAS_DIM}px allocation limit",
                layout.atlas.width, layout.atlas.height
            )));
        }
        Ok(Self {
            layout,
            diffuse: AtlasBuffer::new(layout.atlas, TRANSPARENT_RGBA8),
            normal: AtlasBuffer::new(layout.atlas, NEUTRAL_NORMAL_RGBA8),
        })
    }

    /// Write one frame's cell images into both atlases.
    pub(crate) fn write_frame(
        &mut self,
        frame: u32,
        color: &RgbaImage,
        normal: &RgbaImage,
    ) -> SpritebakeResult<()> {
        let at = self.layout.position_of(frame)?;
        self.diffuse.blit(color, at)?;
        self.normal.blit(normal, at)
    }

    /// Copy out frame `frame` from both atlases as `(diffuse, normal)`.
    pub fn frame_cells(&self, frame: u32) -> SpritebakeResult<(RgbaImage, RgbaImage)> {
        let at = self.layout.position_of(frame)?;
        let cell = self.layout.cell;
        Ok((
            self.diffuse.region(at, cell.width, cell.height)?,
            self.normal.region(at, cell.width, cell.height)?,
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/atlas/pair.rs"]
mod tests;
