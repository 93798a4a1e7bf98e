use crate::foundation::core::{CellSize, LinearRgba};
use crate::foundation::error::{SpritebakeError, SpritebakeResult};
use crate::render::device::{
    CaptureCamera, RenderDevice, RenderTextureDesc, RenderTextureHandle,
};

/// Camera and device state a capture changes and must put back.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SavedRenderState {
    /// Camera output texture before the capture.
    pub camera_target: Option<RenderTextureHandle>,
    /// Camera background before the capture.
    pub background: LinearRgba,
    /// Device render target binding before the capture.
    pub active_target: Option<RenderTextureHandle>,
}

impl SavedRenderState {
    fn capture(camera: &dyn CaptureCamera, device: &dyn RenderDevice) -> Self {
        Self {
            camera_target: camera.target_texture(),
            background: camera.background(),
            active_target: device.active_render_target(),
        }
    }

    fn restore(&self, camera: &mut dyn CaptureCamera, device: &mut dyn RenderDevice) {
        device.set_active_render_target(self.active_target);
        camera.set_target_texture(self.camera_target);
        camera.set_background(self.background);
    }
}

/// Exclusive hold on a camera, its device, and one cell-sized offscreen texture.
///
/// Dropping the scope restores the device binding, the camera target and background, and
/// releases the offscreen texture, on every exit path.
pub struct RenderScope<'a> {
    camera: &'a mut dyn CaptureCamera,
    device: &'a mut dyn RenderDevice,
    saved: SavedRenderState,
    texture: RenderTextureHandle,
    cell: CellSize,
}

impl<'a> RenderScope<'a> {
    /// Save camera/device state, allocate the offscreen texture, and point the camera at it.
    pub fn acquire(
        camera: &'a mut dyn CaptureCamera,
        device: &'a mut dyn RenderDevice,
        cell: CellSize,
    ) -> SpritebakeResult<Self> {
        cell.validate()?;
        let saved = SavedRenderState::capture(&*camera, &*device);

        let texture = match device
            .create_render_texture(RenderTextureDesc::capture(cell.width, cell.height))
        {
            Ok(t) => t,
            Err(e) => {
                saved.restore(camera, device);
                tracing::error!(%e, "offscreen render texture allocation failed");
                return Err(SpritebakeError::resource(format!(
                    "create {}x{} offscreen texture: {e}",
                    cell.width, cell.height
                )));
            }
        };
        camera.set_target_texture(Some(texture));
        tracing::debug!(?texture, ?cell, "render scope acquired");

        Ok(Self {
            camera,
            device,
            saved,
            texture,
            cell,
        })
    }

    /// State that will be restored on drop.
    pub fn saved(&self) -> SavedRenderState {
        self.saved
    }

    /// The offscreen texture both passes render into.
    pub fn texture(&self) -> RenderTextureHandle {
        self.texture
    }

    /// Cell size the texture was allocated with.
    pub fn cell(&self) -> CellSize {
        self.cell
    }

    pub(crate) fn parts(
        &mut self,
    ) -> (
        &mut (dyn CaptureCamera + 'a),
        &mut (dyn RenderDevice + 'a),
        RenderTextureHandle,
    ) {
        (&mut *self.camera, &mut *self.device, self.texture)
    }
}

impl Drop for RenderScope<'_> {
    fn drop(&mut self) {
        self.saved.restore(&mut *self.camera, &mut *self.device);
        self.device.release_render_texture(self.texture);
        tracing::debug!(texture = ?self.texture, "render scope released");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scope.rs"]
mod tests;
