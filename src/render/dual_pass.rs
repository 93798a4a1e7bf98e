use crate::foundation::core::{CellSize, LinearRgba, RgbaImage};
use crate::foundation::error::{SpritebakeError, SpritebakeResult};
use crate::render::device::{CaptureCamera, RenderDevice, RenderTextureHandle, Shading};
use crate::render::scope::RenderScope;

/// The two images rendered for one frame, both exactly cell-sized.
#[derive(Clone, Debug, PartialEq)]
pub struct CellPair {
    /// Standard shaded render over a transparent background.
    pub color: RgbaImage,
    /// View-space normal render over the flat-normal background.
    pub normal: RgbaImage,
}

/// Render the current scene state twice through the scope's offscreen texture.
///
/// Pass 1 clears to transparent and renders with the scene's shading; pass 2 clears to the neutral
/// normal and renders with the view-space normal override. The camera background is left at the
/// pass 2 value; the scope restores it on release.
pub fn render_cell(scope: &mut RenderScope<'_>) -> SpritebakeResult<CellPair> {
    let cell = scope.cell();
    let (camera, device, texture) = scope.parts();

    let color = render_pass(
        camera,
        device,
        texture,
        cell,
        LinearRgba::TRANSPARENT,
        Shading::Standard,
    )?;
    let normal = render_pass(
        camera,
        device,
        texture,
        cell,
        LinearRgba::NEUTRAL_NORMAL,
        Shading::ViewSpaceNormal,
    )?;
    Ok(CellPair { color, normal })
}

fn render_pass(
    camera: &mut (dyn CaptureCamera + '_),
    device: &mut (dyn RenderDevice + '_),
    texture: RenderTextureHandle,
    cell: CellSize,
    background: LinearRgba,
    shading: Shading,
) -> SpritebakeResult<RgbaImage> {
    camera.set_background(background);
    camera.render(device, shading)?;
    device.set_active_render_target(Some(texture));
    let pixels = device.read_pixels()?;
    if pixels.width() != cell.width || pixels.height() != cell.height {
        return Err(SpritebakeError::resource(format!(
            "{shading:?} pass read back {}x{}, expected {}x{}",
            pixels.width(),
            pixels.height(),
            cell.width,
            cell.height
        )));
    }
    Ok(pixels)
}
