use crate::foundation::core::{LinearRgba, RgbaImage};
use crate::foundation::error::SpritebakeResult;

/// Opaque handle to a render texture owned by a [`RenderDevice`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderTextureHandle(pub u32);

/// Texture sampling filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    /// Nearest-neighbour; sprites must stay pixel exact.
    #[default]
    Point,
    /// Bilinear filtering.
    Bilinear,
}

/// Creation parameters of an offscreen render texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderTextureDesc {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Depth buffer precision in bits (0 for none).
    pub depth_bits: u8,
    /// Sampling filter.
    pub filter: FilterMode,
    /// MSAA sample count, 1 disables anti-aliasing.
    pub msaa_samples: u8,
}

impl RenderTextureDesc {
    /// Point-filtered RGBA8 target with a 24-bit depth buffer and no MSAA.
    pub fn capture(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            depth_bits: 24,
            filter: FilterMode::Point,
            msaa_samples: 1,
        }
    }
}

/// Shader selection for one camera render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shading {
    /// The scene's own materials and lights.
    Standard,
    /// Replacement shader writing the view-space normal as `n * 0.5 + 0.5`.
    ViewSpaceNormal,
}

/// Render-resource owner: allocates offscreen textures and reads them back.
pub trait RenderDevice {
    /// Allocate a render texture.
    fn create_render_texture(
        &mut self,
        desc: RenderTextureDesc,
    ) -> SpritebakeResult<RenderTextureHandle>;

    /// Free a render texture. Unknown handles are ignored.
    fn release_render_texture(&mut self, handle: RenderTextureHandle);

    /// Currently bound render target, `None` for the default framebuffer.
    fn active_render_target(&self) -> Option<RenderTextureHandle>;

    /// Bind a render target for subsequent reads.
    fn set_active_render_target(&mut self, handle: Option<RenderTextureHandle>);

    /// Read back the full contents of the active render target.
    fn read_pixels(&mut self) -> SpritebakeResult<RgbaImage>;

    /// CPU-visible storage of `handle`, used by software cameras to rasterize into.
    fn pixels_mut(&mut self, handle: RenderTextureHandle) -> SpritebakeResult<&mut RgbaImage>;
}

/// A camera that renders the scene into its target texture.
pub trait CaptureCamera {
    /// Color the target is cleared to before rendering.
    fn background(&self) -> LinearRgba;

    /// Set the clear color.
    fn set_background(&mut self, color: LinearRgba);

    /// Texture the camera renders into, `None` for the screen.
    fn target_texture(&self) -> Option<RenderTextureHandle>;

    /// Redirect the camera's output.
    fn set_target_texture(&mut self, handle: Option<RenderTextureHandle>);

    /// Clear the target to the background color and render the scene with `shading`.
    fn render(&mut self, device: &mut dyn RenderDevice, shading: Shading) -> SpritebakeResult<()>;
}
