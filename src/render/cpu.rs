//! Software reference backend.
//!
//! The scene is a rig of shaded sphere impostors whose pose is applied lazily: a pose handed to
//! [`SceneTarget`] only becomes visible to [`CpuCamera`] after [`CpuHost`] runs its next tick,
//! like a skinned mesh that is re-deformed once per host frame.

use crate::animation::pose::{CaptureTarget, Pose};
use crate::capture::host::HostLoop;
use crate::foundation::core::{LinearRgba, Point, Rgba, RgbaImage, Vec2};
use crate::foundation::error::{SpritebakeError, SpritebakeResult};
use crate::render::device::{
    CaptureCamera, RenderDevice, RenderTextureDesc, RenderTextureHandle, Shading,
};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Options for [`CpuDevice`].
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuDeviceOpts {
    /// Maximum number of simultaneously live textures. `None` is unbounded.
    pub max_live_textures: Option<usize>,
}

/// Allocation counters of a [`CpuDevice`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuDeviceStats {
    /// Textures created over the device lifetime.
    pub created: u64,
    /// Textures released over the device lifetime.
    pub released: u64,
}

/// In-memory [`RenderDevice`].
#[derive(Debug, Default)]
pub struct CpuDevice {
    opts: CpuDeviceOpts,
    stats: CpuDeviceStats,
    next_id: u32,
    textures: BTreeMap<RenderTextureHandle, RgbaImage>,
    active: Option<RenderTextureHandle>,
}

impl CpuDevice {
    /// Create an unbounded device.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a device with explicit options.
    pub fn with_opts(opts: CpuDeviceOpts) -> Self {
        Self {
            opts,
            ..Self::default()
        }
    }

    /// Number of textures currently allocated.
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// Allocation counters.
    pub fn stats(&self) -> CpuDeviceStats {
        self.stats
    }
}

impl RenderDevice for CpuDevice {
    fn create_render_texture(
        &mut self,
        desc: RenderTextureDesc,
    ) -> SpritebakeResult<RenderTextureHandle> {
        if desc.width == 0 || desc.height == 0 {
            return Err(SpritebakeError::resource("render texture must be >= 1x1"));
        }
        if let Some(max) = self.opts.max_live_textures
            && self.textures.len() >= max
        {
            return Err(SpritebakeError::resource(format!(
                "texture budget of {max} exhausted"
            )));
        }

        let handle = RenderTextureHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.textures
            .insert(handle, RgbaImage::new(desc.width, desc.height));
        self.stats.created += 1;
        Ok(handle)
    }

    fn release_render_texture(&mut self, handle: RenderTextureHandle) {
        if self.textures.remove(&handle).is_some() {
            self.stats.released += 1;
        }
        if self.active == Some(handle) {
            self.active = None;
        }
    }

    fn active_render_target(&self) -> Option<RenderTextureHandle> {
        self.active
    }

    fn set_active_render_target(&mut self, handle: Option<RenderTextureHandle>) {
        self.active = handle;
    }

    fn read_pixels(&mut self) -> SpritebakeResult<RgbaImage> {
        let handle = self
            .active
            .ok_or_else(|| SpritebakeError::resource("no active render target to read"))?;
        self.textures
            .get(&handle)
            .cloned()
            .ok_or_else(|| SpritebakeError::resource(format!("{handle:?} was released")))
    }

    fn pixels_mut(&mut self, handle: RenderTextureHandle) -> SpritebakeResult<&mut RgbaImage> {
        self.textures
            .get_mut(&handle)
            .ok_or_else(|| SpritebakeError::resource(format!("unknown texture {handle:?}")))
    }
}

/// One sphere of the rig, in view space (`x` right, `y` up, both in `[-1, 1]`).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SphereJoint {
    /// Joint name; channels `<name>.x`, `<name>.y` and `<name>.radius` offset it.
    pub name: String,
    /// Rest center.
    pub center: Point,
    /// Distance toward the camera, larger is closer.
    pub depth: f64,
    /// Rest radius.
    pub radius: f64,
    /// Straight RGB albedo.
    pub albedo: [u8; 3],
}

impl SphereJoint {
    fn posed(&self, pose: &Pose) -> Self {
        let channel = |suffix: &str| {
            pose.channel(&format!("{}.{suffix}", self.name))
                .unwrap_or(0.0)
        };
        Self {
            center: self.center + Vec2::new(channel("x"), channel("y")),
            radius: (self.radius + channel("radius")).max(0.0),
            ..self.clone()
        }
    }
}

/// Scene content shared by the target, the camera and the host.
#[derive(Debug)]
pub struct CpuScene {
    rest: Vec<SphereJoint>,
    deformed: Vec<SphereJoint>,
    pending: Option<Pose>,
    deformed_time: Option<f64>,
    applied_times: Vec<f64>,
}

/// Single-threaded shared handle to a [`CpuScene`].
pub type SharedScene = Rc<RefCell<CpuScene>>;

impl CpuScene {
    /// Scene in rest pose.
    pub fn new(rest: Vec<SphereJoint>) -> Self {
        Self {
            deformed: rest.clone(),
            rest,
            pending: None,
            deformed_time: None,
            applied_times: Vec::new(),
        }
    }

    /// Wrap a new scene in a shared handle.
    pub fn shared(rest: Vec<SphereJoint>) -> SharedScene {
        Rc::new(RefCell::new(Self::new(rest)))
    }

    fn queue_pose(&mut self, pose: &Pose) {
        self.applied_times.push(pose.time_secs);
        self.pending = Some(pose.clone());
    }

    /// Apply the pending pose, if any. Returns `true` when geometry changed.
    pub fn resolve_deformation(&mut self) -> bool {
        let Some(pose) = self.pending.take() else {
            return false;
        };
        self.deformed = self.rest.iter().map(|j| j.posed(&pose)).collect();
        self.deformed_time = Some(pose.time_secs);
        true
    }

    /// Clip time of the geometry a render would currently see.
    pub fn deformed_time(&self) -> Option<f64> {
        self.deformed_time
    }

    /// Clip times of every pose applied so far, in order.
    pub fn applied_times(&self) -> &[f64] {
        &self.applied_times
    }

    /// Whether a pose is waiting for the next host tick.
    pub fn has_pending_pose(&self) -> bool {
        self.pending.is_some()
    }

    /// Joints as they would be rendered now.
    pub fn deformed_joints(&self) -> &[SphereJoint] {
        &self.deformed
    }
}

/// [`CaptureTarget`] view of a shared scene.
#[derive(Clone, Debug)]
pub struct SceneTarget {
    scene: SharedScene,
}

impl SceneTarget {
    /// Target the rig in `scene`.
    pub fn new(scene: SharedScene) -> Self {
        Self { scene }
    }
}

impl CaptureTarget for SceneTarget {
    fn apply_pose(&mut self, pose: &Pose) {
        self.scene.borrow_mut().queue_pose(pose);
    }
}

/// Host update loop of the software backend: resolves pending deformation once per tick.
#[derive(Clone, Debug)]
pub struct CpuHost {
    scene: SharedScene,
    ticks: u64,
}

impl CpuHost {
    /// Drive `scene`.
    pub fn new(scene: SharedScene) -> Self {
        Self { scene, ticks: 0 }
    }

    /// Ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl HostLoop for CpuHost {
    fn tick(&mut self) {
        self.ticks += 1;
        self.scene.borrow_mut().resolve_deformation();
    }
}

/// Record of one [`CpuCamera`] render.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderRecord {
    /// Shading used.
    pub shading: Shading,
    /// Clip time of the geometry that was drawn, `None` for the rest pose.
    pub pose_time: Option<f64>,
}

/// Orthographic software camera looking down `-z` at a [`CpuScene`].
#[derive(Debug)]
pub struct CpuCamera {
    scene: SharedScene,
    background: LinearRgba,
    target: Option<RenderTextureHandle>,
    light_dir: [f64; 3],
    renders: Vec<RenderRecord>,
}

impl CpuCamera {
    /// Camera over `scene` with the default background and key light.
    pub fn new(scene: SharedScene) -> Self {
        Self {
            scene,
            background: LinearRgba::default(),
            target: None,
            light_dir: normalize([0.4, 0.6, 0.7]),
            renders: Vec::new(),
        }
    }

    /// Every render issued so far.
    pub fn renders(&self) -> &[RenderRecord] {
        &self.renders
    }
}

impl CaptureCamera for CpuCamera {
    fn background(&self) -> LinearRgba {
        self.background
    }

    fn set_background(&mut self, color: LinearRgba) {
        self.background = color;
    }

    fn target_texture(&self) -> Option<RenderTextureHandle> {
        self.target
    }

    fn set_target_texture(&mut self, handle: Option<RenderTextureHandle>) {
        self.target = handle;
    }

    fn render(&mut self, device: &mut dyn RenderDevice, shading: Shading) -> SpritebakeResult<()> {
        let handle = self
            .target
            .ok_or_else(|| SpritebakeError::resource("camera has no target texture"))?;
        let scene = self.scene.borrow();
        let pixels = device.pixels_mut(handle)?;
        let clear = self.background.to_rgba8();
        let (w, h) = (f64::from(pixels.width()), f64::from(pixels.height()));

        for (px, py, out) in pixels.enumerate_pixels_mut() {
            let u = ((f64::from(px) + 0.5) / w) * 2.0 - 1.0;
            let v = 1.0 - ((f64::from(py) + 0.5) / h) * 2.0;
            *out = match nearest_hit(scene.deformed_joints(), u, v) {
                Some((joint, n)) => shade(joint, n, shading, self.light_dir),
                None => clear,
            };
        }

        self.renders.push(RenderRecord {
            shading,
            pose_time: scene.deformed_time(),
        });
        Ok(())
    }
}

fn nearest_hit(joints: &[SphereJoint], u: f64, v: f64) -> Option<(&SphereJoint, [f64; 3])> {
    let mut best: Option<(&SphereJoint, [f64; 3], f64)> = None;
    for joint in joints {
        if joint.radius <= 0.0 {
            continue;
        }
        let dx = u - joint.center.x;
        let dy = v - joint.center.y;
        let d2 = dx * dx + dy * dy;
        let r2 = joint.radius * joint.radius;
        if d2 >= r2 {
            continue;
        }
        let dz = (r2 - d2).sqrt();
        let z = joint.depth + dz;
        if best.is_none_or(|(_, _, bz)| z > bz) {
            let n = [dx / joint.radius, dy / joint.radius, dz / joint.radius];
            best = Some((joint, n, z));
        }
    }
    best.map(|(j, n, _)| (j, n))
}

fn shade(joint: &SphereJoint, n: [f64; 3], shading: Shading, light: [f64; 3]) -> Rgba<u8> {
    match shading {
        Shading::Standard => {
            let lambert = (n[0] * light[0] + n[1] * light[1] + n[2] * light[2]).max(0.0);
            let k = 0.25 + 0.75 * lambert;
            let c = |a: u8| (f64::from(a) * k).round().clamp(0.0, 255.0) as u8;
            Rgba([c(joint.albedo[0]), c(joint.albedo[1]), c(joint.albedo[2]), 255])
        }
        Shading::ViewSpaceNormal => {
            let e = |x: f64| ((x * 0.5 + 0.5) * 255.0).round().clamp(0.0, 255.0) as u8;
            Rgba([e(n[0]), e(n[1]), e(n[2]), 255])
        }
    }
}

fn normalize(v: [f64; 3]) -> [f64; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    [v[0] / len, v[1] / len, v[2] / len]
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
