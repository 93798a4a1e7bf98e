use super::*;
use crate::animation::clip::{Channel, KeyframeClip};
use crate::foundation::core::{CellSize, Fps, LinearRgba, Point};
use crate::layout::planner::{HARD_MAX_ATLAS_DIM, OversizePolicy};
use crate::render::cpu::{CpuCamera, CpuDevice, CpuScene, SceneTarget, SharedScene, SphereJoint};
use crate::render::device::{RenderTextureHandle, Shading};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

struct Fixture {
    scene: SharedScene,
    target: SceneTarget,
    camera: CpuCamera,
    device: CpuDevice,
    clip: KeyframeClip,
}

fn fixture() -> Fixture {
    let scene = CpuScene::shared(vec![SphereJoint {
        name: "ball".to_string(),
        center: Point::new(-0.5, 0.0),
        depth: 0.0,
        radius: 0.3,
        albedo: [220, 40, 40],
    }]);
    Fixture {
        target: SceneTarget::new(scene.clone()),
        camera: CpuCamera::new(scene.clone()),
        device: CpuDevice::new(),
        clip: KeyframeClip::new("slide", 1.0)
            .with_channel("ball.x", Channel::linear([(0.0, 0.0), (1.0, 1.0)])),
        scene,
    }
}

fn settings(fps: u32, cell: u32) -> CaptureSettings {
    CaptureSettings {
        fps: Fps::new(fps).unwrap(),
        cell_size: CellSize::new(cell, cell).unwrap(),
        ..CaptureSettings::default()
    }
}

fn settle(scene: &SharedScene) {
    scene.borrow_mut().resolve_deformation();
}

#[test]
fn step_on_fresh_orchestrator_is_idle() {
    let mut orch = CaptureOrchestrator::new(CaptureSettings::default());
    assert_eq!(orch.step(), StepStatus::Idle);
    assert_eq!(orch.state(), CaptureState::Idle);
    assert!(!orch.cancel());
}

#[test]
fn missing_camera_aborts_without_resources() {
    let mut fx = fixture();
    {
        let mut orch = CaptureOrchestrator::new(settings(4, 8));
        let rig = CaptureRig::new(&mut fx.device)
            .with_target(&mut fx.target)
            .with_clip(&fx.clip);
        let err = orch.start(rig, |_| panic!("must not complete")).unwrap_err();
        assert!(matches!(err, SpritebakeError::Config(ref m) if m.contains("camera")));
        assert_eq!(orch.state(), CaptureState::Aborted);
        assert_eq!(orch.step(), StepStatus::Aborted);
    }
    assert_eq!(fx.device.stats().created, 0);
    assert!(fx.scene.borrow().applied_times().is_empty());
}

#[test]
fn non_legacy_clip_is_rejected() {
    let mut fx = fixture();
    fx.clip.legacy = false;
    let mut orch = CaptureOrchestrator::new(settings(4, 8));
    let rig = CaptureRig::new(&mut fx.device)
        .with_target(&mut fx.target)
        .with_clip(&fx.clip)
        .with_camera(&mut fx.camera);
    let err = orch.start(rig, |_| {}).unwrap_err();
    assert!(matches!(err, SpritebakeError::Config(_)));
}

#[test]
fn oversize_abort_policy_refuses_to_start() {
    let mut fx = fixture();
    {
        let mut s = settings(4, 8);
        s.max_atlas_dim = 10;
        let mut orch = CaptureOrchestrator::new(s);
        let rig = CaptureRig::new(&mut fx.device)
            .with_target(&mut fx.target)
            .with_clip(&fx.clip)
            .with_camera(&mut fx.camera);
        let err = orch.start(rig, |_| {}).unwrap_err();
        assert!(matches!(
            err,
            SpritebakeError::Oversize {
                width: 16,
                height: 16,
                cap: 10
            }
        ));
    }
    assert_eq!(fx.device.stats().created, 0);
    assert_eq!(fx.camera.target_texture(), None);
}

#[test]
fn oversize_proceed_policy_captures_full_atlas() {
    let mut fx = fixture();
    let done = Rc::new(RefCell::new(None));
    {
        let mut s = settings(4, 8);
        s.max_atlas_dim = 10;
        s.oversize_policy = OversizePolicy::Proceed;
        let mut orch = CaptureOrchestrator::new(s);
        let rig = CaptureRig::new(&mut fx.device)
            .with_target(&mut fx.target)
            .with_clip(&fx.clip)
            .with_camera(&mut fx.camera);
        let sink = done.clone();
        orch.start(rig, move |pair| *sink.borrow_mut() = Some(pair))
            .unwrap();
        while orch.step() == StepStatus::Continue {
            settle(&fx.scene);
        }
    }
    let pair = done.borrow_mut().take().unwrap();
    assert_eq!(pair.diffuse.size().width, 16);
}

#[test]
fn phases_alternate_and_frames_advance_in_order() {
    let mut fx = fixture();
    let mut orch = CaptureOrchestrator::new(settings(4, 8));
    let rig = CaptureRig::new(&mut fx.device)
        .with_target(&mut fx.target)
        .with_clip(&fx.clip)
        .with_camera(&mut fx.camera);
    orch.start(rig, |_| {}).unwrap();

    assert_eq!(orch.state(), CaptureState::Running);
    assert_eq!(orch.current_frame(), Some(0));
    assert_eq!(orch.phase(), Some(FramePhase::SamplePose));

    assert_eq!(orch.step(), StepStatus::Continue);
    assert_eq!(orch.current_frame(), Some(0));
    assert_eq!(orch.phase(), Some(FramePhase::AwaitingRenderTick));
    assert_eq!(fx.scene.borrow().applied_times(), &[0.0]);

    settle(&fx.scene);
    assert_eq!(orch.step(), StepStatus::Continue);
    assert_eq!(orch.current_frame(), Some(1));
    assert_eq!(orch.phase(), Some(FramePhase::AwaitingRenderTick));
    assert_eq!(fx.scene.borrow().applied_times(), &[0.0, 0.25]);

    let mut steps = 2;
    loop {
        settle(&fx.scene);
        steps += 1;
        match orch.step() {
            StepStatus::Continue => continue,
            status => {
                assert_eq!(status, StepStatus::Done);
                break;
            }
        }
    }
    assert_eq!(steps, 5);
    assert_eq!(orch.state(), CaptureState::Completed);
    assert_eq!(orch.current_frame(), None);
    assert_eq!(orch.step(), StepStatus::Done);
}

#[test]
fn second_start_while_running_is_busy_and_leaves_session_alone() {
    let mut fx = fixture();
    let mut other = fixture();
    let mut orch = CaptureOrchestrator::new(settings(4, 8));
    let rig = CaptureRig::new(&mut fx.device)
        .with_target(&mut fx.target)
        .with_clip(&fx.clip)
        .with_camera(&mut fx.camera);
    orch.start(rig, |_| {}).unwrap();
    orch.step();
    settle(&fx.scene);
    orch.step();
    let frame = orch.current_frame();
    let phase = orch.phase();

    let rig2 = CaptureRig::new(&mut other.device)
        .with_target(&mut other.target)
        .with_clip(&other.clip)
        .with_camera(&mut other.camera);
    let err = orch.start(rig2, |_| {}).unwrap_err();
    assert!(matches!(err, SpritebakeError::Busy(_)));
    assert_eq!(orch.current_frame(), frame);
    assert_eq!(orch.phase(), phase);
    assert_eq!(orch.state(), CaptureState::Running);
    assert!(other.scene.borrow().applied_times().is_empty());
}

#[test]
fn cancel_restores_state_and_discards_atlases() {
    let mut fx = fixture();
    let bg = LinearRgba::new(0.2, 0.4, 0.6, 1.0);
    fx.camera.set_background(bg);
    let calls = Rc::new(Cell::new(0u32));
    {
        let mut orch = CaptureOrchestrator::new(settings(4, 8));
        let rig = CaptureRig::new(&mut fx.device)
            .with_target(&mut fx.target)
            .with_clip(&fx.clip)
            .with_camera(&mut fx.camera);
        let c = calls.clone();
        orch.start(rig, move |_| c.set(c.get() + 1)).unwrap();
        orch.step();
        settle(&fx.scene);
        orch.step();

        assert!(orch.cancel());
        assert_eq!(orch.state(), CaptureState::Aborted);
        assert_eq!(orch.step(), StepStatus::Aborted);
        assert!(orch.last_error().is_none());
    }
    assert_eq!(calls.get(), 0);
    assert_eq!(fx.camera.background(), bg);
    assert_eq!(fx.camera.target_texture(), None);
    assert_eq!(fx.device.live_textures(), 0);
}

#[test]
fn dropping_a_running_orchestrator_restores_state() {
    let mut fx = fixture();
    {
        let mut orch = CaptureOrchestrator::new(settings(4, 8));
        let rig = CaptureRig::new(&mut fx.device)
            .with_target(&mut fx.target)
            .with_clip(&fx.clip)
            .with_camera(&mut fx.camera);
        orch.start(rig, |_| {}).unwrap();
        orch.step();
    }
    assert_eq!(fx.camera.target_texture(), None);
    assert_eq!(fx.device.live_textures(), 0);
}

struct FlakyCamera {
    inner: CpuCamera,
    renders_left: u32,
}

impl CaptureCamera for FlakyCamera {
    fn background(&self) -> LinearRgba {
        self.inner.background()
    }

    fn set_background(&mut self, color: LinearRgba) {
        self.inner.set_background(color);
    }

    fn target_texture(&self) -> Option<RenderTextureHandle> {
        self.inner.target_texture()
    }

    fn set_target_texture(&mut self, handle: Option<RenderTextureHandle>) {
        self.inner.set_target_texture(handle);
    }

    fn render(&mut self, device: &mut dyn RenderDevice, shading: Shading) -> SpritebakeResult<()> {
        if self.renders_left == 0 {
            return Err(SpritebakeError::resource("device lost"));
        }
        self.renders_left -= 1;
        self.inner.render(device, shading)
    }
}

#[test]
fn render_failure_aborts_with_cleanup() {
    let mut fx = fixture();
    let mut camera = FlakyCamera {
        inner: CpuCamera::new(fx.scene.clone()),
        renders_left: 3,
    };
    let calls = Rc::new(Cell::new(0u32));
    {
        let mut orch = CaptureOrchestrator::new(settings(4, 8));
        let rig = CaptureRig::new(&mut fx.device)
            .with_target(&mut fx.target)
            .with_clip(&fx.clip)
            .with_camera(&mut camera);
        let c = calls.clone();
        orch.start(rig, move |_| c.set(c.get() + 1)).unwrap();

        let mut last = orch.step();
        while last == StepStatus::Continue {
            settle(&fx.scene);
            last = orch.step();
        }
        assert_eq!(last, StepStatus::Aborted);
        assert_eq!(orch.state(), CaptureState::Aborted);
        assert!(matches!(
            orch.last_error(),
            Some(SpritebakeError::Resource(_))
        ));
    }
    assert_eq!(calls.get(), 0);
    assert_eq!(camera.target_texture(), None);
    assert_eq!(fx.device.live_textures(), 0);
}

#[test]
fn orchestrator_can_capture_again_after_completion() {
    let mut fx = fixture();
    let mut other = fixture();
    let calls = Rc::new(Cell::new(0u32));
    let mut orch = CaptureOrchestrator::new(settings(2, 4));

    let rig = CaptureRig::new(&mut fx.device)
        .with_target(&mut fx.target)
        .with_clip(&fx.clip)
        .with_camera(&mut fx.camera);
    let c = calls.clone();
    orch.start(rig, move |_| c.set(c.get() + 1)).unwrap();
    while orch.step() == StepStatus::Continue {
        settle(&fx.scene);
    }

    let rig = CaptureRig::new(&mut other.device)
        .with_target(&mut other.target)
        .with_clip(&other.clip)
        .with_camera(&mut other.camera);
    let c = calls.clone();
    orch.start(rig, move |_| c.set(c.get() + 1)).unwrap();
    while orch.step() == StepStatus::Continue {
        settle(&other.scene);
    }
    assert_eq!(calls.get(), 2);
    assert_eq!(orch.state(), CaptureState::Completed);
}

#[test]
fn proceed_policy_still_refuses_allocations_past_hard_limit() {
    let mut fx = fixture();
    {
        let mut s = settings(4, 8);
        s.cell_size = CellSize::new(HARD_MAX_ATLAS_DIM / 2 + 1, 8).unwrap();
        s.oversize_policy = OversizePolicy::Proceed;
        let mut orch = CaptureOrchestrator::new(s);
        let rig = CaptureRig::new(&mut fx.device)
            .with_target(&mut fx.target)
            .with_clip(&fx.clip)
            .with_camera(&mut fx.camera);
        let err = orch.start(rig, |_| {}).unwrap_err();
        assert!(matches!(err, SpritebakeError::Resource(_)));
        assert_eq!(orch.state(), CaptureState::Aborted);
    }
    assert_eq!(fx.device.stats().created, 0);
    assert_eq!(fx.camera.target_texture(), None);
}
