use super::*;
use crate::animation::clip::{Channel, KeyframeClip};
use crate::animation::pose::Pose;

#[derive(Default)]
struct Recorder {
    applied: Vec<Pose>,
}

impl CaptureTarget for Recorder {
    fn apply_pose(&mut self, pose: &Pose) {
        self.applied.push(pose.clone());
    }
}

fn clip() -> KeyframeClip {
    KeyframeClip::new("slide", 1.0).with_channel("x", Channel::linear([(0.0, 0.0), (1.0, 10.0)]))
}

#[test]
fn applies_sampled_pose_to_target() {
    let clip = clip();
    let mut target = Recorder::default();
    sample_pose(Some(&clip), Some(&mut target), 0.5).unwrap();
    assert_eq!(target.applied.len(), 1);
    assert_eq!(target.applied[0].channel("x"), Some(5.0));
}

#[test]
fn missing_target_is_config_error() {
    let clip = clip();
    let err = sample_pose(Some(&clip), None, 0.0).unwrap_err();
    assert!(matches!(err, SpritebakeError::Config(_)));
}

#[test]
fn missing_source_is_config_error_and_noop() {
    let mut target = Recorder::default();
    let err = sample_pose(None, Some(&mut target), 0.0).unwrap_err();
    assert!(matches!(err, SpritebakeError::Config(_)));
    assert!(target.applied.is_empty());
}

#[test]
fn time_at_or_past_duration_is_rejected() {
    let clip = clip();
    let mut target = Recorder::default();
    assert!(sample_pose(Some(&clip), Some(&mut target), 1.0).is_err());
    assert!(sample_pose(Some(&clip), Some(&mut target), -0.1).is_err());
    assert!(sample_pose(Some(&clip), Some(&mut target), f64::NAN).is_err());
    assert!(target.applied.is_empty());
}

#[test]
fn zero_length_clip_samples_at_zero() {
    let clip = KeyframeClip::new("still", 0.0);
    let mut target = Recorder::default();
    sample_pose(Some(&clip), Some(&mut target), 0.0).unwrap();
    assert_eq!(target.applied.len(), 1);
}

#[test]
fn frame_times_divide_clip_evenly() {
    let times: Vec<f64> = (0..4).map(|f| frame_time(f, 4, 1.0)).collect();
    assert_eq!(times, vec![0.0, 0.25, 0.5, 0.75]);
    assert_eq!(frame_time(0, 0, 1.0), 0.0);
}
