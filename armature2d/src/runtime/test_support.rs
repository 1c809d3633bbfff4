use crate::{
    AnimationData, Armature, ArmatureData, BoneData, ColorTransform, SlotData, Transform,
    TransformFrame, TransformTimeline,
};
use std::sync::Arc;

pub(crate) fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 1.0e-5,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

/// Track moving `bone` along x; each entry is `(duration, x)`.
pub(crate) fn x_track(bone: &str, keys: &[(f32, f32)]) -> TransformTimeline {
    let frames = keys
        .iter()
        .map(|&(duration, x)| TransformFrame::new(duration, Transform::from_translation(x, 0.0)))
        .collect();
    TransformTimeline::new(bone, frames).unwrap()
}

pub(crate) fn clip(name: &str, duration: f32, timelines: Vec<TransformTimeline>) -> AnimationData {
    AnimationData::new(name, duration, timelines).unwrap()
}

/// `walk`: body x 2 -> 12 over one second.
pub(crate) fn walk() -> AnimationData {
    clip("walk", 1.0, vec![x_track("body", &[(1.0, 2.0), (0.0, 12.0)])])
}

/// `run`: body held at x 100.
pub(crate) fn run() -> AnimationData {
    clip("run", 1.0, vec![x_track("body", &[(0.0, 100.0)])])
}

/// `wave`: arm x 0 -> 4 over one second.
pub(crate) fn wave() -> AnimationData {
    clip("wave", 1.0, vec![x_track("arm", &[(1.0, 0.0), (0.0, 4.0)])])
}

/// `idle`: body held at x 0.
pub(crate) fn idle() -> AnimationData {
    clip("idle", 1.0, vec![x_track("body", &[(0.0, 0.0)])])
}

/// `tint`: body colour held at half alpha.
pub(crate) fn tint() -> AnimationData {
    let frame = TransformFrame::new(0.0, Transform::IDENTITY)
        .with_color(ColorTransform::from_multipliers(0.5, 1.0, 1.0, 1.0));
    clip(
        "tint",
        1.0,
        vec![TransformTimeline::new("body", vec![frame]).unwrap()],
    )
}

pub(crate) fn standard_clips() -> Vec<AnimationData> {
    vec![walk(), run(), wave(), idle(), tint()]
}

/// `root` at the origin, `body` at (1, 0) under it, `arm` at (0, 2) under `body`.
/// Slot `weapon` (inherits animation) sits on `arm`, `shield` (does not) on `body`.
pub(crate) fn rig_data(name: &str, animations: Vec<AnimationData>) -> Arc<ArmatureData> {
    let bones = vec![
        BoneData::new("root", None, Transform::IDENTITY),
        BoneData::new("body", Some("root"), Transform::from_translation(1.0, 0.0)),
        BoneData::new("arm", Some("body"), Transform::from_translation(0.0, 2.0)),
    ];
    let slots = vec![
        SlotData::new("weapon", "arm"),
        SlotData::new("shield", "body").with_inherit_animation(false),
    ];
    Arc::new(ArmatureData::new(name, bones, slots, animations).unwrap())
}

pub(crate) fn rig(animations: Vec<AnimationData>) -> Armature {
    Armature::new(rig_data("rig", animations))
}

pub(crate) fn standard_rig() -> Armature {
    rig(standard_clips())
}

pub(crate) fn body_x(armature: &Armature) -> f32 {
    armature.skeleton().bone("body").unwrap().offset.x
}

pub(crate) fn active_names(armature: &Armature) -> Vec<String> {
    armature
        .animation()
        .active_states()
        .map(|s| s.name().to_string())
        .collect()
}
