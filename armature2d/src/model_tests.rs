use crate::{
    AnimationData, ArmatureData, BoneData, Curve, Error, SlotData, Transform, TransformFrame,
    TransformTimeline,
};

fn bones() -> Vec<BoneData> {
    vec![
        BoneData::new("root", None, Transform::IDENTITY),
        BoneData::new("body", Some("root"), Transform::from_translation(1.0, 0.0)),
    ]
}

fn still(bone: &str) -> TransformTimeline {
    TransformTimeline::new(bone, vec![TransformFrame::new(0.0, Transform::IDENTITY)]).unwrap()
}

#[test]
fn timeline_assigns_frame_positions() {
    let timeline = TransformTimeline::new(
        "body",
        vec![
            TransformFrame::new(0.25, Transform::IDENTITY),
            TransformFrame::new(0.5, Transform::IDENTITY),
            TransformFrame::new(0.0, Transform::IDENTITY),
        ],
    )
    .unwrap();
    let positions: Vec<f32> = timeline.frames.iter().map(|f| f.position).collect();
    assert_eq!(positions, [0.0, 0.25, 0.75]);
    assert!(!timeline.is_single_frame());
    assert!(still("body").is_single_frame());
}

#[test]
fn timeline_rejects_bad_frames() {
    assert!(matches!(
        TransformTimeline::new("body", Vec::new()),
        Err(Error::InvalidValue { .. })
    ));
    for duration in [-1.0, f32::NAN, f32::INFINITY] {
        let frames = vec![TransformFrame::new(duration, Transform::IDENTITY)];
        assert!(TransformTimeline::new("body", frames).is_err(), "{duration}");
    }
}

#[test]
fn animation_data_validation() {
    assert!(AnimationData::new("walk", -1.0, Vec::new()).is_err());
    assert!(AnimationData::new("walk", 1.0, vec![still("body"), still("body")]).is_err());

    let walk = AnimationData::new("walk", 1.0, vec![still("body")]).unwrap();
    assert_eq!(walk.play_times, 0);
    assert_eq!(walk.scale, 1.0);
    assert!(walk.timeline("body").is_some());
    assert!(walk.timeline("arm").is_none());
    assert!(walk.clone().with_scale(0.0).validate().is_err());
    assert!(walk.with_position(-0.5).validate().is_err());
}

#[test]
fn armature_data_resolves_indices() {
    let data = ArmatureData::new(
        "rig",
        bones(),
        vec![SlotData::new("badge", "body")],
        vec![
            AnimationData::new("walk", 1.0, Vec::new()).unwrap(),
            AnimationData::new("run", 1.0, Vec::new()).unwrap(),
        ],
    )
    .unwrap();

    assert_eq!(data.bone_parent(0), None);
    assert_eq!(data.bone_parent(1), Some(0));
    assert_eq!(data.slot_bone(0), Some(1));
    assert!(data.slots[0].inherit_animation);
    assert_eq!(data.animation("run").unwrap().name, "run");
    assert_eq!(data.default_animation(), Some("walk"));

    let data = data.with_default_animation("run").unwrap();
    assert_eq!(data.default_animation(), Some("run"));
    assert!(matches!(
        data.with_default_animation("jump"),
        Err(Error::UnknownAnimation { .. })
    ));
}

#[test]
fn armature_data_rejects_broken_hierarchy() {
    let orphan = vec![BoneData::new("arm", Some("body"), Transform::IDENTITY)];
    assert!(matches!(
        ArmatureData::new("rig", orphan, Vec::new(), Vec::new()),
        Err(Error::UnknownBoneParent { .. })
    ));

    let mut twins = bones();
    twins.push(BoneData::new("body", None, Transform::IDENTITY));
    assert!(matches!(
        ArmatureData::new("rig", twins, Vec::new(), Vec::new()),
        Err(Error::DuplicateBone { .. })
    ));

    assert!(matches!(
        ArmatureData::new("rig", bones(), vec![SlotData::new("badge", "tail")], Vec::new()),
        Err(Error::UnknownSlotBone { .. })
    ));

    let clips = vec![
        AnimationData::new("walk", 1.0, Vec::new()).unwrap(),
        AnimationData::new("walk", 2.0, Vec::new()).unwrap(),
    ];
    assert!(matches!(
        ArmatureData::new("rig", bones(), Vec::new(), clips),
        Err(Error::DuplicateAnimation { .. })
    ));
}

#[test]
fn curve_endpoints_are_fixed() {
    let curves = [
        Curve::Linear,
        Curve::Ease(0.5),
        Curve::Ease(-0.5),
        Curve::Ease(1.5),
        Curve::Bezier {
            cx1: 0.25,
            cy1: 0.1,
            cx2: 0.25,
            cy2: 1.0,
        },
    ];
    for curve in curves {
        assert!(curve.progress(0.0).abs() < 1.0e-3, "{curve:?}");
        assert!((curve.progress(1.0) - 1.0).abs() < 1.0e-3, "{curve:?}");
        assert!((curve.progress(2.0) - 1.0).abs() < 1.0e-3, "{curve:?}");
    }
    assert_eq!(Curve::Stepped.progress(0.9), 0.0);
}

#[test]
fn linear_bezier_matches_linear() {
    let curve = Curve::Bezier {
        cx1: 1.0 / 3.0,
        cy1: 1.0 / 3.0,
        cx2: 2.0 / 3.0,
        cy2: 2.0 / 3.0,
    };
    for t in [0.1, 0.3, 0.5, 0.8] {
        assert!((curve.progress(t) - t).abs() < 1.0e-3, "{t}");
    }
}
