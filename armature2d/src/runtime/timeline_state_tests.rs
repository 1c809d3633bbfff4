use super::test_support::*;
use crate::{
    Armature, ColorTransform, Curve, FadeIn, Seek, Transform, TransformFrame, TransformTimeline,
};

fn timeline_x(armature: &Armature) -> f32 {
    let state = armature.animation().last_animation_state().unwrap();
    state.timeline_states()[0].transform().x
}

fn frame_index(armature: &Armature) -> usize {
    let state = armature.animation().last_animation_state().unwrap();
    state.timeline_states()[0].current_frame_index()
}

#[test]
fn interpolates_between_keyframes() {
    let mut armature = standard_rig();
    armature.fade_in("walk", FadeIn::default()).unwrap();
    armature.advance_time(0.25);
    assert_approx(timeline_x(&armature), 4.5);
    assert_approx(body_x(&armature), 4.5);

    let state = armature.animation().last_animation_state().unwrap();
    let timeline = &state.timeline_states()[0];
    assert_eq!(timeline.bone_index(), Some(1));
    assert!(timeline.is_tweening_transform());
    assert!(!timeline.is_tweening_scale());
    assert!(!timeline.is_tweening_color());
    assert!(timeline.color().is_none());
}

#[test]
fn single_frame_track_holds_its_pose() {
    let mut armature = standard_rig();
    armature.fade_in("run", FadeIn::default()).unwrap();
    for _ in 0..3 {
        armature.advance_time(0.4);
        assert_approx(timeline_x(&armature), 100.0);
        assert_eq!(frame_index(&armature), 0);
    }
    let state = armature.animation().last_animation_state().unwrap();
    assert!(!state.timeline_states()[0].is_tweening_transform());
}

#[test]
fn cursor_moves_forward_and_wraps_on_loop() {
    let sway = clip(
        "sway",
        1.0,
        vec![x_track(
            "body",
            &[(0.25, 0.0), (0.25, 4.0), (0.5, 8.0), (0.0, 0.0)],
        )],
    );
    let mut armature = rig(vec![sway]);
    armature.fade_in("sway", FadeIn::default()).unwrap();

    armature.advance_time(0.125);
    assert_eq!(frame_index(&armature), 0);
    assert_approx(timeline_x(&armature), 2.0);

    armature.advance_time(0.25);
    assert_eq!(frame_index(&armature), 1);
    assert_approx(timeline_x(&armature), 6.0);

    armature.advance_time(0.375);
    assert_eq!(frame_index(&armature), 2);
    assert_approx(timeline_x(&armature), 4.0);

    armature.advance_time(0.375);
    assert_eq!(frame_index(&armature), 0);
    assert_approx(timeline_x(&armature), 2.0);
}

#[test]
fn last_frame_tweens_back_to_first_only_while_looping() {
    let pulse = || {
        clip(
            "pulse",
            1.0,
            vec![x_track("body", &[(0.5, 0.0), (0.5, 10.0)])],
        )
    };

    let mut looping = rig(vec![pulse()]);
    looping.fade_in("pulse", FadeIn::default()).unwrap();
    looping.advance_time(0.75);
    assert_approx(timeline_x(&looping), 5.0);

    let mut once = rig(vec![pulse()]);
    once
        .fade_in("pulse", FadeIn::default().with_play_times(1))
        .unwrap();
    once.advance_time(0.75);
    assert_approx(timeline_x(&once), 10.0);
}

#[test]
fn curves_shape_the_interpolation() {
    let curved = |curve: Curve| {
        let frames = vec![
            TransformFrame::new(1.0, Transform::from_translation(0.0, 0.0)).with_curve(curve),
            TransformFrame::new(0.0, Transform::from_translation(10.0, 0.0)),
        ];
        clip(
            "curved",
            1.0,
            vec![TransformTimeline::new("body", frames).unwrap()],
        )
    };

    let cases = [
        (Curve::Linear, 5.0),
        (Curve::Stepped, 0.0),
        (Curve::Ease(1.0), 7.5),
        (Curve::Ease(-1.0), 2.5),
        (Curve::Ease(2.0), 5.0),
    ];
    for (curve, expected) in cases {
        let mut armature = rig(vec![curved(curve)]);
        armature.fade_in("curved", FadeIn::default()).unwrap();
        armature.advance_time(0.5);
        assert_approx(timeline_x(&armature), expected);
    }
}

#[test]
fn backwards_seek_restarts_the_scan() {
    let mut armature = standard_rig();
    armature.goto_and_stop("walk", FadeIn::default(), Seek::Time(0.75));
    armature.advance_time(0.0);
    assert_approx(timeline_x(&armature), 9.5);

    armature.goto_and_stop("walk", FadeIn::default(), Seek::Time(0.125));
    armature.advance_time(0.0);
    assert_approx(timeline_x(&armature), 3.25);
}

#[test]
fn colour_and_scale_tween_independently() {
    let frames = vec![
        TransformFrame::new(1.0, Transform::IDENTITY)
            .with_color(ColorTransform::from_multipliers(1.0, 1.0, 1.0, 1.0)),
        TransformFrame::new(0.0, Transform::IDENTITY.with_scale(3.0, 1.0))
            .with_color(ColorTransform::from_multipliers(0.0, 1.0, 1.0, 1.0)),
    ];
    let grow = clip(
        "grow",
        1.0,
        vec![TransformTimeline::new("body", frames).unwrap()],
    );
    let mut armature = rig(vec![grow]);
    armature.fade_in("grow", FadeIn::default()).unwrap();
    armature.advance_time(0.5);

    let state = armature.animation().last_animation_state().unwrap();
    let timeline = &state.timeline_states()[0];
    assert!(!timeline.is_tweening_transform());
    assert!(timeline.is_tweening_scale());
    assert!(timeline.is_tweening_color());
    assert_approx(timeline.transform().scale_x, 2.0);
    assert_approx(timeline.color().unwrap().alpha_multiplier, 0.5);

    let body = armature.skeleton().bone("body").unwrap();
    assert_approx(body.local.scale_x, 2.0);
    assert_approx(body.color.alpha_multiplier, 0.5);
}

#[test]
fn returned_timeline_states_are_reused() {
    let mut armature = standard_rig();
    armature.fade_in("walk", FadeIn::default()).unwrap();
    armature.animation_mut().reset();
    let idle = armature.animation().idle_timeline_states();
    assert_eq!(idle, 1);

    armature.fade_in("run", FadeIn::default()).unwrap();
    assert_eq!(armature.animation().idle_timeline_states(), 0);
    assert_approx(timeline_x(&armature), 100.0);
}
