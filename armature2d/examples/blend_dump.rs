use armature2d::{
    AnimationData, AnimationFadeOutMode, Armature, ArmatureData, BoneData, FadeIn, SlotData,
    Transform, TransformFrame, TransformTimeline, WorldClock,
};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

fn track(bone: &str, keys: &[(f32, Transform)]) -> TransformTimeline {
    let frames = keys
        .iter()
        .map(|&(duration, transform)| TransformFrame::new(duration, transform))
        .collect();
    TransformTimeline::new(bone, frames).expect("valid track")
}

fn build_data() -> Arc<ArmatureData> {
    let bones = vec![
        BoneData::new("root", None, Transform::IDENTITY),
        BoneData::new("hip", Some("root"), Transform::from_translation(0.0, 40.0)),
        BoneData::new("arm", Some("hip"), Transform::from_translation(10.0, 30.0)),
    ];
    let slots = vec![SlotData::new("hand", "arm")];

    let walk = AnimationData::new(
        "walk",
        1.0,
        vec![track(
            "hip",
            &[
                (0.5, Transform::from_translation(0.0, 0.0)),
                (0.5, Transform::from_translation(0.0, 4.0)),
                (0.0, Transform::from_translation(0.0, 0.0)),
            ],
        )],
    )
    .expect("walk");
    let run = AnimationData::new(
        "run",
        0.5,
        vec![track(
            "hip",
            &[
                (0.25, Transform::from_translation(0.0, 0.0)),
                (0.25, Transform::from_translation(0.0, 10.0)),
                (0.0, Transform::from_translation(0.0, 0.0)),
            ],
        )],
    )
    .expect("run");
    let wave = AnimationData::new(
        "wave",
        0.8,
        vec![track(
            "arm",
            &[
                (0.4, Transform::from_rotation(0.0)),
                (0.4, Transform::from_rotation(1.2)),
                (0.0, Transform::from_rotation(0.0)),
            ],
        )],
    )
    .expect("wave");

    Arc::new(ArmatureData::new("hero", bones, slots, vec![walk, run, wave]).expect("armature"))
}

fn main() {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let steps: usize = args.first().and_then(|s| s.parse().ok()).unwrap_or(30);
    let dt: f32 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(1.0 / 30.0);

    let armature = Rc::new(RefCell::new(Armature::new(build_data())));
    let clock = WorldClock::new();
    clock.add(armature.clone());

    armature.borrow_mut().play(Some("walk"), None);

    for step in 0..steps {
        if step == steps / 3 {
            armature
                .borrow_mut()
                .fade_in("run", FadeIn::default().with_fade_in_time(0.3));
        }
        if step == steps / 2 {
            armature.borrow_mut().fade_in(
                "wave",
                FadeIn::default()
                    .with_layer(1)
                    .with_fade_in_time(0.2)
                    .with_fade_out_mode(AnimationFadeOutMode::None),
            );
        }

        clock.advance_time(dt);

        let armature = armature.borrow();
        let states: Vec<_> = armature
            .animation()
            .active_states()
            .map(|s| {
                json!({
                    "name": s.name(),
                    "layer": s.layer(),
                    "time": s.current_time(),
                    "weight": s.weight_result(),
                })
            })
            .collect();
        let bones: Vec<_> = armature
            .skeleton()
            .bones
            .iter()
            .map(|b| json!({ "name": b.name, "x": b.world.tx, "y": b.world.ty }))
            .collect();
        println!(
            "{}",
            json!({ "time": clock.time(), "states": states, "bones": bones })
        );
    }
}
