use super::animation::{Animation, AnimationConfig, FadeIn, Seek};
use super::animation_state::{AnimationState, AnimationStateHandle};
use super::skeleton::Skeleton;
use super::world_clock::Animatable;
use crate::{ArmatureData, Error};
use std::sync::Arc;

/// A skeleton instance together with the controller that animates it.
#[derive(Debug)]
pub struct Armature {
    skeleton: Skeleton,
    animation: Animation,
}

impl Armature {
    pub fn new(data: Arc<ArmatureData>) -> Self {
        Self::with_config(data, AnimationConfig::default())
    }

    pub fn with_config(data: Arc<ArmatureData>, config: AnimationConfig) -> Self {
        let mut animation = Animation::with_config(config);
        animation.load_armature_data(&data);
        Self {
            skeleton: Skeleton::new(data),
            animation,
        }
    }

    pub fn name(&self) -> &str {
        &self.skeleton.data.name
    }

    pub fn data(&self) -> &Arc<ArmatureData> {
        &self.skeleton.data
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn skeleton_mut(&mut self) -> &mut Skeleton {
        &mut self.skeleton
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn animation_mut(&mut self) -> &mut Animation {
        &mut self.animation
    }

    /// Splits the armature so callers can drive [`Animation`] against its own skeleton.
    pub fn parts_mut(&mut self) -> (&mut Skeleton, &mut Animation) {
        (&mut self.skeleton, &mut self.animation)
    }

    pub fn play(
        &mut self,
        name: Option<&str>,
        play_times: Option<u32>,
    ) -> Option<AnimationStateHandle> {
        self.animation.play(&mut self.skeleton, name, play_times)
    }

    pub fn fade_in(&mut self, name: &str, request: FadeIn) -> Option<AnimationStateHandle> {
        self.animation.fade_in(&mut self.skeleton, name, request)
    }

    pub fn goto_and_play(
        &mut self,
        name: &str,
        request: FadeIn,
        duration: f32,
    ) -> Option<AnimationStateHandle> {
        self.animation
            .goto_and_play(&mut self.skeleton, name, request, duration)
    }

    pub fn goto_and_stop(
        &mut self,
        name: &str,
        request: FadeIn,
        seek: Seek,
    ) -> Option<AnimationStateHandle> {
        self.animation
            .goto_and_stop(&mut self.skeleton, name, request, seek)
    }

    pub fn state(&self, handle: AnimationStateHandle) -> Option<&AnimationState> {
        self.animation.state(handle)
    }

    pub fn state_mut(&mut self, handle: AnimationStateHandle) -> Option<&mut AnimationState> {
        self.animation.state_mut(handle)
    }

    pub fn child_armature(&self, slot_name: &str) -> Option<&Armature> {
        self.skeleton.slot(slot_name)?.child_armature()
    }

    pub fn child_armature_mut(&mut self, slot_name: &str) -> Option<&mut Armature> {
        self.skeleton.slot_mut(slot_name)?.child_armature_mut()
    }

    pub fn set_child_armature(
        &mut self,
        slot_name: &str,
        armature: Option<Armature>,
    ) -> Result<Option<Armature>, Error> {
        self.skeleton.set_child_armature(slot_name, armature)
    }

    /// Swaps in new armature data. Child armatures follow their slot by name; active states
    /// rebind their timelines to the new bones on the next tick.
    pub fn set_data(&mut self, data: Arc<ArmatureData>) {
        let children = self.skeleton.take_child_armatures();
        self.skeleton = Skeleton::new(data);
        for (slot_name, child) in children {
            if self.skeleton.set_child_armature(&slot_name, Some(child)).is_err() {
                log::debug!("dropping child armature of removed slot '{slot_name}'");
            }
        }
        self.animation.load_armature_data(&self.skeleton.data);
        self.animation.mark_timelines_dirty();
    }

    /// Advances playback by `passed_time` scaled by the animation time scale, then resolves
    /// the pose and ticks child armatures.
    pub fn advance_time(&mut self, passed_time: f32) {
        let passed_time = passed_time * self.animation.time_scale();
        self.animation.advance_time(passed_time, &mut self.skeleton);
        self.skeleton.advance_time(passed_time);
    }
}

impl Animatable for Armature {
    fn advance_time(&mut self, passed_time: f32) {
        Armature::advance_time(self, passed_time);
    }
}
