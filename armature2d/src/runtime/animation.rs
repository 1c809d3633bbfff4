use super::animation_state::{AnimationState, AnimationStateHandle, FadeState, StateSetup};
use super::pool::{FreeList, Pool, PoolId, PoolStats};
use super::timeline_state::TimelineState;
use crate::{AnimationData, ArmatureData, Error, Skeleton};
use std::collections::HashMap;
use std::sync::Arc;

/// Which already-active states a new fade-in pushes out.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnimationFadeOutMode {
    None,
    SameLayer,
    SameGroup,
    All,
    #[default]
    SameLayerAndGroup,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnimationConfig {
    /// Mode used by [`FadeIn`] when it does not name one.
    pub default_fade_out_mode: AnimationFadeOutMode,
    /// Fade-in time used when neither the caller nor the clip provides a valid one.
    pub fallback_fade_in_time: f32,
    pub time_scale: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            default_fade_out_mode: AnimationFadeOutMode::SameLayerAndGroup,
            fallback_fade_in_time: 0.0,
            time_scale: 1.0,
        }
    }
}

/// Fade-in request. `None` fields, and negative or NaN values, fall back to the clip's defaults.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FadeIn {
    pub play_times: Option<u32>,
    pub fade_in_time: Option<f32>,
    pub layer: i32,
    pub group: String,
    pub fade_out_mode: Option<AnimationFadeOutMode>,
    pub additive_blending: bool,
    pub pause_fade_out: bool,
    pub pause_fade_in: bool,
}

impl FadeIn {
    pub fn with_play_times(mut self, play_times: u32) -> Self {
        self.play_times = Some(play_times);
        self
    }

    pub fn with_fade_in_time(mut self, fade_in_time: f32) -> Self {
        self.fade_in_time = Some(fade_in_time);
        self
    }

    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_fade_out_mode(mut self, mode: AnimationFadeOutMode) -> Self {
        self.fade_out_mode = Some(mode);
        self
    }

    pub fn with_additive_blending(mut self, additive: bool) -> Self {
        self.additive_blending = additive;
        self
    }

    pub fn with_pause_fade_out(mut self, pause: bool) -> Self {
        self.pause_fade_out = pause;
        self
    }

    pub fn with_pause_fade_in(mut self, pause: bool) -> Self {
        self.pause_fade_in = pause;
        self
    }
}

/// Seek target for [`Animation::goto_and_stop`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Seek {
    /// Seconds from the clip's start position.
    Time(f32),
    /// Fraction of one loop in `[0, 1]`.
    Progress(f32),
}

fn valid_time(value: Option<f32>) -> Option<f32> {
    value.filter(|v| !v.is_nan() && *v >= 0.0)
}

/// Per-armature playback controller: owns the active states and blends them each tick.
#[derive(Debug)]
pub struct Animation {
    config: AnimationConfig,
    time_scale: f32,
    is_playing: bool,
    is_fading: bool,
    timeline_states_dirty: bool,

    animations: HashMap<String, Arc<AnimationData>>,
    animation_names: Vec<String>,
    default_animation: Option<String>,

    states: Pool<AnimationState>,
    timeline_pool: FreeList<TimelineState>,
    /// Sorted by ascending layer; insertion order within a layer.
    active: Vec<PoolId>,
    last_state: Option<PoolId>,
}

impl Default for Animation {
    fn default() -> Self {
        Self::with_config(AnimationConfig::default())
    }
}

impl Animation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnimationConfig) -> Self {
        let mut animation = Self {
            time_scale: 1.0,
            config,
            is_playing: false,
            is_fading: false,
            timeline_states_dirty: false,
            animations: HashMap::new(),
            animation_names: Vec::new(),
            default_animation: None,
            states: Pool::default(),
            timeline_pool: FreeList::default(),
            active: Vec::new(),
            last_state: None,
        };
        animation.set_time_scale(animation.config.time_scale);
        animation
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Replaces the clip map. Active states keep playing the clips they were started with.
    ///
    /// Every clip is validated first; on error the current map is left untouched.
    pub fn set_animations(
        &mut self,
        animations: impl IntoIterator<Item = Arc<AnimationData>>,
    ) -> Result<(), Error> {
        let mut map = HashMap::new();
        let mut names = Vec::new();
        for animation in animations {
            animation.validate()?;
            let name = animation.name.clone();
            if map.insert(name.clone(), animation).is_some() {
                return Err(Error::DuplicateAnimation { name });
            }
            names.push(name);
        }
        self.animations = map;
        self.animation_names = names;
        if self
            .default_animation
            .as_ref()
            .is_some_and(|name| !self.animations.contains_key(name))
        {
            self.default_animation = None;
        }
        Ok(())
    }

    /// Loads the clips and default clip of an already validated armature.
    pub(crate) fn load_armature_data(&mut self, data: &ArmatureData) {
        self.animations = data
            .animations
            .iter()
            .map(|a| (a.name.clone(), Arc::clone(a)))
            .collect();
        self.animation_names = data.animations.iter().map(|a| a.name.clone()).collect();
        self.default_animation = data.default_animation().map(str::to_string);
    }

    pub fn set_default_animation(&mut self, name: &str) -> Result<(), Error> {
        if !self.animations.contains_key(name) {
            return Err(Error::UnknownAnimation {
                name: name.to_string(),
            });
        }
        self.default_animation = Some(name.to_string());
        Ok(())
    }

    pub fn default_animation(&self) -> Option<&str> {
        self.default_animation
            .as_deref()
            .or_else(|| self.animation_names.first().map(String::as_str))
    }

    pub fn animation_names(&self) -> &[String] {
        &self.animation_names
    }

    pub fn animations(&self) -> &HashMap<String, Arc<AnimationData>> {
        &self.animations
    }

    pub fn has_animation(&self, name: &str) -> bool {
        self.animations.contains_key(name)
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Negative and NaN values reset the scale to `1.0`.
    pub fn set_time_scale(&mut self, time_scale: f32) {
        if time_scale.is_nan() || time_scale < 0.0 {
            log::debug!("invalid animation time scale {time_scale}, using 1.0");
            self.time_scale = 1.0;
        } else {
            self.time_scale = time_scale;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing && !self.is_completed()
    }

    /// True when nothing has played, or the last state and every active state are complete.
    pub fn is_completed(&self) -> bool {
        let Some(last) = self.last_state.and_then(|id| self.states.get(id)) else {
            return true;
        };
        last.is_completed() && self.active_states().all(AnimationState::is_completed)
    }

    /// Whether any active state was still fading in or out on the last tick.
    pub fn is_fading(&self) -> bool {
        self.is_fading
    }

    pub fn last_animation_state(&self) -> Option<&AnimationState> {
        self.last_state.and_then(|id| self.states.get(id))
    }

    pub fn last_animation_handle(&self) -> Option<AnimationStateHandle> {
        self.last_state.map(|id| AnimationStateHandle { id })
    }

    pub fn last_animation_name(&self) -> &str {
        self.last_animation_state()
            .map(AnimationState::name)
            .unwrap_or("")
    }

    pub fn state(&self, handle: AnimationStateHandle) -> Option<&AnimationState> {
        self.states.get(handle.id)
    }

    pub fn state_mut(&mut self, handle: AnimationStateHandle) -> Option<&mut AnimationState> {
        self.states.get_mut(handle.id)
    }

    /// Active states in blend order.
    pub fn active_states(&self) -> impl Iterator<Item = &AnimationState> + '_ {
        self.active.iter().filter_map(|id| self.states.get(*id))
    }

    pub fn active_handles(&self) -> impl Iterator<Item = AnimationStateHandle> + '_ {
        self.active.iter().map(|&id| AnimationStateHandle { id })
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn get_state(&self, name: &str) -> Option<&AnimationState> {
        self.get_state_handle(name).and_then(|h| self.state(h))
    }

    pub fn get_state_handle(&self, name: &str) -> Option<AnimationStateHandle> {
        self.active
            .iter()
            .copied()
            .find(|&id| self.states.get(id).is_some_and(|s| s.name() == name))
            .map(|id| AnimationStateHandle { id })
    }

    pub fn get_state_in_layer(&self, name: &str, layer: i32) -> Option<AnimationStateHandle> {
        self.active
            .iter()
            .copied()
            .find(|&id| {
                self.states
                    .get(id)
                    .is_some_and(|s| s.name() == name && s.layer == layer)
            })
            .map(|id| AnimationStateHandle { id })
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.states.stats()
    }

    /// Cleared timeline states held for reuse.
    pub fn idle_timeline_states(&self) -> usize {
        self.timeline_pool.idle()
    }

    /// Forces every active state to rebind its timelines to bones on the next tick.
    pub fn mark_timelines_dirty(&mut self) {
        self.timeline_states_dirty = true;
    }

    /// Plays `name` (or resumes / restarts the last clip when `name` is `None`).
    ///
    /// Returns `None` when only the playing flag was restored.
    pub fn play(
        &mut self,
        skeleton: &mut Skeleton,
        name: Option<&str>,
        play_times: Option<u32>,
    ) -> Option<AnimationStateHandle> {
        let request = FadeIn {
            play_times,
            fade_in_time: Some(0.0),
            fade_out_mode: Some(AnimationFadeOutMode::All),
            ..FadeIn::default()
        };

        if let Some(name) = name.filter(|n| !n.is_empty()) {
            return self.fade_in(skeleton, name, request);
        }

        if self.last_state.is_none() {
            let name = self.default_animation()?.to_string();
            return self.fade_in(skeleton, &name, request);
        }

        if !self.is_playing {
            self.is_playing = true;
            return None;
        }

        let name = self.last_animation_name().to_string();
        self.fade_in(
            skeleton,
            &name,
            FadeIn {
                play_times: None,
                ..request
            },
        )
    }

    pub fn fade_in(
        &mut self,
        skeleton: &mut Skeleton,
        name: &str,
        request: FadeIn,
    ) -> Option<AnimationStateHandle> {
        self.start(skeleton, name, request, None)
    }

    /// Like [`Animation::fade_in`], but stretches one loop to `duration` seconds of playback.
    pub fn goto_and_play(
        &mut self,
        skeleton: &mut Skeleton,
        name: &str,
        request: FadeIn,
        duration: f32,
    ) -> Option<AnimationStateHandle> {
        let duration = (duration.is_finite() && duration > 0.0).then_some(duration);
        self.start(skeleton, name, request, duration)
    }

    /// Shows `name` frozen at `seek`, reusing a state already active in the requested layer.
    pub fn goto_and_stop(
        &mut self,
        skeleton: &mut Skeleton,
        name: &str,
        request: FadeIn,
        seek: Seek,
    ) -> Option<AnimationStateHandle> {
        let handle = match self.get_state_in_layer(name, request.layer) {
            Some(handle) => handle,
            None => self.fade_in(skeleton, name, request)?,
        };
        let state = self.states.get_mut(handle.id)?;
        let time = match seek {
            Seek::Time(time) => time,
            Seek::Progress(progress) => state.total_time() * progress.clamp(0.0, 1.0),
        };
        state.set_current_time(time);
        state.stop();
        Some(handle)
    }

    fn start(
        &mut self,
        skeleton: &mut Skeleton,
        name: &str,
        request: FadeIn,
        duration: Option<f32>,
    ) -> Option<AnimationStateHandle> {
        let Some(clip) = self.animations.get(name).cloned() else {
            log::debug!("fade in ignored: unknown animation '{name}'");
            return None;
        };

        self.is_playing = true;

        let fade_in_time = valid_time(request.fade_in_time)
            .or_else(|| valid_time(Some(clip.fade_in_time)))
            .unwrap_or(self.config.fallback_fade_in_time.max(0.0));
        let play_times = request.play_times.unwrap_or(clip.play_times);
        let fade_out_mode = request
            .fade_out_mode
            .unwrap_or(self.config.default_fade_out_mode);
        let time_scale = match duration {
            Some(duration) => clip.duration / duration,
            None if clip.scale.is_finite() && clip.scale > 0.0 => 1.0 / clip.scale,
            None => {
                log::debug!("clip '{name}' has invalid scale {}, using 1.0", clip.scale);
                1.0
            }
        };

        self.fade_out_states(
            fade_in_time,
            request.layer,
            &request.group,
            fade_out_mode,
            request.pause_fade_out,
        );

        let id = self.states.borrow();
        let setup = StateSetup {
            name: name.to_string(),
            play_times,
            position: clip.position,
            duration: (clip.duration - clip.position).max(0.0),
            time_scale,
            fade_in_time,
            pause_fade_in: request.pause_fade_in,
            clip,
        };
        let state = self.states.get_mut(id)?;
        state.layer = request.layer;
        state.group = request.group;
        state.additive_blending = request.additive_blending;
        state.fade_in(skeleton, setup, &mut self.timeline_pool);

        self.last_state = Some(id);
        self.active.push(id);
        if self.active.len() > 1 {
            let states = &self.states;
            self.active
                .sort_by_key(|id| states.get(*id).map_or(0, |s| s.layer));
        }

        for slot in &mut skeleton.slots {
            if !slot.inherit_animation {
                continue;
            }
            if let Some(child) = slot.child_armature_mut() {
                child.fade_in(name, FadeIn::default());
            }
        }

        if fade_in_time == 0.0 {
            self.advance_time(0.0, skeleton);
            skeleton.advance_time(0.0);
        }

        Some(AnimationStateHandle { id })
    }

    fn fade_out_states(
        &mut self,
        fade_out_time: f32,
        layer: i32,
        group: &str,
        mode: AnimationFadeOutMode,
        pause_fade_out: bool,
    ) {
        let matches = |state: &AnimationState| match mode {
            AnimationFadeOutMode::None => false,
            AnimationFadeOutMode::SameLayer => state.layer == layer,
            AnimationFadeOutMode::SameGroup => state.group == group,
            AnimationFadeOutMode::All => true,
            AnimationFadeOutMode::SameLayerAndGroup => {
                state.layer == layer && state.group == group
            }
        };

        for &id in &self.active {
            match self.states.get_mut(id) {
                Some(state) if matches(state) => state.fade_out(fade_out_time, pause_fade_out),
                _ => {}
            }
        }
    }

    /// Clears the playing flag. Active states stay resident so `play` can resume them.
    pub fn stop(&mut self) {
        self.is_playing = false;
    }

    /// Hard stop: every active state goes straight back to the pool.
    pub fn reset(&mut self) {
        self.is_playing = false;
        self.is_fading = false;
        self.last_state = None;
        for id in std::mem::take(&mut self.active) {
            Self::return_state(&mut self.states, &mut self.timeline_pool, id);
        }
    }

    fn return_state(
        states: &mut Pool<AnimationState>,
        timeline_pool: &mut FreeList<TimelineState>,
        id: PoolId,
    ) {
        if let Some(state) = states.get_mut(id) {
            log::trace!("returning state '{}' to the pool", state.name());
            state.release_timeline_states(timeline_pool);
        }
        states.give_back(id);
    }

    /// Advances every active state by `passed_time` and writes the blended pose into `skeleton`.
    ///
    /// States are visited in ascending layer order. Each layer receives the weight lower layers
    /// left unused; states whose fade-out finished are returned to the pool during the pass.
    pub fn advance_time(&mut self, passed_time: f32, skeleton: &mut Skeleton) {
        if !self.is_playing {
            return;
        }
        let passed_time = passed_time.abs();
        let dirty = self.timeline_states_dirty;

        match self.active.len() {
            0 => {}
            1 => {
                let id = self.active[0];
                let fade_out_complete = self
                    .states
                    .get(id)
                    .is_none_or(|s| s.is_fade_out_complete);
                if fade_out_complete {
                    Self::return_state(&mut self.states, &mut self.timeline_pool, id);
                    self.active.clear();
                    self.last_state = None;
                } else if let Some(state) = self.states.get_mut(id) {
                    if dirty {
                        state.update_timeline_states(skeleton, &mut self.timeline_pool);
                    }
                    state.advance_time(passed_time, 1.0, 0, skeleton);
                }
            }
            count => {
                let mut prev_layer = self
                    .states
                    .get(self.active[0])
                    .map_or(0, |s| s.layer);
                let mut weight_left = 1.0f32;
                let mut layer_total_weight = 0.0f32;
                let mut layer_index = 0u32;
                let mut write = 0usize;

                for read in 0..count {
                    let id = self.active[read];
                    let Some(state) = self.states.get_mut(id) else {
                        continue;
                    };

                    if state.is_fade_out_complete {
                        Self::return_state(&mut self.states, &mut self.timeline_pool, id);
                        if self.last_state == Some(id) {
                            self.last_state = write.checked_sub(1).map(|w| self.active[w]);
                        }
                        continue;
                    }

                    self.active[write] = id;
                    write += 1;

                    if prev_layer != state.layer {
                        prev_layer = state.layer;
                        weight_left = (weight_left - layer_total_weight).max(0.0);
                        layer_total_weight = 0.0;
                    }

                    if dirty {
                        state.update_timeline_states(skeleton, &mut self.timeline_pool);
                    }
                    state.advance_time(passed_time, weight_left, layer_index, skeleton);

                    if state.weight_result != 0.0 {
                        layer_total_weight += state.weight_result;
                        layer_index += 1;
                    }
                }

                self.active.truncate(write);
            }
        }

        let is_fading = self
            .active_states()
            .any(|s| s.fade_state() != FadeState::Playing);
        self.is_fading = is_fading;
        self.timeline_states_dirty = false;
    }
}
