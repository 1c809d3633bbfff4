use super::pool::{FreeList, PoolId, Poolable};
use super::timeline_state::{Playhead, TimelineState};
use crate::{AnimationData, Skeleton};
use std::sync::Arc;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum FadeState {
    #[default]
    FadingIn,
    /// Fade-in finished; the state plays at full fade weight.
    Playing,
    FadingOut,
}

/// Handle to a pooled [`AnimationState`]. Goes stale once the state is returned to the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnimationStateHandle {
    pub(crate) id: PoolId,
}

/// Parameters for binding a state to a clip.
#[derive(Clone, Debug)]
pub(crate) struct StateSetup {
    pub clip: Arc<AnimationData>,
    pub name: String,
    pub play_times: u32,
    pub position: f32,
    pub duration: f32,
    pub time_scale: f32,
    pub fade_in_time: f32,
    pub pause_fade_in: bool,
}

/// One active playback of a clip.
#[derive(Debug)]
pub struct AnimationState {
    name: String,
    clip: Option<Arc<AnimationData>>,
    pub(crate) layer: i32,
    pub(crate) group: String,
    pub additive_blending: bool,

    play_times: u32,
    current_play_times: u32,
    position: f32,
    duration: f32,
    time_scale: f32,
    time: f32,
    current_time: f32,

    weight: f32,
    pub(crate) weight_result: f32,
    layer_index: u32,

    fade_state: FadeState,
    fade_time: f32,
    fade_total_time: f32,
    fade_progress: f32,
    fade_out_from: f32,
    pause_fade_in: bool,
    pause_fade_out: bool,

    is_playing: bool,
    is_completed: bool,
    pub(crate) is_fade_out_complete: bool,

    timeline_states: Vec<TimelineState>,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            name: String::new(),
            clip: None,
            layer: 0,
            group: String::new(),
            additive_blending: false,
            play_times: 0,
            current_play_times: 0,
            position: 0.0,
            duration: 0.0,
            time_scale: 1.0,
            time: 0.0,
            current_time: 0.0,
            weight: 1.0,
            weight_result: 0.0,
            layer_index: 0,
            fade_state: FadeState::FadingIn,
            fade_time: 0.0,
            fade_total_time: 0.0,
            fade_progress: 0.0,
            fade_out_from: 0.0,
            pause_fade_in: false,
            pause_fade_out: false,
            is_playing: true,
            is_completed: false,
            is_fade_out_complete: false,
            timeline_states: Vec::new(),
        }
    }
}

impl Poolable for AnimationState {
    fn clear(&mut self) {
        *self = Self::default();
    }
}

impl AnimationState {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn clip(&self) -> Option<&Arc<AnimationData>> {
        self.clip.as_ref()
    }

    pub fn layer(&self) -> i32 {
        self.layer
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// `0` loops forever.
    pub fn play_times(&self) -> u32 {
        self.play_times
    }

    pub fn current_play_times(&self) -> u32 {
        self.current_play_times
    }

    /// Playable length of one loop in clip time.
    pub fn total_time(&self) -> f32 {
        self.duration
    }

    /// Clip-local sample time as of the last tick.
    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Non-positive values freeze the playhead; NaN resets to `1.0`.
    pub fn set_time_scale(&mut self, time_scale: f32) {
        if time_scale.is_nan() {
            log::debug!("state '{}': NaN time scale reset to 1.0", self.name);
            self.time_scale = 1.0;
        } else {
            self.time_scale = time_scale;
        }
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.weight = if weight.is_nan() {
            1.0
        } else {
            weight.clamp(0.0, 1.0)
        };
    }

    /// Blend weight applied on the last tick.
    ///
    /// States sharing a layer each receive the same `weight_left`, so with fade-out mode
    /// `None` the results within one layer can sum above 1. `Animation` does not rescale
    /// them; each bone normalises its override weights when their total exceeds 1.
    pub fn weight_result(&self) -> f32 {
        self.weight_result
    }

    /// Dense layer ordinal assigned on the last tick.
    pub fn layer_index(&self) -> u32 {
        self.layer_index
    }

    pub fn fade_state(&self) -> FadeState {
        self.fade_state
    }

    /// Current fade multiplier in `[0, 1]`.
    pub fn fade_progress(&self) -> f32 {
        self.fade_progress
    }

    pub fn is_fade_in_complete(&self) -> bool {
        self.fade_state == FadeState::Playing
    }

    pub fn is_fade_out_complete(&self) -> bool {
        self.is_fade_out_complete
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing && !self.is_completed
    }

    /// True once a finite number of loops has played out. Never true for looping clips.
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    pub fn play(&mut self) {
        self.is_playing = true;
    }

    /// Freezes the playhead. The state keeps contributing its current pose.
    pub fn stop(&mut self) {
        self.is_playing = false;
    }

    /// Seeks to a clip-local time measured from the state's start position.
    pub fn set_current_time(&mut self, time: f32) {
        let time = if time.is_finite() { time.max(0.0) } else { 0.0 };
        self.time = time;
        self.is_completed = false;
        self.refresh_playhead();
    }

    pub fn timeline_states(&self) -> &[TimelineState] {
        &self.timeline_states
    }

    pub(crate) fn fade_in(
        &mut self,
        skeleton: &Skeleton,
        setup: StateSetup,
        timeline_pool: &mut FreeList<TimelineState>,
    ) {
        self.name = setup.name;
        self.play_times = setup.play_times;
        self.position = setup.position;
        self.duration = setup.duration;
        self.set_time_scale(setup.time_scale);
        self.time = 0.0;
        self.current_play_times = 0;
        self.current_time = self.position;
        self.is_playing = true;
        self.is_completed = false;
        self.is_fade_out_complete = false;

        self.fade_state = FadeState::FadingIn;
        self.fade_time = 0.0;
        self.fade_total_time = setup.fade_in_time.max(0.0);
        self.pause_fade_in = setup.pause_fade_in;
        self.pause_fade_out = false;
        if self.fade_total_time <= 0.0 {
            self.fade_progress = 1.0;
            self.fade_state = FadeState::Playing;
        } else {
            self.fade_progress = 0.0;
        }

        self.clip = Some(setup.clip);
        self.update_timeline_states(skeleton, timeline_pool);
        log::trace!(
            "state '{}' fading in over {}s (layer {}, group '{}')",
            self.name,
            self.fade_total_time,
            self.layer,
            self.group
        );
    }

    /// Starts fading towards zero weight. A shorter fade replaces a running one.
    pub fn fade_out(&mut self, fade_out_time: f32, pause: bool) {
        if self.is_fade_out_complete {
            return;
        }
        let fade_out_time = if fade_out_time.is_nan() {
            0.0
        } else {
            fade_out_time.max(0.0)
        };
        if self.fade_state == FadeState::FadingOut {
            let remaining = (self.fade_total_time - self.fade_time).max(0.0);
            if remaining <= fade_out_time {
                return;
            }
        }

        self.pause_fade_out = pause;
        self.fade_out_from = self.fade_progress;
        self.fade_time = 0.0;
        self.fade_total_time = fade_out_time;
        self.fade_state = FadeState::FadingOut;
        if fade_out_time <= 0.0 {
            self.fade_progress = 0.0;
        }
        log::trace!("state '{}' fading out over {fade_out_time}s", self.name);
    }

    /// Rebinds timeline states to bones by name, keeping cursors of bones that still exist.
    pub(crate) fn update_timeline_states(
        &mut self,
        skeleton: &Skeleton,
        timeline_pool: &mut FreeList<TimelineState>,
    ) {
        let Some(clip) = self.clip.clone() else {
            return;
        };
        let mut previous = std::mem::take(&mut self.timeline_states);
        for (bone_index, bone) in skeleton.bones.iter().enumerate() {
            let Some(timeline_index) = clip.timelines.iter().position(|t| t.bone == bone.name)
            else {
                continue;
            };
            let state = match previous
                .iter()
                .position(|s| s.timeline_index() == timeline_index)
            {
                Some(i) => {
                    let mut state = previous.swap_remove(i);
                    state.rebind(bone_index);
                    state
                }
                None => {
                    let mut state = timeline_pool.take();
                    state.fade_in(bone_index, timeline_index, &clip.timelines[timeline_index]);
                    state
                }
            };
            self.timeline_states.push(state);
        }
        if !previous.is_empty() {
            log::trace!(
                "state '{}': {} timeline(s) lost their bone",
                self.name,
                previous.len()
            );
        }
        for mut state in previous {
            state.fade_out();
            timeline_pool.put(state);
        }
    }

    pub(crate) fn release_timeline_states(&mut self, timeline_pool: &mut FreeList<TimelineState>) {
        for mut state in self.timeline_states.drain(..) {
            state.fade_out();
            timeline_pool.put(state);
        }
    }

    pub(crate) fn advance_time(
        &mut self,
        passed_time: f32,
        weight_left: f32,
        layer_index: u32,
        skeleton: &mut Skeleton,
    ) {
        self.layer_index = layer_index;
        self.advance_fade(passed_time);

        let frozen = !self.is_playing
            || self.time_scale <= 0.0
            || (self.pause_fade_in && self.fade_state == FadeState::FadingIn)
            || (self.pause_fade_out && self.fade_state == FadeState::FadingOut);
        if !frozen && !self.is_completed {
            self.time += passed_time * self.time_scale;
        }
        let playhead = self.refresh_playhead();

        if self.fade_state == FadeState::FadingOut && self.fade_progress <= 0.0 {
            self.is_fade_out_complete = true;
        }

        self.weight_result = self.fade_progress * self.weight * weight_left.clamp(0.0, 1.0);
        if self.weight_result <= 0.0 {
            self.weight_result = 0.0;
            return;
        }

        let Some(clip) = self.clip.as_deref() else {
            return;
        };
        for state in &mut self.timeline_states {
            let Some(timeline) = clip.timelines.get(state.timeline_index()) else {
                continue;
            };
            state.update(
                timeline,
                &mut skeleton.bones,
                playhead,
                self.weight_result,
                layer_index,
                self.additive_blending,
            );
        }
    }

    fn advance_fade(&mut self, passed_time: f32) {
        match self.fade_state {
            FadeState::FadingIn => {
                self.fade_time += passed_time;
                self.fade_progress = if self.fade_total_time <= 0.0 {
                    1.0
                } else {
                    (self.fade_time / self.fade_total_time).min(1.0)
                };
                if self.fade_progress >= 1.0 {
                    self.fade_state = FadeState::Playing;
                }
            }
            FadeState::FadingOut => {
                self.fade_time += passed_time;
                self.fade_progress = if self.fade_total_time <= 0.0 {
                    0.0
                } else {
                    self.fade_out_from * (1.0 - self.fade_time / self.fade_total_time).max(0.0)
                };
            }
            FadeState::Playing => {}
        }
    }

    fn refresh_playhead(&mut self) -> Playhead {
        let duration = self.duration;
        let (local, looping) = if duration <= 0.0 {
            self.current_play_times = 0;
            if self.play_times > 0 {
                self.current_play_times = self.play_times;
                self.is_completed = true;
            }
            (0.0, false)
        } else if self.play_times == 0 {
            self.current_play_times = (self.time / duration).floor() as u32;
            (self.time % duration, true)
        } else {
            let end = duration * self.play_times as f32;
            if self.time >= end {
                self.time = end;
                self.current_play_times = self.play_times;
                self.is_completed = true;
                (duration, false)
            } else {
                let loops = (self.time / duration).floor() as u32;
                self.current_play_times = loops;
                (self.time - duration * loops as f32, loops + 1 < self.play_times)
            }
        };

        self.current_time = self.position + local;
        Playhead {
            time: self.current_time,
            play_times: self.current_play_times,
            looping,
            complete: self.is_completed,
        }
    }
}
