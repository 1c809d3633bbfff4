use super::pool::Poolable;
use super::skeleton::{Bone, BoneContribution};
use crate::{ColorTransform, Point, Transform, TransformFrame, TransformTimeline};

/// Where the owning state's playhead sits for this tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Playhead {
    /// Clip-local sample time.
    pub time: f32,
    /// Completed loops so far.
    pub play_times: u32,
    /// Whether playback wraps back to the first frame after this loop.
    pub looping: bool,
    pub complete: bool,
}

/// Cursor over one bone's keyframe track for one playing animation state.
#[derive(Clone, Debug, Default)]
pub struct TimelineState {
    bone: Option<usize>,
    timeline: usize,

    tween_transform: bool,
    tween_scale: bool,
    tween_color: bool,
    has_color: bool,
    is_complete: bool,

    current_frame_index: usize,
    current_play_times: u32,
    current_time: f32,

    transform: Transform,
    pivot: Point,
    color: ColorTransform,
}

impl Poolable for TimelineState {
    fn clear(&mut self) {
        *self = Self::default();
    }
}

impl TimelineState {
    pub fn bone_index(&self) -> Option<usize> {
        self.bone
    }

    pub(crate) fn timeline_index(&self) -> usize {
        self.timeline
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn current_frame_index(&self) -> usize {
        self.current_frame_index
    }

    /// Pose sampled on the last update.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn pivot(&self) -> Point {
        self.pivot
    }

    pub fn color(&self) -> Option<&ColorTransform> {
        self.has_color.then_some(&self.color)
    }

    pub fn is_tweening_transform(&self) -> bool {
        self.tween_transform
    }

    pub fn is_tweening_scale(&self) -> bool {
        self.tween_scale
    }

    pub fn is_tweening_color(&self) -> bool {
        self.tween_color
    }

    pub(crate) fn fade_in(
        &mut self,
        bone: usize,
        timeline_index: usize,
        timeline: &TransformTimeline,
    ) {
        self.clear();
        self.bone = Some(bone);
        self.timeline = timeline_index;

        let Some(first) = timeline.frames.first() else {
            return;
        };
        let first_color = first.color.unwrap_or(ColorTransform::IDENTITY);
        for frame in &timeline.frames[1..] {
            let t = &frame.transform;
            let f = &first.transform;
            if t.x != f.x
                || t.y != f.y
                || t.skew_x != f.skew_x
                || t.skew_y != f.skew_y
                || frame.pivot != first.pivot
            {
                self.tween_transform = true;
            }
            if t.scale_x != f.scale_x || t.scale_y != f.scale_y {
                self.tween_scale = true;
            }
            if frame.color.unwrap_or(ColorTransform::IDENTITY) != first_color {
                self.tween_color = true;
            }
        }
        self.has_color = timeline.frames.iter().any(|f| f.color.is_some());

        self.transform = first.transform;
        self.pivot = first.pivot;
        self.color = first_color;
    }

    pub(crate) fn rebind(&mut self, bone: usize) {
        self.bone = Some(bone);
    }

    /// Releases the bone binding; the cursor restarts on the next `fade_in`.
    pub(crate) fn fade_out(&mut self) {
        self.bone = None;
        self.current_frame_index = 0;
        self.current_play_times = 0;
        self.current_time = 0.0;
    }

    pub(crate) fn update(
        &mut self,
        timeline: &TransformTimeline,
        bones: &mut [Bone],
        playhead: Playhead,
        weight: f32,
        layer_index: u32,
        additive: bool,
    ) {
        let Some(bone) = self.bone.and_then(|b| bones.get_mut(b)) else {
            return;
        };
        if timeline.frames.len() > 1 {
            self.update_multiple_frame(timeline, playhead);
        }
        self.is_complete = playhead.complete;

        bone.accumulate(&BoneContribution {
            transform: self.transform,
            pivot: self.pivot,
            color: self.has_color.then_some(self.color),
            weight,
            layer_index,
            additive,
        });
    }

    fn update_multiple_frame(&mut self, timeline: &TransformTimeline, playhead: Playhead) {
        let frames = &timeline.frames;
        let time = playhead.time;

        if playhead.play_times != self.current_play_times
            || time < self.current_time
            || self.current_frame_index >= frames.len()
        {
            self.current_frame_index = 0;
            self.current_play_times = playhead.play_times;
        }
        self.current_time = time;

        while self.current_frame_index + 1 < frames.len()
            && time >= frames[self.current_frame_index + 1].position
        {
            self.current_frame_index += 1;
        }

        let frame = &frames[self.current_frame_index];
        let next = if self.current_frame_index + 1 < frames.len() {
            Some(&frames[self.current_frame_index + 1])
        } else if playhead.looping && frame.duration > 0.0 {
            frames.first()
        } else {
            None
        };

        let first = &frames[0];
        match next {
            Some(next) if frame.duration > 0.0 => {
                let t = (time - frame.position) / frame.duration;
                self.tween(first, frame, next, frame.curve.progress(t));
            }
            _ => self.tween(first, frame, frame, 0.0),
        }
    }

    fn tween(
        &mut self,
        first: &TransformFrame,
        from: &TransformFrame,
        to: &TransformFrame,
        progress: f32,
    ) {
        let sampled = from.transform.lerp(&to.transform, progress);

        if self.tween_transform {
            self.transform.x = sampled.x;
            self.transform.y = sampled.y;
            self.transform.skew_x = sampled.skew_x;
            self.transform.skew_y = sampled.skew_y;
            self.pivot = from.pivot.lerp(to.pivot, progress);
        } else {
            self.transform.x = first.transform.x;
            self.transform.y = first.transform.y;
            self.transform.skew_x = first.transform.skew_x;
            self.transform.skew_y = first.transform.skew_y;
            self.pivot = first.pivot;
        }

        if self.tween_scale {
            self.transform.scale_x = sampled.scale_x;
            self.transform.scale_y = sampled.scale_y;
        } else {
            self.transform.scale_x = first.transform.scale_x;
            self.transform.scale_y = first.transform.scale_y;
        }

        if self.has_color {
            self.color = if self.tween_color {
                let from_color = from.color.unwrap_or(ColorTransform::IDENTITY);
                let to_color = to.color.unwrap_or(ColorTransform::IDENTITY);
                from_color.lerp(&to_color, progress)
            } else {
                first.color.unwrap_or(ColorTransform::IDENTITY)
            };
        }
    }
}
