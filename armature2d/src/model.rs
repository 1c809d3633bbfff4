use crate::{ColorTransform, Error, Point, Transform};
use std::collections::HashMap;
use std::sync::Arc;

/// Easing applied from a keyframe towards the next one.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Curve {
    #[default]
    Linear,
    /// Holds the frame value until the next frame starts.
    Stepped,
    /// Authored tween easing: `< 0` eases in, `(0, 1]` eases out, `> 1` eases in and out.
    Ease(f32),
    /// Cubic bezier in normalised `[0, 1]` time/value space.
    Bezier { cx1: f32, cy1: f32, cx2: f32, cy2: f32 },
}

impl Curve {
    /// Maps a linear progress in `[0, 1]` through the curve.
    pub fn progress(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Curve::Linear => t,
            Curve::Stepped => 0.0,
            Curve::Ease(easing) => ease_value(t, easing),
            Curve::Bezier { cx1, cy1, cx2, cy2 } => bezier_value(t, cx1, cy1, cx2, cy2),
        }
    }
}

fn ease_value(progress: f32, easing: f32) -> f32 {
    if easing == 0.0 || easing.is_nan() {
        return progress;
    }
    let (value, easing) = if easing > 1.0 {
        (
            0.5 * (1.0 - (progress * std::f32::consts::PI).cos()),
            easing - 1.0,
        )
    } else if easing > 0.0 {
        (1.0 - (1.0 - progress).powi(2), easing)
    } else {
        (progress.powi(2), -easing)
    };
    (value - progress) * easing.min(1.0) + progress
}

fn bezier_value(time: f32, cx1: f32, cy1: f32, cx2: f32, cy2: f32) -> f32 {
    const BEZIER_SIZE: usize = 18;

    let tmpx = (-cx1 * 2.0 + cx2) * 0.03;
    let tmpy = (-cy1 * 2.0 + cy2) * 0.03;
    let dddx = ((cx1 - cx2) * 3.0 + 1.0) * 0.006;
    let dddy = ((cy1 - cy2) * 3.0 + 1.0) * 0.006;
    let mut ddx = tmpx * 2.0 + dddx;
    let mut ddy = tmpy * 2.0 + dddy;
    let mut dx = cx1 * 0.3 + tmpx + dddx * 0.16666667;
    let mut dy = cy1 * 0.3 + tmpy + dddy * 0.16666667;

    let mut x = dx;
    let mut y = dy;

    let mut points = [0.0f32; BEZIER_SIZE];
    for i in (0..BEZIER_SIZE).step_by(2) {
        points[i] = x;
        points[i + 1] = y;
        dx += ddx;
        dy += ddy;
        ddx += dddx;
        ddy += dddy;
        x += dx;
        y += dy;
    }

    if points[0] > time {
        if points[0].abs() <= 1.0e-12 {
            return 0.0;
        }
        return time / points[0] * points[1];
    }

    for i in (2..BEZIER_SIZE).step_by(2) {
        if points[i] >= time {
            let x = points[i - 2];
            let y = points[i - 1];
            let denom = points[i] - x;
            if denom.abs() <= 1.0e-12 {
                return y;
            }
            return y + (time - x) / denom * (points[i + 1] - y);
        }
    }

    let x = points[BEZIER_SIZE - 2];
    let y = points[BEZIER_SIZE - 1];
    let denom = 1.0 - x;
    if denom.abs() <= 1.0e-12 {
        return y;
    }
    y + (time - x) / denom * (1.0 - y)
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransformFrame {
    /// Start time in seconds, filled in by [`TransformTimeline::new`].
    pub position: f32,
    pub duration: f32,
    /// Pose relative to the bone's setup transform (scale `1.0` = unchanged).
    pub transform: Transform,
    pub pivot: Point,
    pub color: Option<ColorTransform>,
    pub curve: Curve,
}

impl TransformFrame {
    pub fn new(duration: f32, transform: Transform) -> Self {
        Self {
            position: 0.0,
            duration,
            transform,
            pivot: Point::ZERO,
            color: None,
            curve: Curve::Linear,
        }
    }

    pub fn with_pivot(mut self, pivot: Point) -> Self {
        self.pivot = pivot;
        self
    }

    pub fn with_color(mut self, color: ColorTransform) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_curve(mut self, curve: Curve) -> Self {
        self.curve = curve;
        self
    }
}

/// Keyframe track for a single bone.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransformTimeline {
    pub bone: String,
    pub frames: Vec<TransformFrame>,
}

impl TransformTimeline {
    pub fn new(bone: impl Into<String>, mut frames: Vec<TransformFrame>) -> Result<Self, Error> {
        let bone = bone.into();
        if frames.is_empty() {
            return Err(Error::InvalidValue {
                message: format!("timeline for bone '{bone}' has no frames"),
            });
        }
        let mut position = 0.0;
        for frame in &mut frames {
            if !frame.duration.is_finite() || frame.duration < 0.0 {
                return Err(Error::InvalidValue {
                    message: format!(
                        "frame duration for bone '{bone}' must be finite and >= 0 (got {})",
                        frame.duration
                    ),
                });
            }
            frame.position = position;
            position += frame.duration;
        }
        Ok(Self { bone, frames })
    }

    pub fn is_single_frame(&self) -> bool {
        self.frames.len() == 1
    }
}

/// An authored clip. Immutable once built and shared by every state that plays it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationData {
    pub name: String,
    /// Clip length in seconds.
    pub duration: f32,
    /// `0` loops forever.
    pub play_times: u32,
    pub fade_in_time: f32,
    /// Playback duration multiplier; `2.0` plays at half speed.
    pub scale: f32,
    /// Start offset in seconds.
    pub position: f32,
    pub timelines: Vec<TransformTimeline>,
}

impl AnimationData {
    pub fn new(
        name: impl Into<String>,
        duration: f32,
        timelines: Vec<TransformTimeline>,
    ) -> Result<Self, Error> {
        let data = Self {
            name: name.into(),
            duration,
            play_times: 0,
            fade_in_time: 0.0,
            scale: 1.0,
            position: 0.0,
            timelines,
        };
        data.validate()?;
        Ok(data)
    }

    pub fn with_play_times(mut self, play_times: u32) -> Self {
        self.play_times = play_times;
        self
    }

    pub fn with_fade_in_time(mut self, fade_in_time: f32) -> Self {
        self.fade_in_time = fade_in_time;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_position(mut self, position: f32) -> Self {
        self.position = position;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(Error::InvalidValue {
                message: format!("duration of '{}' must be finite and >= 0", self.name),
            });
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(Error::InvalidValue {
                message: format!("scale of '{}' must be finite and > 0", self.name),
            });
        }
        if !self.position.is_finite() || self.position < 0.0 {
            return Err(Error::InvalidValue {
                message: format!("start position of '{}' must be finite and >= 0", self.name),
            });
        }
        for (i, timeline) in self.timelines.iter().enumerate() {
            if self.timelines[..i].iter().any(|t| t.bone == timeline.bone) {
                return Err(Error::InvalidValue {
                    message: format!(
                        "animation '{}' has two timelines for bone '{}'",
                        self.name, timeline.bone
                    ),
                });
            }
        }
        Ok(())
    }

    pub fn timeline(&self, bone: &str) -> Option<&TransformTimeline> {
        self.timelines.iter().find(|t| t.bone == bone)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoneData {
    pub name: String,
    pub parent: Option<String>,
    /// Setup (bind) transform relative to the parent.
    pub transform: Transform,
}

impl BoneData {
    pub fn new(name: impl Into<String>, parent: Option<&str>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            parent: parent.map(str::to_string),
            transform,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotData {
    pub name: String,
    pub bone: String,
    /// Whether a child armature in this slot follows the parent's fade-ins.
    pub inherit_animation: bool,
}

impl SlotData {
    pub fn new(name: impl Into<String>, bone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bone: bone.into(),
            inherit_animation: true,
        }
    }

    pub fn with_inherit_animation(mut self, inherit_animation: bool) -> Self {
        self.inherit_animation = inherit_animation;
        self
    }
}

#[derive(Clone, Debug)]
pub struct ArmatureData {
    pub name: String,
    pub bones: Vec<BoneData>,
    pub slots: Vec<SlotData>,
    pub animations: Vec<Arc<AnimationData>>,
    pub animation_index: HashMap<String, usize>,
    bone_parents: Vec<Option<usize>>,
    slot_bones: Vec<usize>,
    default_animation: Option<String>,
}

impl ArmatureData {
    /// Validates and indexes the armature. Parents must be listed before their children.
    pub fn new(
        name: impl Into<String>,
        bones: Vec<BoneData>,
        slots: Vec<SlotData>,
        animations: Vec<AnimationData>,
    ) -> Result<Self, Error> {
        let mut bone_index: HashMap<&str, usize> = HashMap::new();
        let mut bone_parents = Vec::with_capacity(bones.len());
        for (i, bone) in bones.iter().enumerate() {
            let parent = match bone.parent.as_deref() {
                Some(parent) => Some(*bone_index.get(parent).ok_or_else(|| {
                    Error::UnknownBoneParent {
                        bone: bone.name.clone(),
                        parent: parent.to_string(),
                    }
                })?),
                None => None,
            };
            if bone_index.insert(bone.name.as_str(), i).is_some() {
                return Err(Error::DuplicateBone {
                    name: bone.name.clone(),
                });
            }
            bone_parents.push(parent);
        }

        let slot_bones = slots
            .iter()
            .map(|slot| {
                bone_index
                    .get(slot.bone.as_str())
                    .copied()
                    .ok_or_else(|| Error::UnknownSlotBone {
                        slot: slot.name.clone(),
                        bone: slot.bone.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut animation_index = HashMap::new();
        let mut shared = Vec::with_capacity(animations.len());
        for animation in animations {
            animation.validate()?;
            if animation_index
                .insert(animation.name.clone(), shared.len())
                .is_some()
            {
                return Err(Error::DuplicateAnimation {
                    name: animation.name,
                });
            }
            shared.push(Arc::new(animation));
        }

        Ok(Self {
            name: name.into(),
            bones,
            slots,
            animations: shared,
            animation_index,
            bone_parents,
            slot_bones,
            default_animation: None,
        })
    }

    pub fn with_default_animation(mut self, name: &str) -> Result<Self, Error> {
        if !self.animation_index.contains_key(name) {
            return Err(Error::UnknownAnimation {
                name: name.to_string(),
            });
        }
        self.default_animation = Some(name.to_string());
        Ok(self)
    }

    /// The explicitly designated default clip, or the first clip when none was set.
    pub fn default_animation(&self) -> Option<&str> {
        self.default_animation
            .as_deref()
            .or_else(|| self.animations.first().map(|a| a.name.as_str()))
    }

    pub fn animation(&self, name: &str) -> Option<&Arc<AnimationData>> {
        let index = *self.animation_index.get(name)?;
        self.animations.get(index)
    }

    pub fn bone_parent(&self, bone_index: usize) -> Option<usize> {
        self.bone_parents.get(bone_index).copied().flatten()
    }

    pub fn slot_bone(&self, slot_index: usize) -> Option<usize> {
        self.slot_bones.get(slot_index).copied()
    }
}
