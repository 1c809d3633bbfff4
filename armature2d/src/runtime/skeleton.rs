use crate::{Armature, ArmatureData, ColorTransform, Error, Matrix, Point, Transform};
use std::sync::Arc;

// Pose sum channels: x, y, skew_x, skew_y, scale_x - 1, scale_y - 1, pivot x, pivot y.
const POSE_CHANNELS: usize = 8;

fn pose_delta(transform: &Transform, pivot: Point) -> [f32; POSE_CHANNELS] {
    [
        transform.x,
        transform.y,
        transform.skew_x,
        transform.skew_y,
        transform.scale_x - 1.0,
        transform.scale_y - 1.0,
        pivot.x,
        pivot.y,
    ]
}

/// One weighted sample written into a bone by a timeline state.
#[derive(Copy, Clone, Debug)]
pub(crate) struct BoneContribution {
    pub transform: Transform,
    pub pivot: Point,
    pub color: Option<ColorTransform>,
    pub weight: f32,
    pub layer_index: u32,
    pub additive: bool,
}

#[derive(Clone, Debug, Default)]
struct BlendAccumulator {
    blended: [f32; POSE_CHANNELS],
    additive: [f32; POSE_CHANNELS],
    weight: f32,
    color: Option<ColorTransform>,
    contributions: u32,
    last_layer_index: u32,
}

#[derive(Clone, Debug)]
pub struct Bone {
    data_index: usize,
    parent: Option<usize>,

    pub name: String,
    /// Setup transform relative to the parent.
    pub origin: Transform,

    /// Animated offset resolved on the last tick (scale is a multiplier on `origin`).
    pub offset: Transform,
    pub pivot: Point,
    pub color: ColorTransform,

    /// `origin` combined with `offset`.
    pub local: Transform,
    pub world: Matrix,

    blend: BlendAccumulator,
}

impl Bone {
    pub fn data_index(&self) -> usize {
        self.data_index
    }

    pub fn parent_index(&self) -> Option<usize> {
        self.parent
    }

    /// Number of contributions received since the pose was last resolved.
    pub fn pending_contributions(&self) -> u32 {
        self.blend.contributions
    }

    /// Layer index of the most recent pending contribution.
    pub fn last_layer_index(&self) -> Option<u32> {
        (self.blend.contributions > 0).then_some(self.blend.last_layer_index)
    }

    pub(crate) fn accumulate(&mut self, contribution: &BoneContribution) {
        let weight = contribution.weight;
        let delta = pose_delta(&contribution.transform, contribution.pivot);
        let blend = &mut self.blend;

        if contribution.additive {
            for (sum, value) in blend.additive.iter_mut().zip(delta) {
                *sum += value * weight;
            }
        } else {
            for (sum, value) in blend.blended.iter_mut().zip(delta) {
                *sum += value * weight;
            }
            blend.weight += weight;
        }

        // Colour blends in call order: lower layers first, later contributions on top.
        if let Some(value) = contribution.color {
            let current = blend.color.unwrap_or(ColorTransform::IDENTITY);
            blend.color = Some(if contribution.additive {
                current.add_weighted(&value, weight)
            } else {
                current.lerp(&value, weight)
            });
        }

        blend.contributions += 1;
        blend.last_layer_index = contribution.layer_index;
    }

    /// Bones that received nothing since the last resolve keep their previous offset.
    fn resolve(&mut self, parent_world: Option<&Matrix>) {
        let blend = std::mem::take(&mut self.blend);
        if blend.contributions > 0 {
            let norm = if blend.weight > 1.0 {
                1.0 / blend.weight
            } else {
                1.0
            };
            let channel = |i: usize| blend.blended[i] * norm + blend.additive[i];

            self.offset = Transform {
                x: channel(0),
                y: channel(1),
                skew_x: channel(2),
                skew_y: channel(3),
                scale_x: 1.0 + channel(4),
                scale_y: 1.0 + channel(5),
            };
            self.pivot = Point::new(channel(6), channel(7));
            self.color = blend.color.unwrap_or(ColorTransform::IDENTITY);
        }

        self.local = Transform {
            x: self.origin.x + self.offset.x,
            y: self.origin.y + self.offset.y,
            skew_x: self.origin.skew_x + self.offset.skew_x,
            skew_y: self.origin.skew_y + self.offset.skew_y,
            scale_x: self.origin.scale_x * self.offset.scale_x,
            scale_y: self.origin.scale_y * self.offset.scale_y,
        };
        let local = self.local.to_matrix();
        self.world = match parent_world {
            Some(parent) => parent.concat(&local),
            None => local,
        };
    }
}

#[derive(Debug)]
pub struct Slot {
    data_index: usize,
    pub name: String,
    pub bone: usize,
    pub inherit_animation: bool,
    /// Colour of the owning bone after the last resolve.
    pub color: ColorTransform,
    child_armature: Option<Box<Armature>>,
}

impl Slot {
    pub fn data_index(&self) -> usize {
        self.data_index
    }

    pub fn child_armature(&self) -> Option<&Armature> {
        self.child_armature.as_deref()
    }

    pub fn child_armature_mut(&mut self) -> Option<&mut Armature> {
        self.child_armature.as_deref_mut()
    }
}

#[derive(Debug)]
pub struct Skeleton {
    pub data: Arc<ArmatureData>,
    pub bones: Vec<Bone>,
    pub slots: Vec<Slot>,
}

impl Skeleton {
    pub fn new(data: Arc<ArmatureData>) -> Self {
        let bones = data
            .bones
            .iter()
            .enumerate()
            .map(|(data_index, bone)| Bone {
                data_index,
                parent: data.bone_parent(data_index),
                name: bone.name.clone(),
                origin: bone.transform,
                offset: Transform::IDENTITY,
                pivot: Point::ZERO,
                color: ColorTransform::IDENTITY,
                local: bone.transform,
                world: Matrix::IDENTITY,
                blend: BlendAccumulator::default(),
            })
            .collect();

        let slots = data
            .slots
            .iter()
            .enumerate()
            .map(|(data_index, slot)| Slot {
                data_index,
                name: slot.name.clone(),
                bone: data.slot_bone(data_index).unwrap_or(0),
                inherit_animation: slot.inherit_animation,
                color: ColorTransform::IDENTITY,
                child_armature: None,
            })
            .collect();

        let mut skeleton = Self { data, bones, slots };
        skeleton.update_world_transform();
        skeleton
    }

    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    pub fn bone(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|b| b.name == name)
    }

    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn slot_mut(&mut self, name: &str) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.name == name)
    }

    /// Places `armature` in the named slot and returns the previous occupant.
    pub fn set_child_armature(
        &mut self,
        slot_name: &str,
        armature: Option<Armature>,
    ) -> Result<Option<Armature>, Error> {
        let slot = self.slot_mut(slot_name).ok_or_else(|| Error::UnknownSlot {
            name: slot_name.to_string(),
        })?;
        let previous = std::mem::replace(&mut slot.child_armature, armature.map(Box::new));
        Ok(previous.map(|b| *b))
    }

    pub(crate) fn take_child_armatures(&mut self) -> Vec<(String, Armature)> {
        self.slots
            .iter_mut()
            .filter_map(|slot| {
                slot.child_armature
                    .take()
                    .map(|child| (slot.name.clone(), *child))
            })
            .collect()
    }

    /// Drops every animated offset and pending contribution, returning bones to the setup pose.
    pub fn reset_pose(&mut self) {
        for bone in &mut self.bones {
            bone.blend = BlendAccumulator::default();
            bone.offset = Transform::IDENTITY;
            bone.pivot = Point::ZERO;
            bone.color = ColorTransform::IDENTITY;
        }
        self.update_world_transform();
    }

    /// Resolves the contributions written this tick into local and world transforms.
    pub fn update_world_transform(&mut self) {
        for i in 0..self.bones.len() {
            let parent_world = self.bones[i]
                .parent
                .filter(|&p| p < i)
                .map(|p| self.bones[p].world);
            self.bones[i].resolve(parent_world.as_ref());
        }

        for slot in &mut self.slots {
            if let Some(bone) = self.bones.get(slot.bone) {
                slot.color = bone.color;
            }
        }
    }

    /// Resolves the pose, then ticks every child armature by the same amount.
    pub fn advance_time(&mut self, passed_time: f32) {
        self.update_world_transform();
        for slot in &mut self.slots {
            if let Some(child) = slot.child_armature.as_deref_mut() {
                child.advance_time(passed_time);
            }
        }
    }
}
