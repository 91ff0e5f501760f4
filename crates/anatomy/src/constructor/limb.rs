//! Weighted bone chain of a limb.

use glam::Vec3;

use crate::constants::{DEFAULT_SEGMENT_LENGTH, MAX_WEIGHT, MIN_WEIGHT};
use crate::mirror::realign_chain;
use crate::record::Bone;
use crate::skeleton::Transform;
use crate::types::PartId;

/// Live rig state of a limb.
///
/// Bones are creature-local so they can be mirrored and persisted without
/// going through the limb root.
#[derive(Debug, Clone, PartialEq)]
pub struct LimbRig {
    bones: Vec<Transform>,
    weights: Vec<f32>,
    blend_shape_count: usize,
    /// Extremity attached at the terminal bone
    pub(crate) connected_extremity: Option<PartId>,
}

impl LimbRig {
    /// Rest pose: bones spaced along the root's +Z, aligned along the chain
    pub fn new(bone_count: usize, blend_shape_count: usize) -> Self {
        let bones = (0..bone_count)
            .map(|i| Transform::from_translation(Vec3::new(0.0, 0.0, i as f32 * DEFAULT_SEGMENT_LENGTH)))
            .collect();
        let mut rig = Self {
            bones,
            weights: vec![0.0; bone_count],
            blend_shape_count,
            connected_extremity: None,
        };
        rig.realign(f32::EPSILON);
        rig
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn bones(&self) -> &[Transform] {
        &self.bones
    }

    pub fn bone(&self, index: usize) -> Option<&Transform> {
        self.bones.get(index)
    }

    pub(crate) fn bone_mut(&mut self, index: usize) -> Option<&mut Transform> {
        self.bones.get_mut(index)
    }

    pub fn terminal_bone(&self) -> Option<&Transform> {
        self.bones.last()
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn weight(&self, index: usize) -> Option<f32> {
        self.weights.get(index).copied()
    }

    pub fn blend_shape_count(&self) -> usize {
        self.blend_shape_count
    }

    pub fn connected_extremity(&self) -> Option<PartId> {
        self.connected_extremity
    }

    /// Same pose and weights, without the extremity link
    pub(crate) fn duplicate(&self) -> Self {
        Self {
            connected_extremity: None,
            ..self.clone()
        }
    }

    /// Clamp and store a weight. Returns the stored value, or `None` when the
    /// mesh has no blend shapes or the index is out of range.
    pub(crate) fn set_weight(&mut self, index: usize, weight: f32) -> Option<f32> {
        if self.blend_shape_count == 0 || index >= self.weights.len() {
            return None;
        }
        let weight = weight.clamp(MIN_WEIGHT, MAX_WEIGHT);
        self.weights[index] = weight;
        Some(weight)
    }

    /// Move every bone rigidly with the limb root from `from` to `to`.
    pub(crate) fn carry(&mut self, from: &Transform, to: &Transform) {
        let delta = to.rotation * from.rotation.inverse();
        for bone in &mut self.bones {
            bone.translation = to.translation + delta * (bone.translation - from.translation);
            bone.rotation = delta * bone.rotation;
        }
    }

    /// Aim the chain, using creature right as the up hint.
    pub(crate) fn realign(&mut self, epsilon: f32) {
        realign_chain(&mut self.bones, Vec3::X, Vec3::Y, epsilon);
    }

    pub(crate) fn restore(&mut self, records: &[Bone]) {
        for (bone, record) in self.bones.iter_mut().zip(records) {
            bone.translation = record.position;
            bone.rotation = record.rotation;
        }
    }

    pub(crate) fn write_records(&self, records: &mut [Bone]) {
        for (i, record) in records.iter_mut().enumerate().take(self.bones.len()) {
            record.position = self.bones[i].translation;
            record.rotation = self.bones[i].rotation;
            record.weight = self.weights[i];
        }
    }
}
