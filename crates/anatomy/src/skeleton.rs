//! Transform store for a creature's skeleton.
//!
//! Bone and part transforms are kept in creature-local space. The creature's
//! root [`Transform`] maps them to world space for the host.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::record::Bone;

/// Translation, rotation and scale of one node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_translation_rotation(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
            scale: Vec3::ONE,
        }
    }

    /// Map a point from this transform's local space into its parent space
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.translation + self.rotation * (self.scale * point)
    }

    /// Map a point from the parent space into this transform's local space
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        (self.rotation.inverse() * (point - self.translation)) / self.scale
    }

    /// Compose `self` (parent) with `child`, both relative to the same parent chain
    pub fn mul_transform(&self, child: &Transform) -> Transform {
        Transform {
            translation: self.transform_point(child.translation),
            rotation: self.rotation * child.rotation,
            scale: self.scale * child.scale,
        }
    }

    /// Express a parent-space transform relative to `self`
    pub fn relative(&self, other: &Transform) -> Transform {
        Transform {
            translation: self.inverse_transform_point(other.translation),
            rotation: self.rotation.inverse() * other.rotation,
            scale: other.scale / self.scale,
        }
    }
}

/// One bone of the creature's own skeleton
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonBone {
    pub name: String,
    /// Creature-local transform
    pub transform: Transform,
    /// Blend-shape weight of the body segment around this bone
    pub weight: f32,
}

/// Ordered bones of a creature. Parts attach to `bones[bone_index]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    /// Creature root in world space
    root: Transform,
    bones: Vec<SkeletonBone>,
}

impl Skeleton {
    pub fn new() -> Self {
        Self::default()
    }

    /// A straight spine of `count` bones along +Z, `spacing` apart
    pub fn spine(count: usize, spacing: f32) -> Self {
        let bones = (0..count)
            .map(|i| SkeletonBone {
                name: format!("Bone.{i:03}"),
                transform: Transform::from_translation(Vec3::new(0.0, 0.0, i as f32 * spacing)),
                weight: 0.0,
            })
            .collect();
        Self {
            root: Transform::IDENTITY,
            bones,
        }
    }

    /// Rebuild from persisted bone records
    pub fn from_records(records: &[Bone]) -> Self {
        let bones = records
            .iter()
            .enumerate()
            .map(|(i, bone)| SkeletonBone {
                name: format!("Bone.{i:03}"),
                transform: Transform::from_translation_rotation(bone.position, bone.rotation),
                weight: bone.weight,
            })
            .collect();
        Self {
            root: Transform::IDENTITY,
            bones,
        }
    }

    /// Flatten into persisted bone records
    pub fn to_records(&self) -> Vec<Bone> {
        self.bones
            .iter()
            .map(|bone| Bone {
                position: bone.transform.translation,
                rotation: bone.transform.rotation,
                weight: bone.weight,
            })
            .collect()
    }

    pub fn push(&mut self, name: impl Into<String>, transform: Transform) {
        self.bones.push(SkeletonBone {
            name: name.into(),
            transform,
            weight: 0.0,
        });
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SkeletonBone> {
        self.bones.get(index)
    }

    pub fn bones(&self) -> &[SkeletonBone] {
        &self.bones
    }

    pub fn root(&self) -> &Transform {
        &self.root
    }

    pub fn set_root(&mut self, root: Transform) {
        self.root = root;
    }

    /// World-space transform of a bone
    pub fn world_transform(&self, index: usize) -> Option<Transform> {
        self.bones.get(index).map(|bone| self.root.mul_transform(&bone.transform))
    }

    /// Replace a bone's creature-local transform, returning the previous one.
    ///
    /// Parts parented to the bone are not moved here; see
    /// [`crate::Creature::set_bone_transform`].
    pub fn set_bone_transform(&mut self, index: usize, transform: Transform) -> Option<Transform> {
        let bone = self.bones.get_mut(index)?;
        Some(std::mem::replace(&mut bone.transform, transform))
    }

    /// Whether a persisted `bone_index` addresses a bone of this skeleton
    pub fn is_valid_index(&self, bone_index: i32) -> bool {
        bone_index >= 0 && (bone_index as usize) < self.bones.len()
    }

    /// Index of the bone closest to a creature-local point
    pub fn nearest_bone(&self, point: Vec3) -> Option<usize> {
        self.bones
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let da = a.transform.translation.distance_squared(point);
                let db = b.transform.translation.distance_squared(point);
                da.total_cmp(&db)
            })
            .map(|(i, _)| i)
    }
}
