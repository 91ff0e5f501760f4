//! Persisted creature configuration records.
//!
//! These types are the JSON save format. Poses are relative to the creature
//! root; a part's `bone_index` addresses the flattened creature skeleton.

use glam::{IVec3, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::constants::{CREATURE_DATA_VERSION, NOT_ATTACHED};
use crate::types::Colour;

/// One joint of a limb rig (or of the creature's own skeleton)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub position: Vec3,
    pub rotation: Quat,
    /// Blend-shape weight in `[0, 100]`
    pub weight: f32,
}

impl Default for Bone {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            weight: 0.0,
        }
    }
}

/// Rig payload of a body part record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PartRig {
    /// Rigid part with no bone chain
    #[default]
    Rigid,
    /// Jointed limb; one entry per rig bone
    Limb { bones: Vec<Bone> },
    /// Extremity; `limb` is the index of the limb record it hangs from
    Extremity {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limb: Option<usize>,
    },
}

/// Persisted description of one body part instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachedBodyPart {
    /// Catalog key
    pub body_part_id: String,
    /// Index into the creature skeleton; `-1` when not attached
    pub bone_index: i32,
    pub position: Vec3,
    pub rotation: Quat,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
    /// Integer-quantized per-axis stretch
    #[serde(default)]
    pub stretch: IVec3,
    pub primary_colour: Colour,
    pub secondary_colour: Colour,
    #[serde(default)]
    pub rig: PartRig,
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

impl AttachedBodyPart {
    /// Unattached rigid record for a catalog id
    pub fn new(body_part_id: impl Into<String>) -> Self {
        Self {
            body_part_id: body_part_id.into(),
            bone_index: NOT_ATTACHED,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            stretch: IVec3::ZERO,
            primary_colour: Colour::WHITE,
            secondary_colour: Colour::BLACK,
            rig: PartRig::Rigid,
        }
    }

    /// Unattached limb record with `bone_count` zero-initialized bones
    pub fn new_limb(body_part_id: impl Into<String>, bone_count: usize) -> Self {
        Self {
            rig: PartRig::Limb {
                bones: vec![Bone::default(); bone_count],
            },
            ..Self::new(body_part_id)
        }
    }

    pub fn is_attached(&self) -> bool {
        self.bone_index != NOT_ATTACHED
    }

    /// Limb bones, `None` for non-limb records
    pub fn bones(&self) -> Option<&[Bone]> {
        match &self.rig {
            PartRig::Limb { bones } => Some(bones),
            _ => None,
        }
    }

    pub fn bones_mut(&mut self) -> Option<&mut Vec<Bone>> {
        match &mut self.rig {
            PartRig::Limb { bones } => Some(bones),
            _ => None,
        }
    }
}

/// Top-level persisted creature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureData {
    /// Schema version; files written before versioning read as 0
    #[serde(default)]
    pub version: u32,
    pub name: String,
    pub primary_colour: Colour,
    pub secondary_colour: Colour,
    /// Pattern texture id; empty when no pattern is applied
    #[serde(default)]
    pub pattern_id: String,
    #[serde(default)]
    pub attached_body_parts: Vec<AttachedBodyPart>,
    /// The creature's own skeleton
    #[serde(default)]
    pub bones: Vec<Bone>,
}

impl Default for CreatureData {
    fn default() -> Self {
        Self {
            version: CREATURE_DATA_VERSION,
            name: String::new(),
            primary_colour: Colour::WHITE,
            secondary_colour: Colour::BLACK,
            pattern_id: String::new(),
            attached_body_parts: Vec::new(),
            bones: Vec::new(),
        }
    }
}

impl CreatureData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
