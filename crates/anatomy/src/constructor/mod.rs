//! Per-instance body part construction state.
//!
//! A [`BodyPartConstructor`] owns one part's live pose and its persisted
//! [`AttachedBodyPart`] record. Operations that must keep a mirror pair in
//! lockstep live on [`crate::Creature`], which owns both halves; the methods
//! here only touch a single instance.

mod limb;

pub use limb::LimbRig;

use glam::{IVec3, Quat, Vec3};
use tracing::debug;

use crate::constants::NOT_ATTACHED;
use crate::error::ConstructionError;
use crate::mirror::{reflect_position, reflect_rotation, reflect_transform};
use crate::record::{AttachedBodyPart, PartRig};
use crate::skeleton::Transform;
use crate::types::{BodyPartKind, BodyPartTraits, Colour, PartId};

/// Attachment lifecycle of one instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartState {
    /// Created, never placed
    #[default]
    Unattached,
    /// Parented to a skeleton bone
    Attached,
    /// Staged under the drag parent, outside skeleton ownership
    Dragging,
    /// Removed from the skeleton; terminal for this instance
    Detached,
}

/// What a part's root transform is parented to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParentLink {
    #[default]
    None,
    /// Creature skeleton bone
    Bone(usize),
    /// Scratch parent used while dragging
    Staging,
}

/// Live state of one body part instance
#[derive(Debug, Clone)]
pub struct BodyPartConstructor {
    id: PartId,
    flipped: PartId,
    is_flipped: bool,
    traits: BodyPartTraits,
    record: AttachedBodyPart,
    state: PartState,
    pub(crate) parent: ParentLink,
    /// Creature-local pose of the part root
    pub(crate) transform: Transform,
    pub(crate) stretch: IVec3,
    pub(crate) primary_colour: Colour,
    pub(crate) secondary_colour: Colour,
    pub(crate) limb: Option<LimbRig>,
    /// Limb this extremity hangs from
    pub(crate) connected_limb: Option<PartId>,
    pub(crate) active: bool,
    pub(crate) interactable: bool,
    pub(crate) selected: bool,
    pub(crate) is_copied: bool,
    pub(crate) pressing: bool,
    pub(crate) nearest_bone: Option<usize>,
}

impl BodyPartConstructor {
    pub(crate) fn new(id: PartId, flipped: PartId, is_flipped: bool, traits: BodyPartTraits) -> Self {
        let (record, limb) = if traits.is_limb() {
            (
                AttachedBodyPart::new_limb(&traits.id, traits.bone_count),
                Some(LimbRig::new(traits.bone_count, traits.blend_shape_count)),
            )
        } else if traits.kind == BodyPartKind::Extremity {
            let mut record = AttachedBodyPart::new(&traits.id);
            record.rig = PartRig::Extremity { limb: None };
            (record, None)
        } else {
            (AttachedBodyPart::new(&traits.id), None)
        };

        Self {
            id,
            flipped,
            is_flipped,
            active: !is_flipped || traits.mirrors(),
            traits,
            record,
            state: PartState::Unattached,
            parent: ParentLink::None,
            transform: Transform::IDENTITY,
            stretch: IVec3::ZERO,
            primary_colour: Colour::WHITE,
            secondary_colour: Colour::BLACK,
            limb,
            connected_limb: None,
            interactable: true,
            selected: false,
            is_copied: false,
            pressing: false,
            nearest_bone: None,
        }
    }

    pub fn id(&self) -> PartId {
        self.id
    }

    /// Mirror partner
    pub fn flipped(&self) -> PartId {
        self.flipped
    }

    /// Whether this is the mirror half of its pair
    pub fn is_flipped(&self) -> bool {
        self.is_flipped
    }

    pub fn traits(&self) -> &BodyPartTraits {
        &self.traits
    }

    pub fn body_part_id(&self) -> &str {
        &self.traits.id
    }

    pub fn record(&self) -> &AttachedBodyPart {
        &self.record
    }

    pub fn state(&self) -> PartState {
        self.state
    }

    pub fn parent(&self) -> ParentLink {
        self.parent
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn stretch(&self) -> IVec3 {
        self.stretch
    }

    pub fn colours(&self) -> (Colour, Colour) {
        (self.primary_colour, self.secondary_colour)
    }

    pub fn limb(&self) -> Option<&LimbRig> {
        self.limb.as_ref()
    }

    pub fn connected_limb(&self) -> Option<PartId> {
        self.connected_limb
    }

    pub fn connected_extremity(&self) -> Option<PartId> {
        self.limb.as_ref().and_then(LimbRig::connected_extremity)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_interactable(&self) -> bool {
        self.interactable
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_copied(&self) -> bool {
        self.is_copied
    }

    pub fn is_attached(&self) -> bool {
        self.state == PartState::Attached
    }

    pub fn bone_index(&self) -> i32 {
        self.record.bone_index
    }

    pub(crate) fn set_state(&mut self, state: PartState) {
        if self.state != state {
            debug!("Part {:?} ({}): {:?} -> {:?}", self.id, self.traits.id, self.state, state);
            self.state = state;
        }
    }

    /// Bind a record without touching the skeleton.
    ///
    /// A limb given a record that was never placed gets a fresh limb record
    /// with one zeroed bone per rig joint.
    pub(crate) fn set_attached(&mut self, record: AttachedBodyPart) -> Result<(), ConstructionError> {
        if self.state == PartState::Attached {
            return Err(ConstructionError::AlreadyAttached(self.id));
        }
        self.record = match &self.limb {
            Some(rig) if record.bone_index == NOT_ATTACHED => {
                AttachedBodyPart::new_limb(record.body_part_id, rig.len())
            }
            _ => record,
        };
        Ok(())
    }

    /// Apply a validated record: pose, stretch, colours and limb bones.
    pub(crate) fn apply_record(&mut self, record: &AttachedBodyPart) {
        self.record = record.clone();
        self.parent = ParentLink::Bone(record.bone_index as usize);
        self.transform = Transform {
            translation: record.position,
            rotation: record.rotation,
            scale: record.scale,
        };
        self.stretch = record.stretch;
        self.primary_colour = record.primary_colour;
        self.secondary_colour = record.secondary_colour;

        if let (Some(rig), Some(bones)) = (self.limb.as_mut(), record.bones()) {
            rig.restore(bones);
            for (i, bone) in bones.iter().enumerate() {
                self.apply_weight(i, bone.weight);
            }
        }
        self.set_state(PartState::Attached);
    }

    /// Clear the attachment. Callers handle extremity cascades first.
    pub(crate) fn detach(&mut self) {
        self.record.bone_index = NOT_ATTACHED;
        self.parent = ParentLink::None;
        self.nearest_bone = None;
        self.set_state(PartState::Detached);
    }

    /// Move the root, carrying limb bones with it.
    pub(crate) fn set_root_pose(&mut self, translation: Vec3, rotation: Quat) {
        let target = Transform {
            translation,
            rotation,
            scale: self.transform.scale,
        };
        if let Some(rig) = self.limb.as_mut() {
            rig.carry(&self.transform, &target);
        }
        self.transform = target;
    }

    /// Store a clamped weight in the live rig and the record.
    pub(crate) fn apply_weight(&mut self, index: usize, weight: f32) -> Option<f32> {
        let weight = self.limb.as_mut()?.set_weight(index, weight)?;
        if let Some(bone) = self.record.bones_mut().and_then(|bones| bones.get_mut(index)) {
            bone.weight = weight;
        }
        Some(weight)
    }

    pub(crate) fn apply_colours(&mut self, primary: Colour, secondary: Colour) {
        self.primary_colour = primary;
        self.secondary_colour = secondary;
        self.record.primary_colour = primary;
        self.record.secondary_colour = secondary;
    }

    pub(crate) fn apply_scale(&mut self, scale: Vec3) {
        self.transform.scale = scale;
        self.record.scale = scale;
    }

    pub(crate) fn apply_stretch(&mut self, stretch: IVec3) {
        self.stretch = stretch;
        self.record.stretch = stretch;
    }

    /// Copy the live transform into the record (inverse of `apply_record`).
    pub(crate) fn update_attachment_configuration(&mut self) {
        if let ParentLink::Bone(index) = self.parent {
            self.record.bone_index = index as i32;
        }
        self.record.position = self.transform.translation;
        self.record.rotation = self.transform.rotation;
        self.record.scale = self.transform.scale;
        self.record.stretch = self.stretch;
        self.record.primary_colour = self.primary_colour;
        self.record.secondary_colour = self.secondary_colour;

        if let Some(rig) = &self.limb {
            if !matches!(self.record.rig, PartRig::Limb { .. }) {
                self.record.rig = PartRig::Limb { bones: Vec::new() };
            }
            if let Some(bones) = self.record.bones_mut() {
                bones.resize(rig.len(), Default::default());
                rig.write_records(bones);
            }
        }
    }

    /// Write this instance's state, reflected across the sagittal plane,
    /// into its partner.
    pub(crate) fn mirror_onto(&self, other: &mut BodyPartConstructor, epsilon: f32) {
        other.transform = reflect_transform(&self.transform);
        other.parent = self.parent;
        other.nearest_bone = self.nearest_bone;
        other.apply_stretch(self.stretch);
        other.apply_colours(self.primary_colour, self.secondary_colour);

        if let (Some(source), Some(target)) = (self.limb.as_ref(), other.limb.as_mut()) {
            for (i, bone) in source.bones().iter().enumerate() {
                if let Some(mirrored) = target.bone_mut(i) {
                    mirrored.translation = reflect_position(bone.translation);
                    mirrored.rotation = reflect_rotation(bone.rotation);
                }
            }
            target.realign(epsilon);
        }
        if let Some(source) = self.limb.as_ref() {
            for (i, weight) in source.weights().iter().enumerate() {
                other.apply_weight(i, *weight);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Bone;

    fn limb_part() -> BodyPartConstructor {
        BodyPartConstructor::new(PartId(0), PartId(1), false, BodyPartTraits::limb("leg", 10, 2, 3))
    }

    #[test]
    fn test_new_limb_has_limb_record() {
        let part = limb_part();
        assert_eq!(part.record().bones().map(<[Bone]>::len), Some(3));
        assert_eq!(part.limb().map(LimbRig::len), Some(3));
        assert_eq!(part.state(), PartState::Unattached);
    }

    #[test]
    fn test_set_attached_builds_empty_limb_record() {
        let mut part = limb_part();
        part.set_attached(AttachedBodyPart::new("leg")).unwrap();
        let bones = part.record().bones().unwrap();
        assert_eq!(bones.len(), 3);
        assert!(bones.iter().all(|b| b.weight == 0.0));
    }

    #[test]
    fn test_set_attached_rejects_attached_part() {
        let mut part = limb_part();
        let mut record = AttachedBodyPart::new_limb("leg", 3);
        record.bone_index = 0;
        part.apply_record(&record);
        assert_eq!(
            part.set_attached(AttachedBodyPart::new("leg")),
            Err(ConstructionError::AlreadyAttached(PartId(0)))
        );
    }

    #[test]
    fn test_update_configuration_inverts_apply() {
        let mut part = limb_part();
        let mut record = AttachedBodyPart::new_limb("leg", 3);
        record.bone_index = 2;
        record.position = Vec3::new(0.4, 0.1, -0.2);
        record.rotation = Quat::from_rotation_y(0.5);
        record.stretch = IVec3::new(1, 0, -1);
        if let Some(bones) = record.bones_mut() {
            for (i, bone) in bones.iter_mut().enumerate() {
                bone.position = Vec3::new(0.4, -(i as f32) * 0.3, 0.0);
                bone.weight = 10.0 * i as f32;
            }
        }

        part.apply_record(&record);
        part.update_attachment_configuration();
        assert_eq!(part.record(), &record);
    }

    #[test]
    fn test_mirror_onto_reflects_pose() {
        let mut main = limb_part();
        let mut mirror = BodyPartConstructor::new(PartId(1), PartId(0), true, BodyPartTraits::limb("leg", 10, 2, 3));
        main.set_root_pose(Vec3::new(0.5, 0.2, 0.0), Quat::from_rotation_z(0.3));
        main.apply_weight(1, 60.0);

        main.mirror_onto(&mut mirror, 1e-5);

        assert_eq!(mirror.transform().translation.x, -0.5);
        assert_eq!(mirror.limb().unwrap().weights(), main.limb().unwrap().weights());
        for (a, b) in main.limb().unwrap().bones().iter().zip(mirror.limb().unwrap().bones()) {
            assert!((a.translation.x + b.translation.x).abs() < 1e-6);
        }
    }
}
