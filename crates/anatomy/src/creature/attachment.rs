//! Attach, detach and mirror operations on pairs, plus limb/extremity links.

use creature_ipc::Notification;
use tracing::debug;

use crate::constructor::{BodyPartConstructor, LimbRig, ParentLink, PartState};
use crate::error::ConstructionError;
use crate::record::AttachedBodyPart;
use crate::skeleton::Transform;
use crate::types::{BodyPartKind, PartId};

use super::Creature;

impl Creature {
    /// Bind a record to both halves of a pair without touching the skeleton.
    pub fn set_attached(&mut self, id: PartId, record: AttachedBodyPart) -> Result<(), ConstructionError> {
        let (part, partner) = self.pair_mut(id)?;
        part.set_attached(record.clone())?;
        partner.set_attached(record)
    }

    /// Parent a part to the skeleton bone named by `record` and mirror it.
    ///
    /// Returns `Ok(false)` without changing anything when `bone_index` does
    /// not address a bone of this creature.
    pub fn attach(&mut self, id: PartId, record: &AttachedBodyPart) -> Result<bool, ConstructionError> {
        let part = self.part_ref(id)?;
        if !self.skeleton.is_valid_index(record.bone_index) {
            debug!(
                "Not attaching {:?}: bone {} is not on the skeleton",
                id, record.bone_index
            );
            return Ok(false);
        }
        if let Some(rig) = part.limb() {
            let found = record.bones().map_or(0, <[_]>::len);
            if found != rig.len() {
                return Err(ConstructionError::RigMismatch {
                    body_part_id: record.body_part_id.clone(),
                    expected: rig.len(),
                    found,
                });
            }
        }

        let epsilon = self.config.mirror_epsilon;
        let (part, partner) = self.pair_mut(id)?;
        part.apply_record(record);
        part.mirror_onto(partner, epsilon);
        partner.set_state(PartState::Attached);
        partner.update_attachment_configuration();

        self.notify(Notification::Attached {
            part_id: id.0,
            bone_index: record.bone_index,
        });
        self.notify_statistics();
        Ok(true)
    }

    /// Remove a placed part from the skeleton, together with its partner.
    ///
    /// A limb detaches its connected extremity first. Detaching a part that
    /// is not placed is an error.
    pub fn detach(&mut self, id: PartId) -> Result<(), ConstructionError> {
        let part = self.part_ref(id)?;
        if !matches!(part.state(), PartState::Attached | PartState::Dragging) {
            return Err(ConstructionError::NotAttached(id));
        }

        if let Some(extremity) = part.connected_extremity() {
            let placed = self
                .part(extremity)
                .is_some_and(|ext| matches!(ext.state(), PartState::Attached | PartState::Dragging));
            if placed {
                self.detach(extremity)?;
            }
        }
        self.unlink(id)?;

        let (part, partner) = self.pair_mut(id)?;
        part.detach();
        partner.detach();

        self.notify(Notification::Detached { part_id: id.0 });
        self.notify_statistics();
        Ok(())
    }

    /// Reflect a part's live pose onto its partner.
    ///
    /// A limb's connected extremity is moved to the terminal bone and flipped
    /// as well.
    pub fn flip(&mut self, id: PartId) -> Result<(), ConstructionError> {
        let epsilon = self.config.mirror_epsilon;
        let (part, partner) = self.pair_mut(id)?;
        part.mirror_onto(partner, epsilon);
        if partner.is_attached() {
            partner.update_attachment_configuration();
        }
        self.sync_extremity(id)
    }

    /// Hang an extremity from a limb's terminal bone, on both sides.
    pub fn connect_extremity(&mut self, extremity: PartId, limb: PartId) -> Result<(), ConstructionError> {
        if self.part_ref(extremity)?.traits().kind != BodyPartKind::Extremity {
            return Err(ConstructionError::NotAnExtremity(extremity));
        }
        if let Some(previous) = self.part_ref(limb)?.connected_extremity() {
            if previous == extremity {
                return Ok(());
            }
            self.unlink(previous)?;
        }
        if self.part_ref(extremity)?.connected_limb().is_some() {
            self.unlink(extremity)?;
        }

        self.link_extremity(limb, extremity)?;
        self.sync_extremity(limb)
    }

    /// Record the limb/extremity link on both halves of both pairs.
    pub(crate) fn link_extremity(&mut self, limb: PartId, extremity: PartId) -> Result<(), ConstructionError> {
        let limb_partner = self.part_ref(limb)?.flipped();
        let extremity_partner = self.part_ref(extremity)?.flipped();

        for (limb, extremity) in [(limb, extremity), (limb_partner, extremity_partner)] {
            self.part_mut(limb)?
                .limb
                .as_mut()
                .ok_or(ConstructionError::NotALimb(limb))?
                .connected_extremity = Some(extremity);
            self.part_mut(extremity)?.connected_limb = Some(limb);
        }
        debug!("Connected {:?} to limb {:?}", extremity, limb);
        Ok(())
    }

    /// Clear every limb/extremity link touching either half of a pair.
    pub(crate) fn unlink(&mut self, id: PartId) -> Result<(), ConstructionError> {
        let flipped = self.part_ref(id)?.flipped();
        for id in [id, flipped] {
            let part = self.part_mut(id)?;
            let extremity = part.limb.as_mut().and_then(|rig| rig.connected_extremity.take());
            let limb = part.connected_limb.take();

            if let Some(extremity) = extremity {
                if let Ok(extremity) = self.part_mut(extremity) {
                    extremity.connected_limb = None;
                }
            }
            if let Some(limb) = limb {
                if let Some(rig) = self.part_mut(limb).ok().and_then(|limb| limb.limb.as_mut()) {
                    rig.connected_extremity = None;
                }
            }
        }
        Ok(())
    }

    /// Move a limb's extremity onto its terminal bone and mirror it.
    pub(crate) fn sync_extremity(&mut self, limb: PartId) -> Result<(), ConstructionError> {
        let part = self.part_ref(limb)?;
        let (Some(extremity), Some(terminal)) = (
            part.connected_extremity(),
            part.limb().and_then(LimbRig::terminal_bone).copied(),
        ) else {
            return Ok(());
        };

        let epsilon = self.config.mirror_epsilon;
        let (ext, partner) = self.pair_mut(extremity)?;
        let rotation = ext.transform.rotation;
        ext.set_root_pose(terminal.translation, rotation);
        ext.mirror_onto(partner, epsilon);
        if ext.is_attached() {
            ext.update_attachment_configuration();
            partner.update_attachment_configuration();
        }
        Ok(())
    }

    /// Reparent a pair (and its extremity) under the drag staging parent.
    ///
    /// Nothing changes unless every part involved can be staged.
    pub(crate) fn stage(&mut self, id: PartId) -> Result<(), ConstructionError> {
        let mut staged = vec![id];
        staged.extend(self.part_ref(id)?.connected_extremity());
        for &id in &staged {
            if self.part_ref(id)?.state() == PartState::Dragging {
                return Err(ConstructionError::AlreadyDragging(id));
            }
        }

        for id in staged {
            let (part, partner) = self.pair_mut(id)?;
            for part in [part, partner] {
                part.parent = ParentLink::Staging;
                part.interactable = false;
                part.set_state(PartState::Dragging);
            }
        }
        Ok(())
    }

    /// Parent a dragged pair (and its extremity) to a skeleton bone.
    pub(crate) fn settle(&mut self, id: PartId, bone: usize) -> Result<(), ConstructionError> {
        let extremity = self.part_ref(id)?.connected_extremity();
        let (part, partner) = self.pair_mut(id)?;
        for part in [part, partner] {
            part.parent = ParentLink::Bone(bone);
            part.interactable = true;
            part.set_state(PartState::Attached);
            part.update_attachment_configuration();
        }
        if let Some(extremity) = extremity {
            self.settle(extremity, bone)?;
        }
        Ok(())
    }

    /// Move a skeleton bone, carrying the parts parented to it.
    ///
    /// Main instances keep their pose relative to the bone. Mirror halves and
    /// connected extremities are re-derived from them.
    pub fn set_bone_transform(&mut self, bone: usize, transform: Transform) -> Result<(), ConstructionError> {
        let previous = self
            .skeleton
            .set_bone_transform(bone, transform)
            .ok_or(ConstructionError::UnknownBone(bone))?;

        let carried: Vec<PartId> = self
            .parts()
            .filter(|part| {
                !part.is_flipped() && part.parent() == ParentLink::Bone(bone) && part.connected_limb().is_none()
            })
            .map(BodyPartConstructor::id)
            .collect();

        for &id in &carried {
            let part = self.part_mut(id)?;
            let pose = transform.mul_transform(&previous.relative(&part.transform));
            part.set_root_pose(pose.translation, pose.rotation);
            if part.is_attached() {
                part.update_attachment_configuration();
            }
            self.flip(id)?;
        }
        debug!("Moved bone {} carrying {} body parts", bone, carried.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};

    use super::super::tests::{attached, catalog, creature};
    use super::*;
    use crate::mirror::reflect_rotation;

    #[test]
    fn test_attach_invalid_bone_is_noop() {
        let mut creature = creature();
        let id = creature.add_body_part(&catalog(), "eye").unwrap();
        let before_record = creature.part(id).unwrap().record().clone();
        let before_skeleton = creature.skeleton().clone();
        creature.drain_notifications();

        for bone in [-1, 4, 99] {
            let mut record = AttachedBodyPart::new("eye");
            record.bone_index = bone;
            record.position = Vec3::ONE;
            assert_eq!(creature.attach(id, &record), Ok(false));
        }

        let part = creature.part(id).unwrap();
        assert_eq!(part.record(), &before_record);
        assert_eq!(part.state(), PartState::Unattached);
        assert_eq!(creature.skeleton(), &before_skeleton);
        assert!(creature.drain_notifications().is_empty());
    }

    #[test]
    fn test_attach_mirrors_partner() {
        let mut creature = creature();
        let id = creature.add_body_part(&catalog(), "eye").unwrap();
        let mut record = AttachedBodyPart::new("eye");
        record.bone_index = 2;
        record.position = Vec3::new(0.3, 0.4, 1.0);
        record.rotation = Quat::from_rotation_y(0.7);

        assert_eq!(creature.attach(id, &record), Ok(true));

        let part = creature.part(id).unwrap();
        let mirror = creature.part(part.flipped()).unwrap();
        assert_eq!(part.bone_index(), 2);
        assert_eq!(mirror.bone_index(), 2);
        assert_eq!(mirror.parent(), ParentLink::Bone(2));
        assert_eq!(mirror.record().position, Vec3::new(-0.3, 0.4, 1.0));
        assert_eq!(mirror.record().rotation, reflect_rotation(record.rotation));
        assert!(mirror.is_attached());
    }

    #[test]
    fn test_attach_rejects_wrong_bone_count() {
        let mut creature = creature();
        let id = creature.add_body_part(&catalog(), "leg").unwrap();
        let mut record = AttachedBodyPart::new_limb("leg", 5);
        record.bone_index = 0;
        assert_eq!(
            creature.attach(id, &record),
            Err(ConstructionError::RigMismatch {
                body_part_id: "leg".to_string(),
                expected: 3,
                found: 5,
            })
        );
        assert_eq!(creature.part(id).unwrap().state(), PartState::Unattached);
    }

    #[test]
    fn test_set_attached_twice_fails() {
        let mut creature = creature();
        let id = attached(&mut creature, "eye", 1, Vec3::X);
        assert_eq!(
            creature.set_attached(id, AttachedBodyPart::new("eye")),
            Err(ConstructionError::AlreadyAttached(id))
        );
    }

    #[test]
    fn test_detach_cascades_to_extremity() {
        let mut creature = creature();
        let leg = attached(&mut creature, "leg", 0, Vec3::new(0.4, 0.0, 0.2));
        let foot = attached(&mut creature, "foot", 0, Vec3::new(0.4, -0.5, 0.2));
        creature.connect_extremity(foot, leg).unwrap();

        let leg_mirror = creature.part(leg).unwrap().flipped();
        let foot_mirror = creature.part(foot).unwrap().flipped();
        assert_eq!(creature.part(leg).unwrap().connected_extremity(), Some(foot));
        assert_eq!(creature.part(leg_mirror).unwrap().connected_extremity(), Some(foot_mirror));

        creature.detach(leg).unwrap();

        for id in [leg, leg_mirror, foot, foot_mirror] {
            let part = creature.part(id).unwrap();
            assert_eq!(part.bone_index(), -1, "{id:?}");
            assert_eq!(part.state(), PartState::Detached);
        }
        assert_eq!(creature.part(leg).unwrap().connected_extremity(), None);
        assert_eq!(creature.part(leg_mirror).unwrap().connected_extremity(), None);
        assert_eq!(creature.part(foot).unwrap().connected_limb(), None);
    }

    #[test]
    fn test_double_detach_is_an_error() {
        let mut creature = creature();
        let id = attached(&mut creature, "eye", 1, Vec3::X);
        creature.detach(id).unwrap();
        assert_eq!(creature.detach(id), Err(ConstructionError::NotAttached(id)));

        let unplaced = creature.add_body_part(&catalog(), "eye").unwrap();
        assert_eq!(creature.detach(unplaced), Err(ConstructionError::NotAttached(unplaced)));
    }

    #[test]
    fn test_connect_extremity_places_at_terminal_bone() {
        let mut creature = creature();
        let leg = attached(&mut creature, "leg", 0, Vec3::new(0.4, 0.0, 0.2));
        let foot = attached(&mut creature, "foot", 0, Vec3::ZERO);
        creature.connect_extremity(foot, leg).unwrap();

        let terminal = *creature.part(leg).unwrap().limb().unwrap().terminal_bone().unwrap();
        let foot_part = creature.part(foot).unwrap();
        assert!(foot_part.transform().translation.distance(terminal.translation) < 1e-6);
        assert!(foot_part.record().position.distance(terminal.translation) < 1e-6);

        let mirror = creature.part(foot_part.flipped()).unwrap();
        assert!((mirror.transform().translation.x + terminal.translation.x).abs() < 1e-6);
    }

    #[test]
    fn test_connect_requires_extremity_and_limb() {
        let mut creature = creature();
        let leg = attached(&mut creature, "leg", 0, Vec3::X);
        let eye = attached(&mut creature, "eye", 1, Vec3::X);
        let foot = attached(&mut creature, "foot", 1, Vec3::X);

        assert_eq!(creature.connect_extremity(eye, leg), Err(ConstructionError::NotAnExtremity(eye)));
        assert_eq!(creature.connect_extremity(foot, eye), Err(ConstructionError::NotALimb(eye)));
    }

    #[test]
    fn test_flip_reflects_limb_bones() {
        let mut creature = creature();
        let leg = attached(&mut creature, "leg", 0, Vec3::new(0.5, 0.1, 0.0));
        let mirror = creature.part(leg).unwrap().flipped();

        creature.part_mut(leg).unwrap().set_root_pose(Vec3::new(0.6, 0.0, 0.3), Quat::from_rotation_z(-0.4));
        creature.flip(leg).unwrap();

        let main_bones = creature.part(leg).unwrap().limb().unwrap().bones().to_vec();
        let mirror_rig = creature.part(mirror).unwrap().limb().unwrap();
        for (a, b) in main_bones.iter().zip(mirror_rig.bones()) {
            assert!((a.translation.x + b.translation.x).abs() < 1e-6);
            assert!((a.translation.y - b.translation.y).abs() < 1e-6);
        }
        let n = mirror_rig.len();
        assert_eq!(mirror_rig.bones()[n - 1].rotation, mirror_rig.bones()[n - 2].rotation);
        assert_eq!(creature.part(mirror).unwrap().record().position.x, -0.6);
    }

    #[test]
    fn test_stage_conflict_leaves_limb_untouched() {
        let mut creature = creature();
        let leg = attached(&mut creature, "leg", 0, Vec3::new(0.4, 0.0, 0.2));
        let foot = attached(&mut creature, "foot", 0, Vec3::ZERO);
        creature.connect_extremity(foot, leg).unwrap();
        let leg_mirror = creature.part(leg).unwrap().flipped();

        creature.stage(foot).unwrap();
        assert_eq!(creature.stage(leg), Err(ConstructionError::AlreadyDragging(foot)));

        for id in [leg, leg_mirror] {
            let part = creature.part(id).unwrap();
            assert_eq!(part.state(), PartState::Attached, "{id:?}");
            assert_eq!(part.parent(), ParentLink::Bone(0));
            assert!(part.is_interactable());
        }
    }

    #[test]
    fn test_bone_move_carries_attached_parts() {
        let mut creature = creature();
        let eye = attached(&mut creature, "eye", 2, Vec3::new(0.3, 0.0, 1.1));
        let horn = attached(&mut creature, "horn", 1, Vec3::new(0.1, 0.2, 0.5));
        let leg = attached(&mut creature, "leg", 2, Vec3::new(0.4, 0.0, 1.0));
        let foot = attached(&mut creature, "foot", 2, Vec3::ZERO);
        creature.connect_extremity(foot, leg).unwrap();
        let leg_before = creature.part(leg).unwrap().limb().unwrap().bones().to_vec();

        let lifted = Transform::from_translation(Vec3::new(0.0, 0.5, 1.0));
        creature.set_bone_transform(2, lifted).unwrap();

        let part = creature.part(eye).unwrap();
        assert!(part.transform().translation.distance(Vec3::new(0.3, 0.5, 1.1)) < 1e-6);
        assert!(part.record().position.distance(Vec3::new(0.3, 0.5, 1.1)) < 1e-6);
        let mirror = creature.part(part.flipped()).unwrap();
        assert!(mirror.record().position.distance(Vec3::new(-0.3, 0.5, 1.1)) < 1e-6);

        assert_eq!(creature.part(horn).unwrap().record().position, Vec3::new(0.1, 0.2, 0.5));

        let rig = creature.part(leg).unwrap().limb().unwrap();
        for (before, after) in leg_before.iter().zip(rig.bones()) {
            assert!((after.translation - before.translation).distance(Vec3::new(0.0, 0.5, 0.0)) < 1e-5);
        }
        let terminal = rig.terminal_bone().unwrap().translation;
        assert!(creature.part(foot).unwrap().transform().translation.distance(terminal) < 1e-6);

        assert_eq!(
            creature.set_bone_transform(9, lifted),
            Err(ConstructionError::UnknownBone(9))
        );
    }

    #[test]
    fn test_bone_rotation_keeps_relative_pose() {
        let mut creature = creature();
        let eye = attached(&mut creature, "eye", 2, Vec3::new(0.3, 0.0, 1.1));

        let turn = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        creature
            .set_bone_transform(2, Transform::from_translation_rotation(Vec3::new(0.0, 0.0, 1.0), turn))
            .unwrap();

        let part = creature.part(eye).unwrap();
        assert!(part.transform().translation.distance(Vec3::new(0.1, 0.0, 0.7)) < 1e-5);
        assert!(part.transform().rotation.angle_between(turn) < 1e-4);
    }
}
