//! Pose, colour and weight edits. Every edit lands on both halves of a pair.

use creature_ipc::Notification;
use glam::{IVec3, Vec3};
use tracing::debug;

use crate::constructor::{BodyPartConstructor, ParentLink, PartState};
use crate::error::ConstructionError;
use crate::types::{Colour, PartId, Transformation};

use super::Creature;

impl Creature {
    fn require(&self, id: PartId, transformation: Transformation) -> Result<(), ConstructionError> {
        if self.part_ref(id)?.traits().allows(transformation) {
            Ok(())
        } else {
            Err(ConstructionError::TransformationNotAllowed {
                part: id,
                transformation: match transformation {
                    Transformation::Scale => "scale",
                    Transformation::Rotate => "rotate",
                    Transformation::Stretch => "stretch",
                    Transformation::Pivot => "pivot",
                },
            })
        }
    }

    /// Scale a pair, clamping each axis to the catalog limits. Returns the
    /// applied scale.
    pub fn set_scale(&mut self, id: PartId, scale: Vec3) -> Result<Vec3, ConstructionError> {
        self.require(id, Transformation::Scale)?;
        let (part, partner) = self.pair_mut(id)?;
        let traits = part.traits();
        let scale = scale.clamp(Vec3::splat(traits.min_scale), Vec3::splat(traits.max_scale));
        part.apply_scale(scale);
        partner.apply_scale(scale);

        self.notify(Notification::Scaled {
            part_id: id.0,
            scale: scale.to_array(),
        });
        Ok(scale)
    }

    /// Stretch a pair, clamping each axis to the configured range. Returns the
    /// applied stretch.
    pub fn set_stretch(&mut self, id: PartId, stretch: IVec3) -> Result<IVec3, ConstructionError> {
        self.require(id, Transformation::Stretch)?;
        let range = IVec3::from_array(self.config.stretch_range).abs();
        let stretch = stretch.clamp(-range, range);
        let (part, partner) = self.pair_mut(id)?;
        part.apply_stretch(stretch);
        partner.apply_stretch(stretch);

        self.notify(Notification::Stretched {
            part_id: id.0,
            stretch: stretch.to_array(),
        });
        Ok(stretch)
    }

    pub fn set_colours(&mut self, id: PartId, primary: Colour, secondary: Colour) -> Result<(), ConstructionError> {
        let (part, partner) = self.pair_mut(id)?;
        part.apply_colours(primary, secondary);
        partner.apply_colours(primary, secondary);
        self.notify(Notification::ColoursSet { part_id: id.0 });
        Ok(())
    }

    /// Copy both halves' live state into their records.
    pub fn update_attachment_configuration(&mut self, id: PartId) -> Result<(), ConstructionError> {
        let (part, partner) = self.pair_mut(id)?;
        part.update_attachment_configuration();
        partner.update_attachment_configuration();
        Ok(())
    }

    /// Set a limb bone's blend-shape weight on both halves.
    ///
    /// Returns the clamped weight, or `None` when the mesh has no blend
    /// shapes or `index` is past the last bone.
    pub fn set_weight(&mut self, id: PartId, index: usize, weight: f32) -> Result<Option<f32>, ConstructionError> {
        let (part, partner) = self.pair_mut(id)?;
        if part.limb.is_none() {
            return Err(ConstructionError::NotALimb(id));
        }
        let Some(weight) = part.apply_weight(index, weight) else {
            return Ok(None);
        };
        partner.apply_weight(index, weight);

        self.notify(Notification::WeightSet {
            part_id: id.0,
            index,
            weight,
        });
        Ok(Some(weight))
    }

    pub fn add_weight(&mut self, id: PartId, index: usize, delta: f32) -> Result<Option<f32>, ConstructionError> {
        let current = self
            .part_ref(id)?
            .limb()
            .ok_or(ConstructionError::NotALimb(id))?
            .weight(index)
            .unwrap_or_default();
        self.set_weight(id, index, current + delta)
    }

    pub fn remove_weight(&mut self, id: PartId, index: usize, delta: f32) -> Result<Option<f32>, ConstructionError> {
        self.add_weight(id, index, -delta)
    }

    /// Show or hide one instance. Limbs carry their extremity along.
    ///
    /// The mirror half of a part that cannot mirror always stays hidden.
    pub fn set_active(&mut self, id: PartId, active: bool) -> Result<(), ConstructionError> {
        let part = self.part_mut(id)?;
        let active = active && (!part.is_flipped() || part.traits().mirrors());
        let changed = part.active != active;
        part.active = active;
        let extremity = part.connected_extremity();

        if changed {
            self.notify(Notification::VisibilityChanged { part_id: id.0, active });
        }
        if let Some(extremity) = extremity {
            self.set_active(extremity, active)?;
        }
        Ok(())
    }

    /// Drag an interior limb bone to a creature-local position.
    ///
    /// The root bone (index 0) follows the limb root and cannot be moved
    /// directly.
    pub fn move_bone(&mut self, id: PartId, index: usize, position: Vec3) -> Result<(), ConstructionError> {
        let epsilon = self.config.mirror_epsilon;
        let part = self.part_mut(id)?;
        let rig = part.limb.as_mut().ok_or(ConstructionError::NotALimb(id))?;
        let count = rig.len();
        let bone = rig
            .bone_mut(index)
            .filter(|_| index > 0)
            .ok_or(ConstructionError::BoneOutOfRange { part: id, index, count })?;
        bone.translation = position;
        rig.realign(epsilon);

        self.flip(id)?;
        if self.part_ref(id)?.is_attached() {
            self.update_attachment_configuration(id)?;
        }
        Ok(())
    }

    /// Whether a part (and a limb's extremity) can be duplicated within budget
    pub fn can_copy(&mut self, id: PartId) -> Result<bool, ConstructionError> {
        let part = self.part_ref(id)?;
        let body_part_id = part.body_part_id().to_string();
        let (mut complexity, mut price) = (part.traits().complexity, part.traits().price);
        if let Some(extremity) = part.connected_extremity().and_then(|ext| self.part(ext)) {
            complexity += extremity.traits().complexity;
            price += extremity.traits().price;
        }
        Ok(self.check_budget(&body_part_id, complexity, price).is_ok())
    }

    /// Duplicate a placed pair for a copy-drag.
    ///
    /// The copy starts in the drag state at the source's pose. Returns `None`
    /// when the budget does not allow another copy.
    pub fn copy_part(&mut self, id: PartId) -> Result<Option<PartId>, ConstructionError> {
        let source = self.part_ref(id)?;
        if !source.is_attached() {
            return Err(ConstructionError::NotAttached(id));
        }
        let extremity = source.connected_extremity();
        if !self.can_copy(id)? {
            return Ok(None);
        }

        let copy = self.duplicate(id)?;
        if let Some(extremity) = extremity {
            let extremity_copy = self.duplicate(extremity)?;
            self.link_extremity(copy, extremity_copy)?;
        }
        self.part_mut(id)?.is_copied = true;

        debug!("Copied {:?} to {:?}", id, copy);
        self.notify(Notification::PartCopied {
            source_id: id.0,
            copy_id: copy.0,
        });
        self.notify_statistics();
        Ok(Some(copy))
    }

    fn duplicate(&mut self, id: PartId) -> Result<PartId, ConstructionError> {
        let source = self.part_ref(id)?.clone();
        let copy = self.add_pair(source.traits().clone());
        let epsilon = self.config.mirror_epsilon;

        let (part, partner) = self.pair_mut(copy)?;
        copy_pose(&source, part);
        part.mirror_onto(partner, epsilon);
        for part in [part, partner] {
            part.parent = ParentLink::Staging;
            part.interactable = false;
            part.set_state(PartState::Dragging);
        }
        Ok(copy)
    }
}

fn copy_pose(source: &BodyPartConstructor, target: &mut BodyPartConstructor) {
    target.transform = source.transform;
    target.nearest_bone = source.nearest_bone;
    target.apply_scale(source.transform.scale);
    target.apply_stretch(source.stretch);
    target.apply_colours(source.primary_colour, source.secondary_colour);
    if let Some(rig) = source.limb.as_ref() {
        target.limb = Some(rig.duplicate());
        for (i, weight) in rig.weights().iter().enumerate() {
            target.apply_weight(i, *weight);
        }
    }
}

#[cfg(test)]
mod tests {
    use creature_config::BuilderConfig;
    use glam::Quat;

    use super::super::tests::{attached, creature};
    use super::*;
    use crate::skeleton::Skeleton;

    #[test]
    fn test_mirror_symmetry_after_edits() {
        let mut creature = creature();
        let leg = attached(&mut creature, "leg", 1, Vec3::new(0.35, -0.1, 0.4));
        let mirror = creature.part(leg).unwrap().flipped();

        creature.set_stretch(leg, IVec3::new(1, 0, -1)).unwrap();
        creature.set_scale(leg, Vec3::splat(1.5)).unwrap();
        creature.set_colours(leg, Colour::rgb(1.0, 0.0, 0.0), Colour::rgb(0.0, 0.0, 1.0)).unwrap();
        creature.set_weight(leg, 0, 40.0).unwrap();
        creature.add_weight(leg, 2, 15.0).unwrap();
        creature.move_bone(leg, 1, Vec3::new(0.6, -0.3, 0.5)).unwrap();
        creature.part_mut(leg).unwrap().set_root_pose(Vec3::new(0.5, 0.0, 0.4), Quat::from_rotation_x(0.2));
        creature.flip(leg).unwrap();

        let main = creature.part(leg).unwrap();
        let flipped = creature.part(mirror).unwrap();
        assert_eq!(flipped.transform().translation.x, -main.transform().translation.x);
        assert_eq!(flipped.limb().unwrap().weights(), main.limb().unwrap().weights());
        assert_eq!(main.limb().unwrap().weights(), &[40.0, 0.0, 15.0]);
        assert_eq!(flipped.stretch(), main.stretch());
        assert_eq!(flipped.transform().scale, Vec3::splat(1.5));
        assert_eq!(flipped.colours(), main.colours());
        for (a, b) in main.limb().unwrap().bones().iter().zip(flipped.limb().unwrap().bones()) {
            assert!((a.translation.x + b.translation.x).abs() < 1e-6);
        }
    }

    #[test]
    fn test_set_scale_clamps_and_requires_flag() {
        let mut creature = creature();
        let eye = attached(&mut creature, "eye", 1, Vec3::X);
        assert_eq!(
            creature.set_scale(eye, Vec3::new(0.1, 1.0, 9.0)),
            Ok(Vec3::new(0.25, 1.0, 2.0))
        );

        let horn = attached(&mut creature, "horn", 1, Vec3::X);
        assert_eq!(
            creature.set_scale(horn, Vec3::ONE),
            Err(ConstructionError::TransformationNotAllowed {
                part: horn,
                transformation: "scale",
            })
        );
        assert!(matches!(
            creature.set_stretch(horn, IVec3::ONE),
            Err(ConstructionError::TransformationNotAllowed { transformation: "stretch", .. })
        ));
    }

    #[test]
    fn test_set_stretch_clamps_to_range() {
        let mut creature = creature();
        let eye = attached(&mut creature, "eye", 1, Vec3::X);
        assert_eq!(creature.set_stretch(eye, IVec3::new(3, -4, 0)), Ok(IVec3::new(1, -1, 0)));
        assert_eq!(creature.part(eye).unwrap().record().stretch, IVec3::new(1, -1, 0));
        assert!(creature
            .drain_notifications()
            .contains(&Notification::Stretched { part_id: eye.0, stretch: [1, -1, 0] }));
    }

    #[test]
    fn test_weight_clamping_reaches_record() {
        let mut creature = creature();
        let leg = attached(&mut creature, "leg", 0, Vec3::X);
        let mirror = creature.part(leg).unwrap().flipped();

        assert_eq!(creature.set_weight(leg, 1, -50.0), Ok(Some(0.0)));
        assert_eq!(creature.set_weight(leg, 1, 500.0), Ok(Some(100.0)));
        assert_eq!(creature.set_weight(leg, 7, 10.0), Ok(None));
        assert_eq!(creature.remove_weight(leg, 1, 30.0), Ok(Some(70.0)));

        for id in [leg, mirror] {
            let bones = creature.part(id).unwrap().record().bones().unwrap();
            assert_eq!(bones[1].weight, 70.0);
        }

        let eye = attached(&mut creature, "eye", 1, Vec3::X);
        assert_eq!(creature.set_weight(eye, 0, 1.0), Err(ConstructionError::NotALimb(eye)));
    }

    #[test]
    fn test_set_active_cascades_to_extremity() {
        let mut creature = creature();
        let leg = attached(&mut creature, "leg", 0, Vec3::X);
        let foot = attached(&mut creature, "foot", 0, Vec3::X);
        creature.connect_extremity(foot, leg).unwrap();
        let leg_mirror = creature.part(leg).unwrap().flipped();
        let foot_mirror = creature.part(foot).unwrap().flipped();

        creature.set_active(leg_mirror, false).unwrap();
        assert!(!creature.part(foot_mirror).unwrap().is_active());
        assert!(creature.part(foot).unwrap().is_active());

        creature.set_active(leg_mirror, true).unwrap();
        assert!(creature.part(foot_mirror).unwrap().is_active());
    }

    #[test]
    fn test_move_root_bone_rejected() {
        let mut creature = creature();
        let leg = attached(&mut creature, "leg", 0, Vec3::X);
        assert_eq!(
            creature.move_bone(leg, 0, Vec3::ZERO),
            Err(ConstructionError::BoneOutOfRange { part: leg, index: 0, count: 3 })
        );
        assert!(matches!(
            creature.move_bone(leg, 3, Vec3::ZERO),
            Err(ConstructionError::BoneOutOfRange { index: 3, .. })
        ));
    }

    #[test]
    fn test_copy_part_duplicates_limb_and_extremity() {
        let mut creature = creature();
        let leg = attached(&mut creature, "leg", 0, Vec3::new(0.4, 0.0, 0.0));
        let foot = attached(&mut creature, "foot", 0, Vec3::X);
        creature.connect_extremity(foot, leg).unwrap();
        creature.set_weight(leg, 1, 55.0).unwrap();

        let copy = creature.copy_part(leg).unwrap().unwrap();
        let part = creature.part(copy).unwrap();
        assert_eq!(part.state(), PartState::Dragging);
        assert_eq!(part.limb().unwrap().weights(), &[0.0, 55.0, 0.0]);
        assert_eq!(part.transform(), creature.part(leg).unwrap().transform());
        assert!(creature.part(leg).unwrap().is_copied());

        let foot_copy = part.connected_extremity().unwrap();
        assert_ne!(foot_copy, foot);
        assert_eq!(creature.part(foot_copy).unwrap().connected_limb(), Some(copy));
        assert_eq!(creature.part(leg).unwrap().connected_extremity(), Some(foot));
    }

    #[test]
    fn test_copy_refused_over_budget() {
        let mut creature = Creature::new("Tiny", Skeleton::spine(2, 0.5), BuilderConfig::with_budget(8, 1000));
        let leg = attached(&mut creature, "leg", 0, Vec3::X);
        creature.drain_notifications();

        assert_eq!(creature.copy_part(leg), Ok(None));
        assert!(creature
            .drain_notifications()
            .iter()
            .any(|n| matches!(n, Notification::BudgetWarning(_))));
    }
}
