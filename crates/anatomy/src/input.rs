//! Routing of host input events to body parts.
//!
//! The host performs the raycasts and picks a target with
//! [`Creature::resolve_target`]; each event is then handled by a single
//! [`Creature::handle_input`] call. Surface hits are creature-local.

use creature_ipc::{Notification, PartInput, SurfaceHit, UiToBuilder};
use glam::Vec3;
use tracing::{debug, warn};

use crate::constructor::PartState;
use crate::creature::Creature;
use crate::error::ConstructionError;
use crate::mirror::look_rotation;
use crate::serialization::sanitize_name;
use crate::types::{Colour, PartId, Transformation};

/// What an input event did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Handled,
    /// Nothing to do for this part
    Ignored,
    /// A copy-drag started; further drag events go to the copy
    Copied(PartId),
    /// A drag ended on the skeleton
    Attached { bone: usize },
    /// A drag ended off the creature and the pair was removed
    Destroyed,
}

impl Creature {
    /// Apply one input event to a part.
    pub fn handle_input(&mut self, id: PartId, input: PartInput) -> Result<InputOutcome, ConstructionError> {
        match input {
            PartInput::Press => {
                self.part_mut(id)?.pressing = true;
                Ok(InputOutcome::Handled)
            }
            PartInput::Release => {
                let part = self.part_mut(id)?;
                part.pressing = false;
                part.is_copied = false;
                Ok(InputOutcome::Handled)
            }
            PartInput::BeginDrag { copy } => self.begin_drag(id, copy),
            PartInput::Drag { hit } => {
                self.require_dragging(id)?;
                self.drag(id, hit)?;
                Ok(InputOutcome::Handled)
            }
            PartInput::EndDrag { hit } => self.end_drag(id, hit),
            PartInput::Scroll { up } => self.scroll(id, up),
            PartInput::ScrollBone { index, up } => {
                let step = self.signed_step(up);
                self.add_weight(id, index, step)?;
                Ok(InputOutcome::Handled)
            }
            PartInput::DragBone { index, position } => {
                self.move_bone(id, index, Vec3::from_array(position))?;
                Ok(InputOutcome::Handled)
            }
            PartInput::ReleaseBone { index } => {
                let count = self.part_ref(id)?.limb().ok_or(ConstructionError::NotALimb(id))?.len();
                if index >= count {
                    return Err(ConstructionError::BoneOutOfRange { part: id, index, count });
                }
                self.update_attachment_configuration(id)?;
                Ok(InputOutcome::Handled)
            }
            PartInput::Select { selected } => {
                self.part_mut(id)?.selected = selected;
                Ok(InputOutcome::Handled)
            }
        }
    }

    /// Pick the part an event applies to from raycast candidates
    /// `(part, distance)`: a selected part wins, otherwise the nearest.
    ///
    /// Hidden, non-interactable and removed parts are skipped.
    pub fn resolve_target(&self, candidates: &[(PartId, f32)]) -> Option<PartId> {
        candidates
            .iter()
            .filter_map(|&(id, distance)| Some((self.part(id)?, distance)))
            .filter(|(part, _)| part.is_active() && part.is_interactable())
            .min_by(|(a, da), (b, db)| b.is_selected().cmp(&a.is_selected()).then(da.total_cmp(db)))
            .map(|(part, _)| part.id())
    }

    /// Apply a UI command.
    pub fn apply_command(&mut self, command: UiToBuilder) -> Result<InputOutcome, ConstructionError> {
        match command {
            UiToBuilder::PartInput { part_id, input } => self.handle_input(PartId(part_id), input),
            UiToBuilder::SetColours {
                part_id: Some(part_id),
                primary,
                secondary,
            } => {
                self.set_colours(PartId(part_id), Colour::from(primary), Colour::from(secondary))?;
                Ok(InputOutcome::Handled)
            }
            UiToBuilder::SetColours {
                part_id: None,
                primary,
                secondary,
            } => {
                self.set_body_colours(Colour::from(primary), Colour::from(secondary));
                Ok(InputOutcome::Handled)
            }
            UiToBuilder::SetPattern { pattern_id } => {
                self.set_pattern(pattern_id);
                Ok(InputOutcome::Handled)
            }
            UiToBuilder::SetName { name } => match sanitize_name(&name) {
                Ok(name) => {
                    self.set_name(name);
                    Ok(InputOutcome::Handled)
                }
                Err(e) => {
                    warn!("Ignoring rename: {}", e);
                    Ok(InputOutcome::Ignored)
                }
            },
            UiToBuilder::Clear => {
                self.clear();
                Ok(InputOutcome::Handled)
            }
        }
    }

    fn signed_step(&self, up: bool) -> f32 {
        if up {
            self.config().weight_step
        } else {
            -self.config().weight_step
        }
    }

    fn require_dragging(&self, id: PartId) -> Result<(), ConstructionError> {
        if self.part_ref(id)?.state() == PartState::Dragging {
            Ok(())
        } else {
            Err(ConstructionError::NotDragging(id))
        }
    }

    fn begin_drag(&mut self, id: PartId, copy: bool) -> Result<InputOutcome, ConstructionError> {
        let part = self.part_ref(id)?;
        match part.state() {
            PartState::Dragging => return Err(ConstructionError::AlreadyDragging(id)),
            PartState::Detached => return Err(ConstructionError::NotAttached(id)),
            PartState::Attached if copy && !part.is_copied() => {
                return Ok(match self.copy_part(id)? {
                    Some(copy) => InputOutcome::Copied(copy),
                    None => InputOutcome::Ignored,
                });
            }
            PartState::Attached | PartState::Unattached => {}
        }
        self.stage(id)?;
        // An extremity pulled off its limb no longer follows it
        if self.part_ref(id)?.connected_limb().is_some() {
            self.unlink(id)?;
            debug!("Disconnected {:?} from its limb", id);
        }
        debug!("Dragging {:?}", id);
        Ok(InputOutcome::Handled)
    }

    /// Pose a dragged part on the surface and mirror it, or hide the partner
    /// when the pointer is off the creature.
    fn drag(&mut self, id: PartId, hit: Option<SurfaceHit>) -> Result<(), ConstructionError> {
        let flipped = self.part_ref(id)?.flipped();
        let Some(hit) = hit else {
            return self.set_active(flipped, false);
        };

        let epsilon = self.config().mirror_epsilon;
        let point = Vec3::from_array(hit.point);
        let normal = Vec3::from_array(hit.normal);
        let nearest = self.skeleton().nearest_bone(point);

        let part = self.part_mut(id)?;
        let rotation = look_rotation(normal, Vec3::Y, epsilon)
            .or_else(|| look_rotation(normal, Vec3::Z, epsilon))
            .unwrap_or(part.transform.rotation);
        part.set_root_pose(point, rotation);
        part.nearest_bone = nearest;

        self.flip(id)?;
        self.set_active(flipped, true)
    }

    fn end_drag(&mut self, id: PartId, hit: Option<SurfaceHit>) -> Result<InputOutcome, ConstructionError> {
        self.require_dragging(id)?;
        if hit.is_some() {
            self.drag(id, hit)?;
        }

        let Some(bone) = hit.and_then(|_| self.part_ref(id).ok()?.nearest_bone) else {
            debug!("Drag of {:?} ended off the creature", id);
            self.remove_body_part(id)?;
            return Ok(InputOutcome::Destroyed);
        };

        self.settle(id, bone)?;
        self.notify(Notification::Attached {
            part_id: id.0,
            bone_index: bone as i32,
        });
        self.notify_statistics();
        Ok(InputOutcome::Attached { bone })
    }

    fn scroll(&mut self, id: PartId, up: bool) -> Result<InputOutcome, ConstructionError> {
        let part = self.part_ref(id)?;
        if part.limb().is_some() {
            let step = self.signed_step(up);
            self.add_weight(id, 0, step)?;
            return Ok(InputOutcome::Handled);
        }
        if !part.traits().allows(Transformation::Scale) {
            return Ok(InputOutcome::Ignored);
        }
        let increment = if up {
            part.traits().scale_increment
        } else {
            -part.traits().scale_increment
        };
        let scale = part.transform().scale + Vec3::splat(increment);
        self.set_scale(id, scale)?;
        Ok(InputOutcome::Handled)
    }
}
