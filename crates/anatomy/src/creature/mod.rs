//! The creature being built: skeleton, part arena and mirror pairs.
//!
//! Parts live in an arena of `Option<BodyPartConstructor>` slots addressed by
//! [`PartId`]. A mirror pair occupies two slots that name each other through
//! [`BodyPartConstructor::flipped`]; removing a pair empties both slots, so ids
//! are never reused within one build session.

mod attachment;
mod editing;
mod persistence;

use creature_config::BuilderConfig;
use creature_ipc::{CreatureStatistics, Notification};
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::constructor::{BodyPartConstructor, PartState};
use crate::error::ConstructionError;
use crate::skeleton::{Skeleton, Transform};
use crate::types::{BodyPartTraits, Colour, PartId};
use crate::validation::AddCheck;

/// A creature under construction
#[derive(Debug, Clone)]
pub struct Creature {
    name: String,
    skeleton: Skeleton,
    primary_colour: Colour,
    secondary_colour: Colour,
    pattern_id: String,
    parts: Vec<Option<BodyPartConstructor>>,
    /// Every limb instance, main and mirror, in creation order
    limbs: Vec<PartId>,
    config: BuilderConfig,
    notifications: Vec<Notification>,
}

impl Creature {
    pub fn new(name: impl Into<String>, skeleton: Skeleton, config: BuilderConfig) -> Self {
        Self {
            name: name.into(),
            skeleton,
            primary_colour: Colour::WHITE,
            secondary_colour: Colour::BLACK,
            pattern_id: String::new(),
            parts: Vec::new(),
            limbs: Vec::new(),
            config,
            notifications: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn colours(&self) -> (Colour, Colour) {
        (self.primary_colour, self.secondary_colour)
    }

    /// Paint the creature body itself
    pub fn set_body_colours(&mut self, primary: Colour, secondary: Colour) {
        self.primary_colour = primary;
        self.secondary_colour = secondary;
    }

    pub fn pattern_id(&self) -> &str {
        &self.pattern_id
    }

    pub fn set_pattern(&mut self, pattern_id: impl Into<String>) {
        self.pattern_id = pattern_id.into();
    }

    pub fn part(&self, id: PartId) -> Option<&BodyPartConstructor> {
        self.parts.get(id.index()).and_then(Option::as_ref)
    }

    /// World-space pose of a part's root, for the renderer
    pub fn world_transform(&self, id: PartId) -> Option<Transform> {
        self.part(id).map(|part| self.skeleton.root().mul_transform(part.transform()))
    }

    /// Place the creature in the world. Part poses are creature-local and
    /// do not change.
    pub fn set_root(&mut self, root: Transform) {
        self.skeleton.set_root(root);
    }

    /// Live parts in arena order, both halves of every pair
    pub fn parts(&self) -> impl Iterator<Item = &BodyPartConstructor> {
        self.parts.iter().flatten()
    }

    /// Limb instances, for systems that drive limbs directly (IK, gait)
    pub fn limbs(&self) -> &[PartId] {
        &self.limbs
    }

    /// Take every notification emitted since the last drain
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub(crate) fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    pub(crate) fn notify_statistics(&mut self) {
        let statistics = self.statistics();
        self.notify(Notification::StatisticsUpdated(statistics));
    }

    pub(crate) fn part_mut(&mut self, id: PartId) -> Result<&mut BodyPartConstructor, ConstructionError> {
        self.parts
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(ConstructionError::UnknownPart(id))
    }

    pub(crate) fn part_ref(&self, id: PartId) -> Result<&BodyPartConstructor, ConstructionError> {
        self.part(id).ok_or(ConstructionError::UnknownPart(id))
    }

    /// Borrow a part and its mirror partner together
    pub(crate) fn pair_mut(
        &mut self,
        id: PartId,
    ) -> Result<(&mut BodyPartConstructor, &mut BodyPartConstructor), ConstructionError> {
        let flipped = self.part_ref(id)?.flipped();
        let (a, b) = (id.index(), flipped.index());
        if a == b || b >= self.parts.len() {
            return Err(ConstructionError::UnknownPart(flipped));
        }

        let (part, partner) = if a < b {
            let (left, right) = self.parts.split_at_mut(b);
            (&mut left[a], &mut right[0])
        } else {
            let (left, right) = self.parts.split_at_mut(a);
            (&mut right[0], &mut left[b])
        };
        match (part.as_mut(), partner.as_mut()) {
            (Some(part), Some(partner)) => Ok((part, partner)),
            _ => Err(ConstructionError::UnknownPart(flipped)),
        }
    }

    /// Register a new mirror pair for a catalog entry. Returns the main instance.
    pub fn add_body_part(&mut self, catalog: &impl Catalog, body_part_id: &str) -> Result<PartId, ConstructionError> {
        let traits = catalog
            .traits(body_part_id)
            .ok_or_else(|| ConstructionError::UnknownBodyPart(body_part_id.to_string()))?;
        Ok(self.add_pair(traits.clone()))
    }

    pub(crate) fn add_pair(&mut self, traits: BodyPartTraits) -> PartId {
        let main = PartId(self.parts.len() as u32);
        let mirror = PartId(main.0 + 1);
        let body_part_id = traits.id.clone();

        if traits.is_limb() {
            self.limbs.extend([main, mirror]);
        }
        self.parts.push(Some(BodyPartConstructor::new(main, mirror, false, traits.clone())));
        self.parts.push(Some(BodyPartConstructor::new(mirror, main, true, traits)));

        debug!("Added '{}' as {:?}/{:?}", body_part_id, main, mirror);
        self.notify(Notification::PartAdded {
            part_id: main.0,
            flipped_id: mirror.0,
            body_part_id,
        });
        main
    }

    /// Remove a pair from the creature, detaching it first when placed.
    ///
    /// A limb takes its connected extremity with it.
    pub fn remove_body_part(&mut self, id: PartId) -> Result<(), ConstructionError> {
        let part = self.part_ref(id)?;
        let flipped = part.flipped();
        let extremity = part.connected_extremity();
        let placed = matches!(part.state(), PartState::Attached | PartState::Dragging);

        if placed {
            self.detach(id)?;
        } else {
            self.unlink(id)?;
        }
        if let Some(extremity) = extremity.filter(|ext| self.part(*ext).is_some()) {
            self.remove_body_part(extremity)?;
        }

        for slot in [id, flipped] {
            if let Some(slot) = self.parts.get_mut(slot.index()) {
                *slot = None;
            }
        }
        self.limbs.retain(|limb| *limb != id && *limb != flipped);

        debug!("Removed {:?}/{:?}", id, flipped);
        self.notify(Notification::PartDestroyed { part_id: id.0 });
        self.notify_statistics();
        Ok(())
    }

    /// Main instances currently on the creature
    fn placed_parts(&self) -> impl Iterator<Item = &BodyPartConstructor> {
        self.parts()
            .filter(|part| !part.is_flipped())
            .filter(|part| matches!(part.state(), PartState::Attached | PartState::Dragging))
    }

    /// Aggregate complexity and cost. A mirror pair counts once.
    pub fn statistics(&self) -> CreatureStatistics {
        let bone_count = self.skeleton.len() as u32;
        let (complexity, cost, body_part_count) =
            self.placed_parts().fold((bone_count, 0u32, 0u32), |(complexity, cost, count), part| {
                (
                    complexity.saturating_add(part.traits().complexity),
                    cost.saturating_add(part.traits().price),
                    count + 1,
                )
            });

        CreatureStatistics {
            complexity,
            max_complexity: self.config.max_complexity,
            cost,
            cash: self.config.remaining_cash(cost),
            bone_count,
            body_part_count,
        }
    }

    /// Whether a catalog entry fits the remaining budget.
    ///
    /// A refusal is reported through a [`Notification::BudgetWarning`] and
    /// the log; it is never an error.
    pub fn can_add_body_part(&mut self, catalog: &impl Catalog, body_part_id: &str) -> Result<AddCheck, ConstructionError> {
        let traits = catalog
            .traits(body_part_id)
            .ok_or_else(|| ConstructionError::UnknownBodyPart(body_part_id.to_string()))?;
        let (complexity, price) = (traits.complexity, traits.price);
        Ok(self.check_budget(body_part_id, complexity, price))
    }

    pub(crate) fn check_budget(&mut self, body_part_id: &str, complexity: u32, price: u32) -> AddCheck {
        let statistics = self.statistics();
        let check = AddCheck {
            too_complicated: self.config.remaining_complexity(statistics.complexity) < i64::from(complexity),
            not_enough_cash: statistics.cash < i64::from(price),
        };
        if !check.is_ok() {
            warn!(
                "Cannot add '{}': too complicated: {}, not enough cash: {}",
                body_part_id, check.too_complicated, check.not_enough_cash
            );
            self.notify(Notification::BudgetWarning(check.to_warning(body_part_id)));
        }
        check
    }
}
