//! Conversion between the live creature and [`CreatureData`].

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::constants::CREATURE_DATA_VERSION;
use crate::record::{AttachedBodyPart, CreatureData, PartRig};
use crate::skeleton::Skeleton;
use crate::types::{BodyPartKind, PartId};

use super::Creature;

impl Creature {
    /// Snapshot the attached main instances, in arena order.
    ///
    /// Records are refreshed from the live pose first. An extremity stores
    /// the position of its limb's record in `attached_body_parts`.
    pub fn to_data(&mut self) -> CreatureData {
        let mut records: Vec<AttachedBodyPart> = Vec::new();
        let mut record_index: HashMap<PartId, usize> = HashMap::new();
        let mut extremities = Vec::new();

        for part in self.parts.iter_mut().flatten() {
            if part.is_flipped() || !part.is_attached() {
                continue;
            }
            part.update_attachment_configuration();
            record_index.insert(part.id(), records.len());

            let mut record = part.record().clone();
            if part.traits().kind == BodyPartKind::Extremity {
                record.rig = PartRig::Extremity { limb: None };
                if let Some(limb) = part.connected_limb() {
                    extremities.push((records.len(), limb));
                }
            }
            records.push(record);
        }

        for (extremity, limb) in extremities {
            // Records exist for main instances only
            let limb = match self.part(limb) {
                Some(part) if part.is_flipped() => part.flipped(),
                _ => limb,
            };
            if let Some(&limb) = record_index.get(&limb) {
                records[extremity].rig = PartRig::Extremity { limb: Some(limb) };
            }
        }

        debug!("Collected {} body parts from '{}'", records.len(), self.name);
        CreatureData {
            version: CREATURE_DATA_VERSION,
            name: self.name.clone(),
            primary_colour: self.primary_colour,
            secondary_colour: self.secondary_colour,
            pattern_id: self.pattern_id.clone(),
            attached_body_parts: records,
            bones: self.skeleton.to_records(),
        }
    }

    /// Replace the creature with a saved one. Returns the number of body parts
    /// that attached.
    ///
    /// Records naming unknown body parts or missing bones are skipped with a
    /// warning. An empty bone list keeps the current skeleton.
    pub fn load(&mut self, data: &CreatureData, catalog: &impl Catalog) -> usize {
        self.clear();
        self.name = data.name.clone();
        self.primary_colour = data.primary_colour;
        self.secondary_colour = data.secondary_colour;
        self.pattern_id = data.pattern_id.clone();
        if !data.bones.is_empty() {
            self.skeleton = Skeleton::from_records(&data.bones);
        }

        let ids: Vec<Option<PartId>> = data
            .attached_body_parts
            .iter()
            .map(|record| self.load_record(record, catalog))
            .collect();

        for (record, extremity) in data.attached_body_parts.iter().zip(&ids) {
            let (PartRig::Extremity { limb: Some(limb) }, Some(extremity)) = (&record.rig, extremity) else {
                continue;
            };
            let Some(&Some(limb)) = ids.get(*limb) else {
                warn!("'{}' refers to a missing limb record {}", record.body_part_id, limb);
                continue;
            };
            if let Err(e) = self.link_extremity(limb, *extremity) {
                warn!("Could not reconnect '{}': {}", record.body_part_id, e);
            }
        }

        let attached = ids.iter().flatten().count();
        info!(
            "Loaded '{}': {}/{} body parts attached",
            self.name,
            attached,
            data.attached_body_parts.len()
        );
        self.notify_statistics();
        attached
    }

    fn load_record(&mut self, record: &AttachedBodyPart, catalog: &impl Catalog) -> Option<PartId> {
        let Some(traits) = catalog.traits(&record.body_part_id) else {
            warn!("Skipping unknown body part '{}'", record.body_part_id);
            return None;
        };
        let id = self.add_pair(traits.clone());

        let result = self
            .set_attached(id, record.clone())
            .and_then(|()| self.attach(id, record));
        match result {
            Ok(true) => return Some(id),
            Ok(false) => warn!(
                "Skipping '{}': bone {} is not on the skeleton",
                record.body_part_id, record.bone_index
            ),
            Err(e) => warn!("Skipping '{}': {}", record.body_part_id, e),
        }
        if let Err(e) = self.remove_body_part(id) {
            warn!("Could not discard {:?}: {}", id, e);
        }
        None
    }

    /// Remove every body part. Name, colours and skeleton are kept.
    pub fn clear(&mut self) {
        let count = self.parts().filter(|part| !part.is_flipped()).count();
        self.parts.clear();
        self.limbs.clear();
        debug!("Cleared {} body parts from '{}'", count, self.name);
        self.notify_statistics();
    }
}
