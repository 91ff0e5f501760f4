//! Body-part catalog lookups.
//!
//! The catalog is read-only to the attachment core. Hosts either implement
//! [`Catalog`] over their own database or load an [`InMemoryCatalog`] from JSON.

use std::collections::HashMap;

use crate::types::BodyPartTraits;

/// Read-only source of body-part traits keyed by catalog id
pub trait Catalog {
    fn traits(&self, body_part_id: &str) -> Option<&BodyPartTraits>;

    fn contains(&self, body_part_id: &str) -> bool {
        self.traits(body_part_id).is_some()
    }
}

/// Catalog held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    entries: HashMap<String, BodyPartTraits>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON array of [`BodyPartTraits`]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<BodyPartTraits> = serde_json::from_str(json)?;
        Ok(entries.into_iter().collect())
    }

    /// Insert or replace an entry
    pub fn insert(&mut self, traits: BodyPartTraits) {
        self.entries.insert(traits.id.clone(), traits);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<BodyPartTraits> for InMemoryCatalog {
    fn from_iter<I: IntoIterator<Item = BodyPartTraits>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for traits in iter {
            catalog.insert(traits);
        }
        catalog
    }
}

impl Catalog for InMemoryCatalog {
    fn traits(&self, body_part_id: &str) -> Option<&BodyPartTraits> {
        self.entries.get(body_part_id)
    }
}
