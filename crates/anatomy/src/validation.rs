//! Budget and unlock checks for loading a creature or adding a part.
//!
//! Violations are values, not errors: every failing reason is collected so the
//! UI can show them together.

use std::collections::HashSet;

use creature_config::BuilderConfig;
use creature_ipc::BudgetWarning;
use tracing::debug;

use crate::catalog::Catalog;
use crate::record::CreatureData;

/// Body parts and patterns the player may use
#[derive(Debug, Clone, Default)]
pub struct Unlocks {
    pub body_parts: HashSet<String>,
    pub patterns: HashSet<String>,
}

impl Unlocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body_parts<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.body_parts.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_patterns<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn has_body_part(&self, body_part_id: &str) -> bool {
        self.body_parts.contains(body_part_id)
    }

    /// The empty pattern (no texture) is always available
    pub fn has_pattern(&self, pattern_id: &str) -> bool {
        pattern_id.is_empty() || self.patterns.contains(pattern_id)
    }
}

/// One reason a creature cannot be loaded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadRejection {
    #[error("is too complicated. ({complexity}/{max_complexity})")]
    TooComplicated { complexity: u32, max_complexity: u32 },
    #[error("is too expensive. ({cost}/{cash})")]
    TooExpensive { cost: u32, cash: u32 },
    #[error("uses a pattern that has not yet been unlocked.")]
    PatternLocked,
    #[error("uses body parts that have not yet been unlocked.")]
    BodyPartsLocked,
}

/// Result of [`can_load_creature`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadCheck {
    pub errors: Vec<LoadRejection>,
    /// Numbered, human-readable summary; empty when loading is allowed
    pub message: String,
}

impl LoadCheck {
    fn new(name: &str, errors: Vec<LoadRejection>) -> Self {
        let message = if errors.is_empty() {
            String::new()
        } else {
            let reasons: Vec<String> = errors
                .iter()
                .enumerate()
                .map(|(i, error)| format!("{}. it {error}", i + 1))
                .collect();
            format!("\"{name}\" cannot be loaded because:\n{}", reasons.join("\n"))
        };
        Self { errors, message }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Result of an incremental budget check before adding or copying a part
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddCheck {
    pub too_complicated: bool,
    pub not_enough_cash: bool,
}

impl AddCheck {
    pub fn is_ok(&self) -> bool {
        !self.too_complicated && !self.not_enough_cash
    }

    pub fn to_warning(self, body_part_id: &str) -> BudgetWarning {
        BudgetWarning {
            body_part_id: body_part_id.to_string(),
            too_complicated: self.too_complicated,
            not_enough_cash: self.not_enough_cash,
        }
    }
}

/// Decide whether a saved creature fits the player's budget and unlocks.
///
/// Complexity is the sum over attached parts plus one per skeleton bone. Ids
/// missing from the catalog count as locked.
pub fn can_load_creature(
    data: &CreatureData,
    catalog: &impl Catalog,
    config: &BuilderConfig,
    unlocks: &Unlocks,
) -> LoadCheck {
    let mut complexity = data.bones.len() as u32;
    let mut cost = 0u32;
    let mut locked = false;

    for part in &data.attached_body_parts {
        match catalog.traits(&part.body_part_id) {
            Some(traits) => {
                complexity = complexity.saturating_add(traits.complexity);
                cost = cost.saturating_add(traits.price);
            }
            None => {
                debug!("'{}' is not in the catalog", part.body_part_id);
                locked = true;
            }
        }
        locked |= !unlocks.has_body_part(&part.body_part_id);
    }

    let mut errors = Vec::new();
    if config.remaining_complexity(complexity) < 0 {
        errors.push(LoadRejection::TooComplicated {
            complexity,
            max_complexity: config.max_complexity,
        });
    }
    if cost > config.starting_cash {
        errors.push(LoadRejection::TooExpensive {
            cost,
            cash: config.starting_cash,
        });
    }
    if !unlocks.has_pattern(&data.pattern_id) {
        errors.push(LoadRejection::PatternLocked);
    }
    if locked {
        errors.push(LoadRejection::BodyPartsLocked);
    }

    LoadCheck::new(&data.name, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::record::AttachedBodyPart;
    use crate::types::{BodyPartKind, BodyPartTraits};

    fn catalog() -> InMemoryCatalog {
        [
            BodyPartTraits::new("torso", BodyPartKind::Body, 300, 10),
            BodyPartTraits::new("eye", BodyPartKind::Detail, 50, 2),
            BodyPartTraits::limb("leg", 120, 4, 3),
        ]
        .into_iter()
        .collect()
    }

    fn unlock_all() -> Unlocks {
        Unlocks::new()
            .with_body_parts(["torso", "eye", "leg"])
            .with_patterns(["stripes"])
    }

    fn creature(parts: &[&str]) -> CreatureData {
        let mut data = CreatureData::new("Bob");
        data.attached_body_parts = parts.iter().map(|id| AttachedBodyPart::new(*id)).collect();
        data
    }

    #[test]
    fn test_within_budget() {
        let check = can_load_creature(
            &creature(&["torso", "eye"]),
            &catalog(),
            &BuilderConfig::default(),
            &unlock_all(),
        );
        assert!(check.is_ok());
        assert!(check.message.is_empty());
    }

    #[test]
    fn test_too_complicated() {
        let config = BuilderConfig::with_budget(10, 1000);
        let check = can_load_creature(&creature(&["torso", "eye"]), &catalog(), &config, &unlock_all());
        assert!(!check.is_ok());
        assert_eq!(
            check.errors,
            vec![LoadRejection::TooComplicated {
                complexity: 12,
                max_complexity: 10
            }]
        );
        assert!(check.message.contains("too complicated"));
        assert!(check.message.contains("12/10"));
    }

    #[test]
    fn test_bones_count_as_complexity() {
        let config = BuilderConfig::with_budget(10, 1000);
        let mut data = creature(&["torso"]);
        assert!(can_load_creature(&data, &catalog(), &config, &unlock_all()).is_ok());

        data.bones.push(Default::default());
        let check = can_load_creature(&data, &catalog(), &config, &unlock_all());
        assert!(check.message.contains("11/10"));
    }

    #[test]
    fn test_all_reasons_reported_in_order() {
        let config = BuilderConfig::with_budget(5, 100);
        let mut data = creature(&["torso", "wing"]);
        data.pattern_id = "spots".to_string();

        let check = can_load_creature(&data, &catalog(), &config, &unlock_all());
        assert_eq!(check.errors.len(), 4);
        assert_eq!(
            check.message,
            "\"Bob\" cannot be loaded because:\n\
             1. it is too complicated. (10/5)\n\
             2. it is too expensive. (300/100)\n\
             3. it uses a pattern that has not yet been unlocked.\n\
             4. it uses body parts that have not yet been unlocked."
        );
    }

    #[test]
    fn test_locked_body_part() {
        let unlocks = Unlocks::new().with_body_parts(["torso"]);
        let check = can_load_creature(
            &creature(&["torso", "eye"]),
            &catalog(),
            &BuilderConfig::default(),
            &unlocks,
        );
        assert_eq!(check.errors, vec![LoadRejection::BodyPartsLocked]);
    }

    #[test]
    fn test_empty_pattern_always_unlocked() {
        assert!(Unlocks::new().has_pattern(""));
        assert!(!Unlocks::new().has_pattern("stripes"));
    }

    #[test]
    fn test_add_check_warning() {
        let check = AddCheck {
            too_complicated: true,
            not_enough_cash: false,
        };
        assert!(!check.is_ok());
        let warning = check.to_warning("eye");
        assert_eq!(warning.body_part_id, "eye");
        assert!(warning.too_complicated);
    }
}
