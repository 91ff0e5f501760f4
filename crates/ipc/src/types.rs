//! Value types carried by builder notifications.

use serde::{Deserialize, Serialize};

/// Aggregate cost and complexity of the creature being built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureStatistics {
    /// Complexity of all attached parts plus skeleton bones
    pub complexity: u32,
    /// Complexity cap
    pub max_complexity: u32,
    /// Total price of attached parts
    pub cost: u32,
    /// Cash left to spend (negative when over budget)
    pub cash: i64,
    /// Bones in the creature's own skeleton
    pub bone_count: u32,
    /// Number of body parts (mirror pairs count once)
    pub body_part_count: u32,
}

/// Why adding a body part was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetWarning {
    pub body_part_id: String,
    pub too_complicated: bool,
    pub not_enough_cash: bool,
}
