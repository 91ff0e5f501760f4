//! Shared configuration for the creature builder
//!
//! This crate provides the single source of truth for the budget limits and
//! editing increments used by the attachment core and by any host UI.

use serde::{Deserialize, Serialize};

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;

/// Default maximum complexity a creature may reach
pub const DEFAULT_MAX_COMPLEXITY: u32 = 200;

/// Default cash a player starts each creature with
pub const DEFAULT_STARTING_CASH: u32 = 1000;

/// Blend-shape weight added or removed per scroll tick
pub const DEFAULT_WEIGHT_STEP: f32 = 5.0;

/// Per-axis stretch limit (stretch is clamped to `[-range, range]`)
pub const DEFAULT_STRETCH_RANGE: [i32; 3] = [1, 1, 1];

/// Distance below which two bones are treated as coincident
pub const DEFAULT_MIRROR_EPSILON: f32 = 1e-4;

/// Builder tuning shared by the attachment core and the editor UI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
#[serde(default)]
pub struct BuilderConfig {
    /// Maximum total complexity (parts + skeleton bones)
    pub max_complexity: u32,
    /// Cash available before any part is bought
    pub starting_cash: u32,
    /// Weight delta applied by scroll input on limb bones
    pub weight_step: f32,
    /// Stretch clamp range per axis
    pub stretch_range: [i32; 3],
    /// Epsilon guarding degenerate look rotations
    pub mirror_epsilon: f32,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            max_complexity: DEFAULT_MAX_COMPLEXITY,
            starting_cash: DEFAULT_STARTING_CASH,
            weight_step: DEFAULT_WEIGHT_STEP,
            stretch_range: DEFAULT_STRETCH_RANGE,
            mirror_epsilon: DEFAULT_MIRROR_EPSILON,
        }
    }
}

impl BuilderConfig {
    /// Create a config with the given budget limits
    pub fn with_budget(max_complexity: u32, starting_cash: u32) -> Self {
        Self {
            max_complexity,
            starting_cash,
            ..Default::default()
        }
    }

    /// Complexity still available after `used` has been spent
    pub fn remaining_complexity(&self, used: u32) -> i64 {
        self.max_complexity as i64 - used as i64
    }

    /// Cash still available after `spent` has been spent
    pub fn remaining_cash(&self, spent: u32) -> i64 {
        self.starting_cash as i64 - spent as i64
    }
}
