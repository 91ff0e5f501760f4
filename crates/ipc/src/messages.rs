//! Main message enums for communication between the builder core and the UI.

use serde::{Deserialize, Serialize};

use crate::input::PartInput;
use crate::types::{BudgetWarning, CreatureStatistics};

/// Notifications emitted by the builder core.
///
/// The core never formats display text; these carry raw values for the UI
/// and statistics panels to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Notification {
    /// A mirror pair was registered on the creature
    PartAdded {
        part_id: u32,
        flipped_id: u32,
        body_part_id: String,
    },

    /// A part was attached to a skeleton bone
    Attached { part_id: u32, bone_index: i32 },

    /// A part was detached from the skeleton
    Detached { part_id: u32 },

    /// A part was removed from the creature (failed placement or deletion)
    PartDestroyed { part_id: u32 },

    /// A part was duplicated by a copy-drag
    PartCopied { source_id: u32, copy_id: u32 },

    /// Stretch changed
    Stretched { part_id: u32, stretch: [i32; 3] },

    /// Uniform or per-axis scale changed
    Scaled { part_id: u32, scale: [f32; 3] },

    /// Blend-shape weight changed on a limb bone
    WeightSet {
        part_id: u32,
        index: usize,
        weight: f32,
    },

    /// Part colours changed
    ColoursSet { part_id: u32 },

    /// A part was shown or hidden
    VisibilityChanged { part_id: u32, active: bool },

    /// Adding a part was refused for budget reasons
    BudgetWarning(BudgetWarning),

    /// Aggregate statistics changed
    StatisticsUpdated(CreatureStatistics),
}

/// Commands sent by the UI to the builder core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UiToBuilder {
    /// Route an input event to a part
    PartInput { part_id: u32, input: PartInput },

    /// Paint a single part (and its mirror), or the whole creature when
    /// `part_id` is `None`
    SetColours {
        part_id: Option<u32>,
        primary: [f32; 4],
        secondary: [f32; 4],
    },

    /// Select the pattern texture; an empty id clears it
    SetPattern { pattern_id: String },

    /// Rename the creature
    SetName { name: String },

    /// Remove every body part
    Clear,
}

impl Notification {
    /// Part this notification refers to, if any
    pub fn part_id(&self) -> Option<u32> {
        match self {
            Notification::PartAdded { part_id, .. }
            | Notification::Attached { part_id, .. }
            | Notification::Detached { part_id }
            | Notification::PartDestroyed { part_id }
            | Notification::Stretched { part_id, .. }
            | Notification::Scaled { part_id, .. }
            | Notification::WeightSet { part_id, .. }
            | Notification::ColoursSet { part_id }
            | Notification::VisibilityChanged { part_id, .. } => Some(*part_id),
            Notification::PartCopied { copy_id, .. } => Some(*copy_id),
            Notification::BudgetWarning(_) | Notification::StatisticsUpdated(_) => None,
        }
    }
}
