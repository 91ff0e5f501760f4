//! IPC message protocol for the creature builder
//!
//! Defines the messages exchanged between the attachment core and the host UI:
//! input routed to body parts, and notifications consumed by the statistics and
//! editor panels.

mod error;
mod input;
mod messages;
mod types;

pub use error::IpcError;
pub use input::{PartInput, SurfaceHit};
pub use messages::{Notification, UiToBuilder};
pub use types::{BudgetWarning, CreatureStatistics};

/// Serialize a notification batch for the UI.
pub fn encode_notifications(notifications: &[Notification]) -> Result<String, IpcError> {
    Ok(serde_json::to_string(notifications)?)
}

/// Parse a UI command.
pub fn decode_command(json: &str) -> Result<UiToBuilder, IpcError> {
    if json.trim().is_empty() {
        return Err(IpcError::InvalidFormat("empty command".to_string()));
    }
    Ok(serde_json::from_str(json)?)
}
