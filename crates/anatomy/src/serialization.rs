//! JSON encoding of [`CreatureData`] and the persistence seam.
//!
//! Decoding never fails loudly: malformed or too-new data is logged and
//! reported as "nothing to load".

use tracing::{info, warn};

use crate::constants::CREATURE_DATA_VERSION;
use crate::error::SerializationError;
use crate::record::CreatureData;

/// Characters that cannot appear in a creature name (it doubles as a file name)
const INVALID_NAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

pub fn encode_creature(data: &CreatureData) -> Result<String, SerializationError> {
    Ok(serde_json::to_string(data)?)
}

/// Parse a saved creature. Returns `None` for malformed JSON or a version
/// newer than this build understands.
pub fn decode_creature(json: &str) -> Option<CreatureData> {
    match parse_creature(json) {
        Ok(data) => Some(data),
        Err(e) => {
            warn!("Discarding creature data: {}", e);
            None
        }
    }
}

fn parse_creature(json: &str) -> Result<CreatureData, SerializationError> {
    let data: CreatureData = serde_json::from_str(json)?;
    if data.version > CREATURE_DATA_VERSION {
        return Err(SerializationError::UnsupportedVersion {
            found: data.version,
            supported: CREATURE_DATA_VERSION,
        });
    }
    Ok(data)
}

/// Clean a user-entered creature name: path separators and reserved
/// characters are dropped and surrounding whitespace trimmed.
pub fn sanitize_name(name: &str) -> Result<String, SerializationError> {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control() && !INVALID_NAME_CHARS.contains(c))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(SerializationError::InvalidName(name.to_string()));
    }
    Ok(cleaned.to_string())
}

/// Turns creature data into an opaque blob and back.
///
/// File I/O, compression and encryption belong to implementors.
pub trait Persistence {
    fn save(&self, data: &CreatureData) -> Result<Vec<u8>, SerializationError>;

    /// `None` means there is nothing usable to load
    fn load(&self, blob: &[u8]) -> Option<CreatureData>;
}

/// Plain JSON persistence
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPersistence {
    pub pretty: bool,
}

impl Persistence for JsonPersistence {
    fn save(&self, data: &CreatureData) -> Result<Vec<u8>, SerializationError> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(data)?
        } else {
            serde_json::to_vec(data)?
        };
        info!("Saved creature '{}' ({} bytes)", data.name, bytes.len());
        Ok(bytes)
    }

    fn load(&self, blob: &[u8]) -> Option<CreatureData> {
        let Ok(json) = std::str::from_utf8(blob) else {
            warn!("Discarding creature data: not UTF-8");
            return None;
        };
        let data = decode_creature(json)?;
        info!(
            "Loaded creature '{}' ({} body parts)",
            data.name,
            data.attached_body_parts.len()
        );
        Some(data)
    }
}
