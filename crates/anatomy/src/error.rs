//! Error types for construction and serialization.

use crate::types::PartId;

/// Precondition failures of constructor operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConstructionError {
    #[error("Unknown part {0:?}")]
    UnknownPart(PartId),
    #[error("Body part '{0}' is not in the catalog")]
    UnknownBodyPart(String),
    #[error("Part {0:?} is already attached")]
    AlreadyAttached(PartId),
    #[error("Bone {0} is not on the skeleton")]
    UnknownBone(usize),
    #[error("Part {0:?} is not attached")]
    NotAttached(PartId),
    #[error("Part {0:?} is not a limb")]
    NotALimb(PartId),
    #[error("Part {0:?} is not an extremity")]
    NotAnExtremity(PartId),
    #[error("Part {0:?} is already being dragged")]
    AlreadyDragging(PartId),
    #[error("Part {0:?} is not being dragged")]
    NotDragging(PartId),
    #[error("Part {part:?} does not allow {transformation}")]
    TransformationNotAllowed {
        part: PartId,
        transformation: &'static str,
    },
    #[error("Bone {index} is out of range for part {part:?} ({count} bones)")]
    BoneOutOfRange {
        part: PartId,
        index: usize,
        count: usize,
    },
    #[error("Record for '{body_part_id}' has {found} limb bones, rig has {expected}")]
    RigMismatch {
        body_part_id: String,
        expected: usize,
        found: usize,
    },
}

/// Failures while encoding or validating persisted creatures
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("Failed to encode creature: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported creature data version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("Invalid creature name: {0}")]
    InvalidName(String),
}
