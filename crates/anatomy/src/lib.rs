//! Body-part attachment core for the creature builder.
//!
//! This crate attaches body parts to a creature skeleton, keeps every part
//! paired with a mirrored twin, and converts the result to and from the saved
//! [`CreatureData`] format:
//! - [`types`] - Part ids, colours and catalog traits
//! - [`catalog`] - Read-only body part lookups
//! - [`skeleton`] - Creature-local transforms and the bone list
//! - [`record`] - Persisted part and creature records
//! - [`mirror`] - Sagittal reflection and bone chain alignment
//! - [`constructor`] - Per-instance attachment state and limb rigs
//! - [`creature`] - The part arena, mirror pairs and budget statistics
//! - [`input`] - Press/drag/scroll handling
//! - [`validation`] - Load and add budget checks
//! - [`serialization`] - JSON encoding and the persistence seam
//!
//! # Coordinates
//!
//! Every pose the core stores is relative to the creature root. The mirror
//! plane is local `x = 0`, so a pair's records differ only in the sign of x
//! and the matching rotation components.

pub mod catalog;
pub mod constants;
pub mod constructor;
pub mod creature;
pub mod error;
pub mod input;
pub mod mirror;
pub mod record;
pub mod serialization;
pub mod skeleton;
pub mod types;
pub mod validation;

pub use catalog::{Catalog, InMemoryCatalog};
pub use constants::*;
pub use constructor::{BodyPartConstructor, LimbRig, ParentLink, PartState};
pub use creature::Creature;
pub use error::{ConstructionError, SerializationError};
pub use input::InputOutcome;
pub use record::{AttachedBodyPart, Bone, CreatureData, PartRig};
pub use serialization::{JsonPersistence, Persistence, decode_creature, encode_creature, sanitize_name};
pub use skeleton::{Skeleton, SkeletonBone, Transform};
pub use types::{BodyPartKind, BodyPartTraits, Colour, PartId, Transformation, Transformations};
pub use validation::{AddCheck, LoadCheck, LoadRejection, Unlocks, can_load_creature};

pub use creature_config::BuilderConfig;
