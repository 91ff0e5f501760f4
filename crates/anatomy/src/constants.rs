/// `bone_index` of a part that is not attached to any skeleton bone.
pub const NOT_ATTACHED: i32 = -1;

/// Lower bound of a blend-shape weight.
pub const MIN_WEIGHT: f32 = 0.0;

/// Upper bound of a blend-shape weight.
pub const MAX_WEIGHT: f32 = 100.0;

/// Current `CreatureData` schema version. Files without a version are 0.
pub const CREATURE_DATA_VERSION: u32 = 1;

/// Pitch applied after aiming a limb bone at its successor. Limb rigs point
/// their bones along +Y while a look rotation points +Z forward.
pub const BONE_PITCH_CORRECTION_DEGREES: f32 = 90.0;

/// Default spacing between the rest-pose bones of a freshly created limb.
pub const DEFAULT_SEGMENT_LENGTH: f32 = 0.25;
