//! Input events delivered to a single body part.
//!
//! The host performs hit testing (ray against the creature's body surface) and
//! routes each event to one part. Points and normals are expressed in the
//! creature's local space.

use serde::{Deserialize, Serialize};

/// A ray hit on a surface that body parts may attach to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceHit {
    /// Hit point (creature-local)
    pub point: [f32; 3],
    /// Surface normal at the hit point (creature-local, need not be normalized)
    pub normal: [f32; 3],
}

impl SurfaceHit {
    pub fn new(point: [f32; 3], normal: [f32; 3]) -> Self {
        Self { point, normal }
    }
}

/// Discrete interaction events for one body part.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PartInput {
    /// Pointer pressed on the part
    Press,
    /// Drag threshold crossed. `copy` is set when the copy modifier is held.
    BeginDrag { copy: bool },
    /// Drag tick; `hit` is the body surface under the pointer, if any
    Drag { hit: Option<SurfaceHit> },
    /// Drag finished; a missing hit cancels the placement
    EndDrag { hit: Option<SurfaceHit> },
    /// Pointer released
    Release,
    /// Scroll wheel over the part
    Scroll { up: bool },
    /// Scroll wheel over one of a limb's bone handles
    ScrollBone { index: usize, up: bool },
    /// One of a limb's bone handles dragged to a new creature-local position
    DragBone { index: usize, position: [f32; 3] },
    /// Bone handle released
    ReleaseBone { index: usize },
    /// Selection toggled
    Select { selected: bool },
}
