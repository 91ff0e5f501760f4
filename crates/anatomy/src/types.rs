//! Core value types shared by records, the catalog and constructors.

use serde::{Deserialize, Serialize};

/// Type-safe index of a body-part constructor in a creature's part arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartId(pub u32);

impl PartId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Linear RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Colour {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Colour {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Colour {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[f32; 4]> for Colour {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// Broad category of a body part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPartKind {
    /// Torso-like parts placed directly on the body surface
    Body,
    /// Jointed part with a weighted bone chain (arms, legs)
    Limb,
    /// Part that hangs off a limb's terminal bone (hands, feet)
    Extremity,
    /// Everything else (eyes, mouths, ears, ...)
    #[default]
    Detail,
}

/// A single editing transformation a body part may permit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Transformation {
    Scale = 1 << 0,
    Rotate = 1 << 1,
    Stretch = 1 << 2,
    Pivot = 1 << 3,
}

/// Set of permitted transformations, stored as a bit mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transformations(pub u8);

impl Transformations {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(0b1111);

    pub fn with(self, transformation: Transformation) -> Self {
        Self(self.0 | transformation as u8)
    }

    pub fn contains(self, transformation: Transformation) -> bool {
        self.0 & transformation as u8 != 0
    }
}

impl FromIterator<Transformation> for Transformations {
    fn from_iter<I: IntoIterator<Item = Transformation>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, Self::with)
    }
}

/// Static catalog traits of a body part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyPartTraits {
    /// Catalog key
    pub id: String,
    pub kind: BodyPartKind,
    /// Category label shown in the UI ("Arms", "Eyes", ...)
    #[serde(default)]
    pub plural_form: String,
    pub price: u32,
    pub complexity: u32,
    #[serde(default)]
    pub transformations: Transformations,
    #[serde(default = "default_min_scale")]
    pub min_scale: f32,
    #[serde(default = "default_max_scale")]
    pub max_scale: f32,
    #[serde(default = "default_scale_increment")]
    pub scale_increment: f32,
    #[serde(default = "default_can_mirror")]
    pub can_mirror: bool,
    /// Joints in the limb rig (limbs only)
    #[serde(default)]
    pub bone_count: usize,
    /// Blend shapes on the limb mesh; weights are ignored when zero
    #[serde(default)]
    pub blend_shape_count: usize,
}

fn default_min_scale() -> f32 {
    0.25
}

fn default_max_scale() -> f32 {
    2.0
}

fn default_scale_increment() -> f32 {
    0.1
}

fn default_can_mirror() -> bool {
    true
}

impl BodyPartTraits {
    /// Traits for a rigid part with default scale limits
    pub fn new(id: impl Into<String>, kind: BodyPartKind, price: u32, complexity: u32) -> Self {
        Self {
            id: id.into(),
            kind,
            plural_form: String::new(),
            price,
            complexity,
            transformations: Transformations::NONE,
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            scale_increment: default_scale_increment(),
            can_mirror: default_can_mirror(),
            bone_count: 0,
            blend_shape_count: 0,
        }
    }

    /// Traits for a limb with `bone_count` joints, each carrying a blend shape
    pub fn limb(id: impl Into<String>, price: u32, complexity: u32, bone_count: usize) -> Self {
        Self {
            bone_count,
            blend_shape_count: bone_count,
            ..Self::new(id, BodyPartKind::Limb, price, complexity)
        }
    }

    pub fn with_transformations(mut self, transformations: Transformations) -> Self {
        self.transformations = transformations;
        self
    }

    pub fn allows(&self, transformation: Transformation) -> bool {
        self.transformations.contains(transformation)
    }

    /// Whether the mirror partner is shown. Limbs always mirror.
    pub fn mirrors(&self) -> bool {
        self.kind == BodyPartKind::Limb || self.can_mirror
    }

    pub fn is_limb(&self) -> bool {
        self.kind == BodyPartKind::Limb
    }
}
