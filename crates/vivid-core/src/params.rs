//! Parameter definitions shared by the registry, synchronizer, and shading stage.
//!
//! `ColorParams` is the user-facing record stored per slot (hue in degrees, as
//! persisted). `ShadeParams` is the normalized form the shading stage reads.

use serde::{Deserialize, Serialize};

/// Maximum number of monitors that can carry their own settings.
pub const MAX_MONITORS: usize = 4;

/// Length of every parameter array: index 0 is the global default, indices
/// `1..=MAX_MONITORS` belong to monitor slots.
pub const PARAM_SLOTS: usize = MAX_MONITORS + 1;

/// One slot's color adjustment as stored in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorParams {
    /// Saturation factor. 1.0 = neutral, 0.0 = grayscale, > 1.0 boosts.
    pub saturation: f64,
    /// Hue rotation in degrees (UI range 0–360).
    pub hue_shift_degrees: f64,
    /// Whether colors are inverted before hue and saturation are applied.
    pub invert: bool,
}

impl ColorParams {
    /// Identity transform. Every newly created monitor slot starts here.
    pub const IDENTITY: Self = Self {
        saturation: 1.0,
        hue_shift_degrees: 0.0,
        invert: false,
    };

    /// Value read for an entry the configuration store does not hold.
    ///
    /// Saturation deliberately reads as `0.0` here, not `1.0`: a store that was
    /// never initialized yields full desaturation at index 0. Kept as-is
    /// pending product review.
    pub const UNSET: Self = Self {
        saturation: 0.0,
        hue_shift_degrees: 0.0,
        invert: false,
    };

    /// Normalize to the form consumed by the shading stage.
    pub fn to_shade(&self) -> ShadeParams {
        ShadeParams {
            saturation: self.saturation as f32,
            hue_shift: hue_degrees_to_radians(self.hue_shift_degrees),
            invert: self.invert,
        }
    }
}

impl Default for ColorParams {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Normalized per-pixel parameters: hue in radians, ready for the shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadeParams {
    /// Saturation factor.
    pub saturation: f32,
    /// Hue rotation in radians.
    pub hue_shift: f32,
    /// Color inversion flag.
    pub invert: bool,
}

impl ShadeParams {
    /// Identity transform. Input passes through unchanged.
    pub const IDENTITY: Self = Self {
        saturation: 1.0,
        hue_shift: 0.0,
        invert: false,
    };
}

impl Default for ShadeParams {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Convert a stored hue shift (degrees) to the radians uploaded to the GPU.
pub fn hue_degrees_to_radians(degrees: f64) -> f32 {
    (degrees * std::f64::consts::PI / 180.0) as f32
}

/// Encode an invert flag the way the uniform arrays carry it.
pub const fn invert_to_float(invert: bool) -> f32 {
    if invert { 1.0 } else { 0.0 }
}

/// On-screen rectangle of one monitor in compositor pixel space (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RegionRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RegionRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Half-open containment test: `[x, x+width) × [y, y+height)`.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }

    /// Packed `[x, y, width, height]` as laid out in the uniform block.
    pub const fn to_array(&self) -> [f32; 4] {
        [self.x, self.y, self.width, self.height]
    }
}
