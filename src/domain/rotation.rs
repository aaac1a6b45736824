//! Page display rotation

use serde::{Deserialize, Serialize};

/// Display rotation in degrees, always normalized into `[0, 360)`.
///
/// Positive angles turn the page clockwise on screen (y grows downwards).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Rotation(f32);

impl Rotation {
    pub const ZERO: Rotation = Rotation(0.0);

    /// Create a rotation from any signed angle
    pub fn new(degrees: f32) -> Self {
        let normalized = degrees.rem_euclid(360.0);
        // rem_euclid of a tiny negative angle rounds up to exactly 360.0 in f32
        if normalized >= 360.0 || normalized == 0.0 {
            Rotation(0.0)
        } else {
            Rotation(normalized)
        }
    }

    pub fn degrees(self) -> f32 {
        self.0
    }

    pub fn radians(self) -> f32 {
        self.0.to_radians()
    }

    /// This rotation turned further by `delta` degrees
    pub fn rotated_by(self, delta: f32) -> Self {
        Rotation::new(self.0 + delta)
    }

    /// The rotation that undoes this one
    pub fn inverse(self) -> Self {
        Rotation::new(-self.0)
    }
}

impl From<f32> for Rotation {
    fn from(degrees: f32) -> Self {
        Rotation::new(degrees)
    }
}

impl From<Rotation> for f32 {
    fn from(rotation: Rotation) -> Self {
        rotation.0
    }
}
