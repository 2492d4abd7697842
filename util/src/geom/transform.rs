//! Rigid transforms between poses

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{UnitComplex, Vector2};
use serde::{Deserialize, Serialize};

use super::Pose2;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A rigid transform, expressed in the frame of the pose it is applied to.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform2 {
    /// Translation in the frame of the pose being transformed.
    ///
    /// Units: meters
    pub translation_m: Vector2<f64>,

    /// Rotation applied after the translation.
    pub rotation: UnitComplex<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Transform2 {
    pub fn new(translation_m: Vector2<f64>, rotation: UnitComplex<f64>) -> Self {
        Self {
            translation_m,
            rotation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Vector2::zeros(), UnitComplex::identity())
    }

    /// The transform which maps `initial` onto `last`.
    pub fn between(initial: &Pose2, last: &Pose2) -> Self {
        let inv_heading = initial.heading.inverse();

        Self {
            translation_m: inv_heading * (last.position_m - initial.position_m),
            rotation: inv_heading * last.heading,
        }
    }

    /// The transform which undoes this one.
    pub fn inverse(&self) -> Self {
        let inv_rotation = self.rotation.inverse();

        Self {
            translation_m: -(inv_rotation * self.translation_m),
            rotation: inv_rotation,
        }
    }
}

impl Default for Transform2 {
    fn default() -> Self {
        Self::identity()
    }
}
