//! Body frame velocity (twist)

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::ops::Mul;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A change in pose expressed in the body frame of the starting pose, along
/// an arc of constant curvature.
///
/// A twist is what [`super::Pose2::log`] produces and what
/// [`super::Pose2::exp`] consumes.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Twist2 {
    /// Change along the body X (forward) axis.
    ///
    /// Units: meters
    pub dx_m: f64,

    /// Change along the body Y (left) axis.
    ///
    /// Units: meters
    pub dy_m: f64,

    /// Change in heading.
    ///
    /// Units: radians
    pub dtheta_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Twist2 {
    pub fn new(dx_m: f64, dy_m: f64, dtheta_rad: f64) -> Self {
        Self {
            dx_m,
            dy_m,
            dtheta_rad,
        }
    }
}

impl Mul<f64> for Twist2 {
    type Output = Twist2;

    fn mul(self, scalar: f64) -> Self::Output {
        Twist2 {
            dx_m: self.dx_m * scalar,
            dy_m: self.dy_m * scalar,
            dtheta_rad: self.dtheta_rad * scalar,
        }
    }
}
