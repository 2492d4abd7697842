//! # Trajectory constraints
//!
//! Constraints limit the velocity and acceleration allowed at each point on a path, as a function
//! of the pose and curvature of the path at that point.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod centripetal;
mod drive;
mod region;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::fmt::Debug;

use util::geom::Pose2;

pub use centripetal::CentripetalAccelerationConstraint;
pub use drive::*;
pub use region::*;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A limit on the motion of the robot along a path.
pub trait TrajectoryConstraint: Debug {
    /// The maximum velocity allowed at the given point on the path.
    ///
    /// `velocity_ms` is the velocity the point would otherwise be given.
    ///
    /// Units: meters/second
    fn max_velocity_ms(&self, pose: &Pose2, curvature_m: f64, velocity_ms: f64) -> f64;

    /// The acceleration limits at the given point on the path when travelling at `velocity_ms`.
    ///
    /// By default acceleration is not limited.
    fn min_max_acceleration(&self, _pose: &Pose2, _curvature_m: f64, _velocity_ms: f64) -> MinMax {
        MinMax::default()
    }
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A pair of acceleration limits.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MinMax {
    /// Units: meters/second^2
    pub min_acceleration_mss: f64,

    /// Units: meters/second^2
    pub max_acceleration_mss: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MinMax {
    pub fn new(min_acceleration_mss: f64, max_acceleration_mss: f64) -> Self {
        Self {
            min_acceleration_mss,
            max_acceleration_mss,
        }
    }
}

impl Default for MinMax {
    /// Unbounded in both directions.
    fn default() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY)
    }
}
