//! # Kinematics module
//!
//! Converts between the velocity of the whole chassis ([`ChassisSpeeds`]) and the speeds of its
//! individual wheels or swerve modules.
//!
//! Mecanum and swerve drives have more wheel equations than the chassis has degrees of freedom,
//! so inverse kinematics (chassis to wheels) is a matrix product while forward kinematics (wheels
//! to chassis) uses the Moore-Penrose pseudo-inverse of that matrix, giving the least squares
//! chassis motion for a set of measured wheel speeds.
//!
//! The inverse kinematics matrix depends on the centre of rotation. The matrix for the last
//! centre of rotation used is cached inside the kinematics object and only rebuilt when the centre
//! changes. The cache is held in a [`RefCell`], so a kinematics object can be moved between
//! threads but not shared by them.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod differential;
mod mecanum;
mod swerve;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::cell::RefCell;

use log::trace;
use nalgebra::{DMatrix, DVector, UnitComplex, Vector2};
use serde::{Deserialize, Serialize};

pub use differential::*;
pub use mecanum::*;
pub use swerve::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Singular values below this are treated as zero when computing pseudo-inverses.
const PSEUDO_INVERSE_EPS: f64 = 1e-9;

/// Speeds scaled down by less than this fraction of the attainable maximum are not reported as
/// normalised. Sampling between the states of a wheel speed constrained trajectory overshoots
/// the maximum by up to about this much.
pub const NORMALISE_REPORT_TOLERANCE: f64 = 0.01;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Velocity of the chassis in its own frame.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChassisSpeeds {
    /// Forward velocity.
    ///
    /// Units: meters/second
    pub vx_ms: f64,

    /// Sideways velocity, positive to the left.
    ///
    /// Units: meters/second
    pub vy_ms: f64,

    /// Angular velocity, positive anticlockwise.
    ///
    /// Units: radians/second
    pub omega_rads: f64,
}

/// The inverse kinematics matrix for the last centre of rotation that was requested.
#[derive(Debug, Clone)]
pub(crate) struct InverseKinematicsCache {
    centre_of_rotation_m: Vector2<f64>,
    inverse_kinematics: DMatrix<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors in the configuration or use of a kinematics object.
#[derive(Debug, thiserror::Error)]
pub enum KinematicsError {
    #[error("A swerve drive needs at least 2 modules but {0} were given")]
    NotEnoughModules(usize),

    #[error("Expected {expected} module states but {found} were given")]
    ModuleCountMismatch { expected: usize, found: usize },

    #[error("Invalid drivetrain geometry: {0}")]
    InvalidGeometry(String),

    #[error("Could not compute the forward kinematics: {0}")]
    PseudoInverseFailed(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ChassisSpeeds {
    pub fn new(vx_ms: f64, vy_ms: f64, omega_rads: f64) -> Self {
        Self {
            vx_ms,
            vy_ms,
            omega_rads,
        }
    }

    /// Convert a field relative velocity into chassis speeds, given the heading of the robot on
    /// the field.
    pub fn from_field_relative(
        vx_ms: f64,
        vy_ms: f64,
        omega_rads: f64,
        robot_heading: &UnitComplex<f64>,
    ) -> Self {
        let robot_relative = robot_heading.inverse() * Vector2::new(vx_ms, vy_ms);

        Self::new(robot_relative.x, robot_relative.y, omega_rads)
    }

    pub(crate) fn as_vector(&self) -> DVector<f64> {
        DVector::from_column_slice(&[self.vx_ms, self.vy_ms, self.omega_rads])
    }

    pub(crate) fn from_vector(vector: &DVector<f64>) -> Self {
        Self::new(vector[0], vector[1], vector[2])
    }
}

impl InverseKinematicsCache {
    pub(crate) fn new(centre_of_rotation_m: Vector2<f64>, inverse_kinematics: DMatrix<f64>) -> Self {
        Self {
            centre_of_rotation_m,
            inverse_kinematics,
        }
    }

    pub(crate) fn centre_of_rotation_m(&self) -> Vector2<f64> {
        self.centre_of_rotation_m
    }

    /// Multiply the chassis speeds by the inverse kinematics matrix for the given centre of
    /// rotation, rebuilding the cached matrix with `build` first if the centre has changed.
    pub(crate) fn apply<F>(
        cache: &RefCell<Self>,
        centre_of_rotation_m: &Vector2<f64>,
        speeds: &ChassisSpeeds,
        build: F,
    ) -> DVector<f64>
    where
        F: FnOnce(&Vector2<f64>) -> DMatrix<f64>,
    {
        let mut cache = cache.borrow_mut();

        if cache.centre_of_rotation_m != *centre_of_rotation_m {
            trace!(
                "Rebuilding inverse kinematics for centre of rotation ({}, {})",
                centre_of_rotation_m.x,
                centre_of_rotation_m.y
            );
            cache.inverse_kinematics = build(centre_of_rotation_m);
            cache.centre_of_rotation_m = *centre_of_rotation_m;
        }

        &cache.inverse_kinematics * speeds.as_vector()
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

pub(crate) fn pseudo_inverse(matrix: &DMatrix<f64>) -> Result<DMatrix<f64>, KinematicsError> {
    matrix
        .clone()
        .pseudo_inverse(PSEUDO_INVERSE_EPS)
        .map_err(|e| KinematicsError::PseudoInverseFailed(e.to_string()))
}

/// Scale all speeds down by the same factor so that none exceeds `attainable_max_ms`.
///
/// Returns true if the fastest speed was more than [`NORMALISE_REPORT_TOLERANCE`] over the
/// maximum. Smaller overshoots are still scaled.
pub(crate) fn normalize_speeds(speeds: &mut [f64], attainable_max_ms: f64) -> bool {
    let max_ms = util::maths::max_abs(speeds);

    if max_ms > attainable_max_ms {
        let scale = attainable_max_ms / max_ms;
        for s in speeds.iter_mut() {
            *s *= scale;
        }
    }

    max_ms > attainable_max_ms * (1.0 + NORMALISE_REPORT_TOLERANCE)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_from_field_relative() {
        // Facing +Y, a field +X velocity is to the robot's right
        let speeds =
            ChassisSpeeds::from_field_relative(1.0, 0.0, 0.5, &UnitComplex::new(FRAC_PI_2));

        assert!(speeds.vx_ms.abs() < 1e-12);
        assert!((speeds.vy_ms + 1.0).abs() < 1e-12);
        assert_eq!(speeds.omega_rads, 0.5);
    }

    #[test]
    fn test_normalize_speeds() {
        let mut speeds = [1.0, -4.0, 2.0];
        assert!(normalize_speeds(&mut speeds, 2.0));
        assert_eq!(speeds, [0.5, -2.0, 1.0]);

        let mut speeds = [1.0, -2.0];
        assert!(!normalize_speeds(&mut speeds, 2.0));
        assert_eq!(speeds, [1.0, -2.0]);

        // Just over the maximum is scaled but not reported
        let mut speeds = [1.0, -2.01];
        assert!(!normalize_speeds(&mut speeds, 2.0));
        assert!((speeds[1] + 2.0).abs() < 1e-12);
        assert!((speeds[0] - 2.0 / 2.01).abs() < 1e-12);
    }
}
