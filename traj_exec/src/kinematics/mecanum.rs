//! Mecanum drive kinematics

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{cell::RefCell, f64::consts::FRAC_1_SQRT_2};

use nalgebra::{DMatrix, DVector, Vector2};
use serde::{Deserialize, Serialize};

use super::{normalize_speeds, pseudo_inverse, ChassisSpeeds, InverseKinematicsCache, KinematicsError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Kinematics for a four wheeled mecanum drive.
///
/// Wheels are always ordered front left, front right, rear left, rear right.
#[derive(Debug, Clone)]
pub struct MecanumDriveKinematics {
    /// Position of each wheel relative to the centre of the robot.
    ///
    /// Units: meters
    wheel_positions_m: [Vector2<f64>; 4],

    cache: RefCell<InverseKinematicsCache>,

    /// Pseudo-inverse of the inverse kinematics about the centre of the robot.
    forward_kinematics: DMatrix<f64>,
}

/// Speed of each mecanum wheel.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct MecanumDriveWheelSpeeds {
    /// Units: meters/second
    pub front_left_ms: f64,

    /// Units: meters/second
    pub front_right_ms: f64,

    /// Units: meters/second
    pub rear_left_ms: f64,

    /// Units: meters/second
    pub rear_right_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MecanumDriveKinematics {
    /// Create a new mecanum drive from the positions of its wheels relative to the centre of the
    /// robot.
    pub fn new(
        front_left_m: Vector2<f64>,
        front_right_m: Vector2<f64>,
        rear_left_m: Vector2<f64>,
        rear_right_m: Vector2<f64>,
    ) -> Result<Self, KinematicsError> {
        let wheel_positions_m = [front_left_m, front_right_m, rear_left_m, rear_right_m];
        let centre_m = Vector2::zeros();

        let inverse_kinematics = build_inverse_kinematics(&wheel_positions_m, &centre_m);
        let forward_kinematics = pseudo_inverse(&inverse_kinematics)?;

        Ok(Self {
            wheel_positions_m,
            cache: RefCell::new(InverseKinematicsCache::new(centre_m, inverse_kinematics)),
            forward_kinematics,
        })
    }

    /// The centre of rotation the cached inverse kinematics were built for.
    pub fn cached_centre_of_rotation_m(&self) -> Vector2<f64> {
        self.cache.borrow().centre_of_rotation_m()
    }

    /// Get the wheel speeds for the given chassis speeds, rotating about the centre of the robot.
    pub fn to_wheel_speeds(&self, speeds: &ChassisSpeeds) -> MecanumDriveWheelSpeeds {
        self.to_wheel_speeds_about(speeds, &Vector2::zeros())
    }

    /// Get the wheel speeds for the given chassis speeds, rotating about `centre_of_rotation_m`.
    ///
    /// The wheel speeds are not normalised, so may be above what the wheels can achieve.
    pub fn to_wheel_speeds_about(
        &self,
        speeds: &ChassisSpeeds,
        centre_of_rotation_m: &Vector2<f64>,
    ) -> MecanumDriveWheelSpeeds {
        let wheel_speeds =
            InverseKinematicsCache::apply(&self.cache, centre_of_rotation_m, speeds, |cor| {
                build_inverse_kinematics(&self.wheel_positions_m, cor)
            });

        MecanumDriveWheelSpeeds::new(
            wheel_speeds[0],
            wheel_speeds[1],
            wheel_speeds[2],
            wheel_speeds[3],
        )
    }

    /// Get the least squares chassis speeds which best explain the given wheel speeds.
    pub fn to_chassis_speeds(&self, wheel_speeds: &MecanumDriveWheelSpeeds) -> ChassisSpeeds {
        let wheel_vector = DVector::from_column_slice(&wheel_speeds.as_array());

        ChassisSpeeds::from_vector(&(&self.forward_kinematics * wheel_vector))
    }
}

impl MecanumDriveWheelSpeeds {
    pub fn new(
        front_left_ms: f64,
        front_right_ms: f64,
        rear_left_ms: f64,
        rear_right_ms: f64,
    ) -> Self {
        Self {
            front_left_ms,
            front_right_ms,
            rear_left_ms,
            rear_right_ms,
        }
    }

    /// Speeds in wheel order, front left, front right, rear left, rear right.
    pub fn as_array(&self) -> [f64; 4] {
        [
            self.front_left_ms,
            self.front_right_ms,
            self.rear_left_ms,
            self.rear_right_ms,
        ]
    }

    /// Scale all wheel speeds down by the same factor if any is faster than `attainable_max_ms`.
    ///
    /// Returns true if the fastest was more than `NORMALISE_REPORT_TOLERANCE` over the maximum.
    pub fn normalize(&mut self, attainable_max_ms: f64) -> bool {
        let mut speeds = self.as_array();
        let scaled = normalize_speeds(&mut speeds, attainable_max_ms);

        *self = Self::new(speeds[0], speeds[1], speeds[2], speeds[3]);

        scaled
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the 4x3 matrix taking `[vx, vy, omega]` to the wheel speeds, for rotation about the
/// given point.
fn build_inverse_kinematics(
    wheel_positions_m: &[Vector2<f64>; 4],
    centre_of_rotation_m: &Vector2<f64>,
) -> DMatrix<f64> {
    let fl = wheel_positions_m[0] - centre_of_rotation_m;
    let fr = wheel_positions_m[1] - centre_of_rotation_m;
    let rl = wheel_positions_m[2] - centre_of_rotation_m;
    let rr = wheel_positions_m[3] - centre_of_rotation_m;

    #[rustfmt::skip]
    let matrix = DMatrix::from_row_slice(4, 3, &[
        1.0, -1.0, -(fl.x + fl.y),
        1.0,  1.0,   fr.x - fr.y,
        1.0,  1.0,   rl.x - rl.y,
        1.0, -1.0, -(rr.x + rr.y),
    ]);

    matrix * FRAC_1_SQRT_2
}
