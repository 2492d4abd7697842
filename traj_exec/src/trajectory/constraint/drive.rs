//! Constraints which keep every wheel of a drivetrain below its maximum speed
//!
//! The chassis is assumed to face along the path, so the robot relative chassis speeds at a
//! point are `(v, 0, v * curvature)`. Wheel speeds are linear in `v`, so the fastest achievable
//! speed is `v` scaled by the same factor that would normalise the fastest wheel.
//!
//! Mecanum and swerve constraints rotate the chassis about the same centre of rotation that drive
//! control uses, so a trajectory which satisfies them never needs its wheel demands scaled down.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use util::{geom::Pose2, maths::max_abs};

use super::TrajectoryConstraint;
use crate::kinematics::{
    ChassisSpeeds, DifferentialDriveKinematics, MecanumDriveKinematics, SwerveDriveKinematics,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Limits the path velocity so that no mecanum wheel exceeds its maximum speed.
#[derive(Debug, Clone)]
pub struct MecanumDriveKinematicsConstraint {
    kinematics: MecanumDriveKinematics,

    /// Units: meters
    centre_of_rotation_m: Vector2<f64>,

    /// Units: meters/second
    max_wheel_speed_ms: f64,
}

/// Limits the path velocity so that no swerve module exceeds its maximum speed.
#[derive(Debug, Clone)]
pub struct SwerveDriveKinematicsConstraint {
    kinematics: SwerveDriveKinematics,

    /// Units: meters
    centre_of_rotation_m: Vector2<f64>,

    /// Units: meters/second
    max_wheel_speed_ms: f64,
}

/// Limits the path velocity so that neither side of a differential drive exceeds its maximum
/// speed.
#[derive(Debug, Clone)]
pub struct DifferentialDriveKinematicsConstraint {
    kinematics: DifferentialDriveKinematics,

    /// Units: meters/second
    max_wheel_speed_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MecanumDriveKinematicsConstraint {
    /// Constrain a drive which rotates about the centre of the robot.
    pub fn new(kinematics: MecanumDriveKinematics, max_wheel_speed_ms: f64) -> Self {
        Self {
            kinematics,
            centre_of_rotation_m: Vector2::zeros(),
            max_wheel_speed_ms,
        }
    }

    /// Rotate the chassis about `centre_of_rotation_m` instead of the centre of the robot.
    pub fn with_centre_of_rotation(mut self, centre_of_rotation_m: Vector2<f64>) -> Self {
        self.centre_of_rotation_m = centre_of_rotation_m;
        self
    }
}

impl TrajectoryConstraint for MecanumDriveKinematicsConstraint {
    fn max_velocity_ms(&self, _pose: &Pose2, curvature_m: f64, velocity_ms: f64) -> f64 {
        let wheel_speeds = self.kinematics.to_wheel_speeds_about(
            &path_chassis_speeds(velocity_ms, curvature_m),
            &self.centre_of_rotation_m,
        );

        limit_velocity(velocity_ms, &wheel_speeds.as_array(), self.max_wheel_speed_ms)
    }
}

impl SwerveDriveKinematicsConstraint {
    /// Constrain a drive which rotates about the centre of the robot.
    pub fn new(kinematics: SwerveDriveKinematics, max_wheel_speed_ms: f64) -> Self {
        Self {
            kinematics,
            centre_of_rotation_m: Vector2::zeros(),
            max_wheel_speed_ms,
        }
    }

    /// Rotate the chassis about `centre_of_rotation_m` instead of the centre of the robot.
    pub fn with_centre_of_rotation(mut self, centre_of_rotation_m: Vector2<f64>) -> Self {
        self.centre_of_rotation_m = centre_of_rotation_m;
        self
    }
}

impl TrajectoryConstraint for SwerveDriveKinematicsConstraint {
    fn max_velocity_ms(&self, _pose: &Pose2, curvature_m: f64, velocity_ms: f64) -> f64 {
        let speeds_ms: Vec<f64> = self
            .kinematics
            .to_module_states_about(
                &path_chassis_speeds(velocity_ms, curvature_m),
                &self.centre_of_rotation_m,
            )
            .iter()
            .map(|s| s.speed_ms)
            .collect();

        limit_velocity(velocity_ms, &speeds_ms, self.max_wheel_speed_ms)
    }
}

impl DifferentialDriveKinematicsConstraint {
    pub fn new(kinematics: DifferentialDriveKinematics, max_wheel_speed_ms: f64) -> Self {
        Self {
            kinematics,
            max_wheel_speed_ms,
        }
    }
}

impl TrajectoryConstraint for DifferentialDriveKinematicsConstraint {
    fn max_velocity_ms(&self, _pose: &Pose2, curvature_m: f64, velocity_ms: f64) -> f64 {
        let wheel_speeds = self
            .kinematics
            .to_wheel_speeds(&path_chassis_speeds(velocity_ms, curvature_m));

        limit_velocity(
            velocity_ms,
            &[wheel_speeds.left_ms, wheel_speeds.right_ms],
            self.max_wheel_speed_ms,
        )
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn path_chassis_speeds(velocity_ms: f64, curvature_m: f64) -> ChassisSpeeds {
    ChassisSpeeds::new(velocity_ms, 0.0, velocity_ms * curvature_m)
}

/// Scale `velocity_ms` down so the fastest of `wheel_speeds_ms`, found at that velocity, would be
/// at `max_wheel_speed_ms`.
fn limit_velocity(velocity_ms: f64, wheel_speeds_ms: &[f64], max_wheel_speed_ms: f64) -> f64 {
    let fastest_ms = max_abs(wheel_speeds_ms);

    if fastest_ms > max_wheel_speed_ms {
        velocity_ms * max_wheel_speed_ms / fastest_ms
    } else {
        velocity_ms
    }
}
