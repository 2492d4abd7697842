//! The drivetrain being controlled and the demands sent to it

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::Serialize;

use super::DrivetrainParams;
use crate::{
    kinematics::{
        ChassisSpeeds, DifferentialDriveKinematics, DifferentialDriveWheelSpeeds,
        KinematicsError, MecanumDriveKinematics, MecanumDriveWheelSpeeds, SwerveDriveKinematics,
        SwerveModuleState,
    },
    trajectory::constraint::{
        DifferentialDriveKinematicsConstraint, MecanumDriveKinematicsConstraint,
        SwerveDriveKinematicsConstraint, TrajectoryConstraint,
    },
};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Kinematics of the drivetrain being controlled.
#[derive(Debug, Clone)]
pub enum Drivetrain {
    Mecanum(MecanumDriveKinematics),
    Swerve(SwerveDriveKinematics),
    Differential(DifferentialDriveKinematics),
}

/// Demands for every wheel or module of a drivetrain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum WheelDemands {
    Mecanum(MecanumDriveWheelSpeeds),
    Swerve(Vec<SwerveModuleState>),
    Differential(DifferentialDriveWheelSpeeds),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Drivetrain {
    pub fn from_params(params: &DrivetrainParams) -> Result<Self, KinematicsError> {
        Ok(match params {
            DrivetrainParams::Mecanum {
                front_left_m,
                front_right_m,
                rear_left_m,
                rear_right_m,
            } => Drivetrain::Mecanum(MecanumDriveKinematics::new(
                Vector2::from(*front_left_m),
                Vector2::from(*front_right_m),
                Vector2::from(*rear_left_m),
                Vector2::from(*rear_right_m),
            )?),
            DrivetrainParams::Swerve { module_positions_m } => {
                Drivetrain::Swerve(SwerveDriveKinematics::new(
                    module_positions_m.iter().map(|p| Vector2::from(*p)).collect(),
                )?)
            }
            DrivetrainParams::Differential { track_width_m } => {
                Drivetrain::Differential(DifferentialDriveKinematics::new(*track_width_m)?)
            }
        })
    }

    /// Get the (unnormalised) demands needed to move the chassis at the given speeds, rotating
    /// about `centre_of_rotation_m`.
    ///
    /// Differential drives always rotate about their centre, and can't move sideways.
    pub fn to_wheel_demands(
        &self,
        speeds: &ChassisSpeeds,
        centre_of_rotation_m: &Vector2<f64>,
    ) -> WheelDemands {
        match self {
            Drivetrain::Mecanum(kin) => {
                WheelDemands::Mecanum(kin.to_wheel_speeds_about(speeds, centre_of_rotation_m))
            }
            Drivetrain::Swerve(kin) => {
                WheelDemands::Swerve(kin.to_module_states_about(speeds, centre_of_rotation_m))
            }
            Drivetrain::Differential(kin) => {
                WheelDemands::Differential(kin.to_wheel_speeds(speeds))
            }
        }
    }

    /// A trajectory constraint which keeps every wheel of this drivetrain below the given speed
    /// when rotating about `centre_of_rotation_m`, as [`Drivetrain::to_wheel_demands`] does.
    pub fn constraint(
        &self,
        max_wheel_speed_ms: f64,
        centre_of_rotation_m: &Vector2<f64>,
    ) -> Box<dyn TrajectoryConstraint> {
        match self {
            Drivetrain::Mecanum(kin) => Box::new(
                MecanumDriveKinematicsConstraint::new(kin.clone(), max_wheel_speed_ms)
                    .with_centre_of_rotation(*centre_of_rotation_m),
            ),
            Drivetrain::Swerve(kin) => Box::new(
                SwerveDriveKinematicsConstraint::new(kin.clone(), max_wheel_speed_ms)
                    .with_centre_of_rotation(*centre_of_rotation_m),
            ),
            Drivetrain::Differential(kin) => Box::new(
                DifferentialDriveKinematicsConstraint::new(*kin, max_wheel_speed_ms),
            ),
        }
    }
}

impl WheelDemands {
    /// Scale every speed down by the same factor if any is faster than `attainable_max_ms`.
    ///
    /// Returns true if the fastest was more than `NORMALISE_REPORT_TOLERANCE` over the maximum.
    pub fn normalize(&mut self, attainable_max_ms: f64) -> bool {
        match self {
            WheelDemands::Mecanum(s) => s.normalize(attainable_max_ms),
            WheelDemands::Swerve(s) => {
                SwerveDriveKinematics::normalize_module_speeds(s, attainable_max_ms)
            }
            WheelDemands::Differential(s) => s.normalize(attainable_max_ms),
        }
    }

    /// Speed of every wheel or module, in declaration order.
    pub fn speeds_ms(&self) -> Vec<f64> {
        match self {
            WheelDemands::Mecanum(s) => s.as_array().to_vec(),
            WheelDemands::Swerve(s) => s.iter().map(|m| m.speed_ms).collect(),
            WheelDemands::Differential(s) => vec![s.left_ms, s.right_ms],
        }
    }

    /// A flat row for archiving: the speeds followed by, for swerve drives, the module angles in
    /// radians.
    pub(crate) fn to_record(&self) -> Vec<f64> {
        let mut record = self.speeds_ms();

        if let WheelDemands::Swerve(s) = self {
            record.extend(s.iter().map(|m| m.angle_rad()));
        }

        record
    }
}
