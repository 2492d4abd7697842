//! # Drive control module
//!
//! Drive control follows a planned trajectory. Each cycle it samples the trajectory at the
//! current time, converts the sampled path velocity and curvature into feed-forward chassis
//! speeds, and then into demands for each wheel or swerve module of the configured drivetrain.
//!
//! The chassis is driven facing along the path, so the chassis speeds are `(v, 0, v * k)` for
//! path velocity `v` and curvature `k`. Wheel demands are normalised so that none exceeds the
//! drivetrain's maximum wheel speed.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod drivetrain;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use drivetrain::*;
pub use params::*;
pub use state::*;

use crate::kinematics::KinematicsError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during DriveCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum DriveCtrlError {
    #[error("Could not load the DriveCtrl parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("The configured drivetrain is invalid: {0}")]
    DrivetrainError(#[from] KinematicsError),

    #[error("Could not create the DriveCtrl archives: {0}")]
    ArchiveInitError(String),

    #[error("DriveCtrl must be initialised before it can be processed")]
    NotInitialised,
}
