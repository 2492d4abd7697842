//! Parameters structure for DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for drive control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    // ---- GEOMETRY ----
    /// The type and geometry of the drivetrain.
    pub drivetrain: DrivetrainParams,

    /// The point the chassis rotates about, relative to the centre of the robot. Not used by
    /// differential drives.
    ///
    /// Units: meters,
    /// Frame: Robot body
    #[serde(default)]
    pub centre_of_rotation_m: [f64; 2],

    // ---- CAPABILITIES ----
    /// Fastest speed any wheel or module can be driven at.
    ///
    /// Units: meters/second
    pub max_wheel_speed_ms: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Drivetrain geometry. All positions are relative to the centre of the robot.
///
/// Units: meters,
/// Frame: Robot body
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum DrivetrainParams {
    Mecanum {
        front_left_m: [f64; 2],
        front_right_m: [f64; 2],
        rear_left_m: [f64; 2],
        rear_right_m: [f64; 2],
    },
    Swerve {
        module_positions_m: Vec<[f64; 2]>,
    },
    Differential {
        track_width_m: f64,
    },
}
