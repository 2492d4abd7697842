//! # Trajectory module
//!
//! A trajectory is a time indexed sequence of [`State`]s along a path, generated from waypoints by
//! the functions in [`generator`] and then sampled at any time by a path follower. Generation is a
//! one shot planning operation, while sampling is cheap (`O(log n)`) and done every control cycle.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod config;
pub mod constraint;
pub mod generator;
mod state;
mod time_param;
mod traj;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use config::*;
pub use state::State;
pub use time_param::time_parameterize;
pub use traj::Trajectory;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Tolerance used when comparing times, velocities and accelerations.
pub(crate) const EPSILON: f64 = 1e-6;

/// Timestamps closer together than this are considered equal when sampling.
pub(crate) const TIME_EPSILON_S: f64 = 1e-9;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while building or generating a trajectory.
#[derive(Debug, thiserror::Error)]
pub enum TrajectoryError {
    #[error("A trajectory must contain at least one state")]
    NoStates,

    #[error(
        "State {index} has time {time_s} s which is before the previous state's time of \
        {previous_time_s} s"
    )]
    NonMonotonicTime {
        index: usize,
        time_s: f64,
        previous_time_s: f64,
    },

    #[error("Invalid trajectory configuration: {0}")]
    InvalidConfig(String),

    #[error(
        "The requested start velocity of {requested_ms} m/s cannot be achieved, the path limits it \
        to {achievable_ms} m/s"
    )]
    StartVelocityInfeasible {
        requested_ms: f64,
        achievable_ms: f64,
    },

    #[error(
        "The requested end velocity of {requested_ms} m/s cannot be reached, the path limits it to \
        {achievable_ms} m/s"
    )]
    EndVelocityInfeasible {
        requested_ms: f64,
        achievable_ms: f64,
    },

    #[error(
        "Constraint {constraint} gave a minimum acceleration of {min_acceleration_mss} m/s^2 which \
        is greater than its maximum of {max_acceleration_mss} m/s^2"
    )]
    InfeasibleConstraint {
        constraint: String,
        min_acceleration_mss: f64,
        max_acceleration_mss: f64,
    },

    #[error("The trajectory stalls with zero velocity and acceleration before point {0}")]
    Stalled(usize),
}
