//! # Trajectory library.
//!
//! This library plans smooth, feasible paths for wheeled robot chassis and converts between
//! whole-chassis velocity and individual wheel or module commands. It allows other crates in the
//! workspace to access items defined inside the trajectory crate.
//!
//! The planning pipeline is:
//!
//! ```text
//! waypoints -> control vectors -> splines -> pose+curvature samples -> timed trajectory
//! ```
//!
//! and is run once, off the control loop. The resulting [`trajectory::Trajectory`] is then
//! sampled every control cycle, with the sampled velocity converted into wheel demands by one of
//! the [`kinematics`] types.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Splines - interpolating curves through waypoints and their adaptive discretisation
pub mod spline;

/// Trajectory - time parameterisation of paths, constraints and sampling
pub mod trajectory;

/// Kinematics - converts chassis velocity to and from wheel/module speeds
pub mod kinematics;

/// Drive control module - samples the loaded trajectory and produces wheel demands each cycle
pub mod drive_ctrl;
