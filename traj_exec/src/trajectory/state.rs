//! A single timed state on a trajectory

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use util::{geom::Pose2, maths::lerp};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const NEAR_ZERO: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The state of the robot at one instant on a trajectory.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Time since the start of the trajectory.
    ///
    /// Units: seconds
    pub time_s: f64,

    /// Speed along the path, negative when the path is driven in reverse.
    ///
    /// Units: meters/second
    pub velocity_ms: f64,

    /// Acceleration along the path, held until the next state.
    ///
    /// Units: meters/second^2
    pub acceleration_mss: f64,

    pub pose: Pose2,

    /// Signed curvature of the path at this state.
    ///
    /// Units: 1/meters
    pub curvature_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State {
    /// Interpolate between this state and `end` by the fraction `i` of the time between them.
    ///
    /// The velocity and distance travelled follow from this state's constant acceleration, and the
    /// distance travelled is converted into a fraction of the straight line distance between the
    /// two poses to interpolate the pose and curvature.
    pub fn interpolate(&self, end: &State, i: f64) -> State {
        let new_time_s = lerp(self.time_s, end.time_s, i);
        let delta_t_s = new_time_s - self.time_s;

        let reversing = self.velocity_ms < 0.0
            || (self.velocity_ms.abs() < NEAR_ZERO && self.acceleration_mss < 0.0);

        let new_velocity_ms = self.velocity_ms + self.acceleration_mss * delta_t_s;

        let mut new_s_m =
            self.velocity_ms * delta_t_s + 0.5 * self.acceleration_mss * delta_t_s.powi(2);
        if reversing {
            new_s_m = -new_s_m;
        }

        let dist_m = self.pose.distance_to(&end.pose);
        let interp_frac = if dist_m > NEAR_ZERO {
            new_s_m / dist_m
        } else {
            i
        };

        State {
            time_s: new_time_s,
            velocity_ms: new_velocity_ms,
            acceleration_mss: self.acceleration_mss,
            pose: self.pose.interpolate(&end.pose, interp_frac),
            curvature_m: lerp(self.curvature_m, end.curvature_m, interp_frac),
        }
    }
}
