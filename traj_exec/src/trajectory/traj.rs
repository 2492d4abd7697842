//! Time indexed trajectory

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use util::{
    geom::{Pose2, Transform2},
    maths::get_ang_dist,
};

use super::{State, TrajectoryError, EPSILON, TIME_EPSILON_S};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A sequence of states ordered by non-decreasing time.
///
/// A trajectory always holds at least one state and is never modified after it is built, the
/// transforms below return new trajectories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    states: Vec<State>,

    /// Time of the last state.
    ///
    /// Units: seconds
    total_time_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Trajectory {
    /// Create a new trajectory from the given states.
    ///
    /// The states must not be empty and their times must be non-decreasing.
    pub fn new(states: Vec<State>) -> Result<Self, TrajectoryError> {
        for (i, pair) in states.windows(2).enumerate() {
            // Written so that NaN times are also rejected
            if !(pair[1].time_s >= pair[0].time_s) {
                return Err(TrajectoryError::NonMonotonicTime {
                    index: i + 1,
                    time_s: pair[1].time_s,
                    previous_time_s: pair[0].time_s,
                });
            }
        }

        let total_time_s = match states.last() {
            Some(s) => s.time_s,
            None => return Err(TrajectoryError::NoStates),
        };

        Ok(Self {
            states,
            total_time_s,
        })
    }

    /// A trajectory which holds the robot stationary at the given pose.
    pub fn do_nothing(pose: Pose2) -> Self {
        Self {
            states: vec![State {
                time_s: 0.0,
                velocity_ms: 0.0,
                acceleration_mss: 0.0,
                pose,
                curvature_m: 0.0,
            }],
            total_time_s: 0.0,
        }
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Duration of the trajectory.
    ///
    /// Units: seconds
    pub fn total_time_s(&self) -> f64 {
        self.total_time_s
    }

    pub fn initial_pose(&self) -> Pose2 {
        self.states[0].pose
    }

    pub fn final_pose(&self) -> Pose2 {
        self.states[self.states.len() - 1].pose
    }

    /// Sample the trajectory at the given time.
    ///
    /// Times before the first state return the first state and times after the end return the
    /// last state.
    pub fn sample(&self, time_s: f64) -> State {
        let first = self.states[0];
        let last = self.states[self.states.len() - 1];

        if time_s <= first.time_s {
            return first;
        }
        if time_s >= self.total_time_s {
            return last;
        }

        // Index of the first state at or after the requested time. Since the time is strictly
        // between the first and last states this is in 1..len.
        let high = self.states.partition_point(|s| s.time_s < time_s);
        let prev = &self.states[high - 1];
        let next = &self.states[high];

        if (next.time_s - prev.time_s).abs() < TIME_EPSILON_S {
            return *next;
        }

        prev.interpolate(next, (time_s - prev.time_s) / (next.time_s - prev.time_s))
    }

    /// Transform every pose in the trajectory so that the first pose is moved by `transform`,
    /// with the rest of the trajectory following rigidly.
    pub fn transform_by(&self, transform: &Transform2) -> Self {
        let first_pose = self.initial_pose();
        let new_first_pose = first_pose.transform_by(transform);

        self.map_poses(|pose| new_first_pose.transform_by(&Transform2::between(&first_pose, pose)))
    }

    /// Express every pose in the trajectory in the frame of `pose`.
    pub fn relative_to(&self, pose: &Pose2) -> Self {
        self.map_poses(|p| p.relative_to(pose))
    }

    /// Append `other` to the end of this trajectory, shifting its states in time by this
    /// trajectory's duration.
    ///
    /// The first state of `other` is dropped if its pose coincides with this trajectory's last
    /// pose, since it would only repeat that state.
    pub fn concatenate(&self, other: &Trajectory) -> Self {
        let mut states = self.states.clone();

        let last_pose = self.final_pose();
        let other_first_pose = other.initial_pose();
        let skip = if last_pose.distance_to(&other_first_pose) < EPSILON
            && get_ang_dist(last_pose.get_heading(), other_first_pose.get_heading()).abs()
                < EPSILON
        {
            1
        } else {
            0
        };

        states.extend(other.states.iter().skip(skip).map(|s| State {
            time_s: s.time_s + self.total_time_s,
            ..*s
        }));

        Self {
            total_time_s: self.total_time_s + other.total_time_s,
            states,
        }
    }

    fn map_poses<F>(&self, f: F) -> Self
    where
        F: Fn(&Pose2) -> Pose2,
    {
        Self {
            states: self
                .states
                .iter()
                .map(|s| State {
                    pose: f(&s.pose),
                    ..*s
                })
                .collect(),
            total_time_s: self.total_time_s,
        }
    }
}
