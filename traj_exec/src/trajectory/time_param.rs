//! Time parameterisation of a path
//!
//! The path is a list of pose and curvature samples. Each sample is given the highest velocity
//! allowed by the global limits and by every constraint, in three passes:
//!
//! 1. Forward pass from the start velocity, limiting each point to the velocity reachable from
//!    the point before it under the maximum acceleration.
//! 2. Backward pass from the end velocity, limiting each point to the velocity from which the
//!    point after it can be reached under the maximum deceleration.
//! 3. Integrate along the path to find the time and acceleration at every point.
//!
//! Where a constraint limits acceleration below the global maximum, the acceleration of the
//! previous point is reduced and the point is recomputed.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;

use super::{
    constraint::TrajectoryConstraint, State, Trajectory, TrajectoryConfig, TrajectoryError,
    EPSILON,
};
use crate::spline::PoseWithCurvature;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A point on the path with its distance and motion limits, before time is known.
#[derive(Debug, Copy, Clone)]
struct ConstrainedState {
    point: PoseWithCurvature,

    /// Distance along the path from the first point.
    ///
    /// Units: meters
    distance_m: f64,

    /// Units: meters/second
    max_velocity_ms: f64,

    /// Units: meters/second^2
    min_acceleration_mss: f64,

    /// Units: meters/second^2
    max_acceleration_mss: f64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Time parameterise the given path samples under the limits of the configuration.
///
/// The velocities in `config` are magnitudes, if `config.reversed` is set the velocities and
/// accelerations of the returned trajectory are negated.
pub fn time_parameterize(
    points: &[PoseWithCurvature],
    config: &TrajectoryConfig,
) -> Result<Trajectory, TrajectoryError> {
    validate(points, config)?;

    let reversed = config.reversed;
    let max_velocity_ms = config.max_velocity_ms;
    let max_accel_mss = config.max_acceleration_mss;
    let constraints = config.constraints();

    let mut states: Vec<ConstrainedState> = Vec::with_capacity(points.len());

    // Forward pass. The predecessor of the first point is the first point itself, at the start
    // velocity.
    let mut predecessor = ConstrainedState {
        point: points[0],
        distance_m: 0.0,
        max_velocity_ms: config.start_velocity_ms,
        min_acceleration_mss: -max_accel_mss,
        max_acceleration_mss: max_accel_mss,
    };

    for point in points {
        let ds_m = point.pose.distance_to(&predecessor.point.pose);

        let mut state = ConstrainedState {
            point: *point,
            distance_m: predecessor.distance_m + ds_m,
            ..predecessor
        };

        loop {
            // Fastest velocity reachable from the predecessor, capped by the global maximum
            let reachable_ms = (predecessor.max_velocity_ms.powi(2)
                + 2.0 * predecessor.max_acceleration_mss * ds_m)
                .max(0.0)
                .sqrt();
            state.max_velocity_ms = max_velocity_ms.min(reachable_ms);
            state.min_acceleration_mss = -max_accel_mss;
            state.max_acceleration_mss = max_accel_mss;

            for constraint in constraints {
                state.max_velocity_ms = state.max_velocity_ms.min(constraint.max_velocity_ms(
                    &state.point.pose,
                    state.point.curvature_m,
                    state.max_velocity_ms,
                ));
            }

            enforce_acceleration_limits(reversed, constraints, &mut state)?;

            if ds_m < EPSILON {
                break;
            }

            let actual_accel_mss = (state.max_velocity_ms.powi(2)
                - predecessor.max_velocity_ms.powi(2))
                / (2.0 * ds_m);

            if state.max_acceleration_mss < actual_accel_mss - EPSILON {
                // This point can't accelerate as hard as the predecessor would like, so lower
                // the predecessor's acceleration and try again.
                predecessor.max_acceleration_mss = state.max_acceleration_mss;
            } else {
                if actual_accel_mss > predecessor.min_acceleration_mss {
                    predecessor.max_acceleration_mss = actual_accel_mss;
                }
                break;
            }
        }

        if let Some(last) = states.last_mut() {
            *last = predecessor;
        }
        states.push(state);
        predecessor = state;
    }

    let last_index = states.len() - 1;

    // The end velocity must be reachable before the backward pass can only lower velocities.
    if states[last_index].max_velocity_ms < config.end_velocity_ms - EPSILON {
        return Err(TrajectoryError::EndVelocityInfeasible {
            requested_ms: config.end_velocity_ms,
            achievable_ms: states[last_index].max_velocity_ms,
        });
    }

    // Backward pass, with the successor of the last point being the last point itself at the end
    // velocity.
    let mut successor = ConstrainedState {
        max_velocity_ms: config.end_velocity_ms,
        min_acceleration_mss: -max_accel_mss,
        max_acceleration_mss: max_accel_mss,
        ..states[last_index]
    };

    for i in (0..=last_index).rev() {
        let mut state = states[i];

        // Negative since we're going backwards
        let ds_m = state.distance_m - successor.distance_m;

        loop {
            let new_max_velocity_ms = (successor.max_velocity_ms.powi(2)
                + 2.0 * successor.min_acceleration_mss * ds_m)
                .max(0.0)
                .sqrt();

            if new_max_velocity_ms >= state.max_velocity_ms {
                break;
            }

            state.max_velocity_ms = new_max_velocity_ms;

            enforce_acceleration_limits(reversed, constraints, &mut state)?;

            if ds_m > -EPSILON {
                break;
            }

            let actual_accel_mss = (state.max_velocity_ms.powi(2)
                - successor.max_velocity_ms.powi(2))
                / (2.0 * ds_m);

            if state.min_acceleration_mss > actual_accel_mss + EPSILON {
                successor.min_acceleration_mss = state.min_acceleration_mss;
            } else {
                successor.min_acceleration_mss = actual_accel_mss;
                break;
            }
        }

        if i < last_index {
            states[i + 1] = successor;
        }
        states[i] = state;
        successor = state;
    }

    if states[0].max_velocity_ms < config.start_velocity_ms - EPSILON {
        return Err(TrajectoryError::StartVelocityInfeasible {
            requested_ms: config.start_velocity_ms,
            achievable_ms: states[0].max_velocity_ms,
        });
    }

    // Integrate along the path to find the time of each state
    let sign = if reversed { -1.0 } else { 1.0 };
    let mut traj_states: Vec<State> = Vec::with_capacity(states.len());
    let mut time_s = 0.0;
    let mut distance_m = 0.0;
    let mut velocity_ms: f64 = 0.0;

    for (i, state) in states.iter().enumerate() {
        let ds_m = state.distance_m - distance_m;

        let accel_mss = if ds_m.abs() > EPSILON {
            (state.max_velocity_ms.powi(2) - velocity_ms.powi(2)) / (2.0 * ds_m)
        } else {
            0.0
        };

        let mut dt_s = 0.0;
        if i > 0 {
            traj_states[i - 1].acceleration_mss = sign * accel_mss;

            if accel_mss.abs() > EPSILON {
                dt_s = (state.max_velocity_ms - velocity_ms) / accel_mss;
            } else if velocity_ms.abs() > EPSILON {
                dt_s = ds_m / velocity_ms;
            } else if ds_m.abs() > EPSILON {
                return Err(TrajectoryError::Stalled(i));
            }
        }

        velocity_ms = state.max_velocity_ms;
        distance_m = state.distance_m;
        time_s += dt_s;

        traj_states.push(State {
            time_s,
            velocity_ms: sign * velocity_ms,
            acceleration_mss: sign * accel_mss,
            pose: state.point.pose,
            curvature_m: state.point.curvature_m,
        });
    }

    debug!(
        "Time parameterised {} points over {:.3} m into a {:.3} s trajectory",
        traj_states.len(),
        distance_m,
        time_s
    );

    Trajectory::new(traj_states)
}

fn validate(points: &[PoseWithCurvature], config: &TrajectoryConfig) -> Result<(), TrajectoryError> {
    let invalid = |msg: String| Err(TrajectoryError::InvalidConfig(msg));

    if points.is_empty() {
        return invalid("no points to parameterise".into());
    }
    if !(config.max_velocity_ms > 0.0) {
        return invalid(format!(
            "max velocity must be positive, got {} m/s",
            config.max_velocity_ms
        ));
    }
    if !(config.max_acceleration_mss > 0.0) {
        return invalid(format!(
            "max acceleration must be positive, got {} m/s^2",
            config.max_acceleration_mss
        ));
    }
    if !(config.start_velocity_ms >= 0.0) || !(config.end_velocity_ms >= 0.0) {
        return invalid(format!(
            "start and end velocities must be non-negative magnitudes, got {} and {} m/s",
            config.start_velocity_ms, config.end_velocity_ms
        ));
    }
    if config.start_velocity_ms > config.max_velocity_ms + EPSILON {
        return Err(TrajectoryError::StartVelocityInfeasible {
            requested_ms: config.start_velocity_ms,
            achievable_ms: config.max_velocity_ms,
        });
    }

    Ok(())
}

/// Narrow the acceleration limits of the state to those allowed by every constraint.
fn enforce_acceleration_limits(
    reversed: bool,
    constraints: &[Box<dyn TrajectoryConstraint>],
    state: &mut ConstrainedState,
) -> Result<(), TrajectoryError> {
    let factor = if reversed { -1.0 } else { 1.0 };

    for constraint in constraints {
        let min_max = constraint.min_max_acceleration(
            &state.point.pose,
            state.point.curvature_m,
            state.max_velocity_ms * factor,
        );

        if min_max.min_acceleration_mss > min_max.max_acceleration_mss {
            return Err(TrajectoryError::InfeasibleConstraint {
                constraint: format!("{:?}", constraint),
                min_acceleration_mss: min_max.min_acceleration_mss,
                max_acceleration_mss: min_max.max_acceleration_mss,
            });
        }

        // Driving backwards swaps which limit slows the robot down
        let (min_mss, max_mss) = if reversed {
            (-min_max.max_acceleration_mss, -min_max.min_acceleration_mss)
        } else {
            (min_max.min_acceleration_mss, min_max.max_acceleration_mss)
        };

        state.min_acceleration_mss = state.min_acceleration_mss.max(min_mss);
        state.max_acceleration_mss = state.max_acceleration_mss.min(max_mss);
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::trajectory::constraint::{CentripetalAccelerationConstraint, MinMax};
    use util::geom::Pose2;

    /// Samples every `step_m` along a straight line of the given length.
    fn straight_points(length_m: f64, step_m: f64) -> Vec<PoseWithCurvature> {
        let num = (length_m / step_m).round() as usize;
        (0..=num)
            .map(|i| PoseWithCurvature::new(Pose2::new(i as f64 * step_m, 0.0, 0.0), 0.0))
            .collect()
    }

    fn assert_feasible(traj: &Trajectory, config: &TrajectoryConfig) {
        let states = traj.states();

        for pair in states.windows(2) {
            assert!(pair[1].time_s > pair[0].time_s);

            let dv = pair[1].velocity_ms - pair[0].velocity_ms;
            let dt = pair[1].time_s - pair[0].time_s;
            assert!((dv / dt).abs() <= config.max_acceleration_mss + 1e-6);
        }

        for s in states {
            assert!(s.velocity_ms.abs() <= config.max_velocity_ms + 1e-6);
            assert!(s.acceleration_mss.abs() <= config.max_acceleration_mss + 1e-6);
        }
    }

    #[test]
    fn test_trapezoidal_profile() {
        let points = straight_points(10.0, 0.1);
        let config = TrajectoryConfig::new(2.0, 2.0);

        let traj = time_parameterize(&points, &config).unwrap();
        assert_feasible(&traj, &config);

        // 1 s accelerating over 1 m, 4 s cruising over 8 m, 1 s braking over 1 m
        assert!((traj.total_time_s() - 6.0).abs() < 1e-6);
        assert!((traj.sample(3.0).velocity_ms - 2.0).abs() < 1e-9);
        assert_eq!(traj.states()[0].velocity_ms, 0.0);
        assert!(traj.states()[traj.states().len() - 1].velocity_ms.abs() < 1e-9);
    }

    #[test]
    fn test_triangular_profile() {
        // Too short to reach the max velocity
        let points = straight_points(1.0, 0.05);
        let config = TrajectoryConfig::new(5.0, 1.0);

        let traj = time_parameterize(&points, &config).unwrap();
        assert_feasible(&traj, &config);

        // Peak of sqrt(a * d) = 1 m/s at the middle, 1 s each way
        assert!((traj.total_time_s() - 2.0).abs() < 1e-6);
        assert!((traj.sample(1.0).velocity_ms - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_reversed() {
        let points = straight_points(10.0, 0.1);
        let config = TrajectoryConfig::new(2.0, 2.0).with_reversed(true);

        let traj = time_parameterize(&points, &config).unwrap();

        assert!((traj.total_time_s() - 6.0).abs() < 1e-6);
        assert!((traj.sample(3.0).velocity_ms + 2.0).abs() < 1e-9);
        assert!(traj.states()[0].acceleration_mss < 0.0);
    }

    #[test]
    fn test_centripetal_constraint() {
        // Quarter turns of 1 m radius, about 1.57 m long
        let points: Vec<PoseWithCurvature> = (0..=40)
            .map(|i| {
                let theta = i as f64 * std::f64::consts::FRAC_PI_2 / 40.0;
                PoseWithCurvature::new(Pose2::new(theta.sin(), 1.0 - theta.cos(), theta), 1.0)
            })
            .collect();

        let config = TrajectoryConfig::new(5.0, 10.0)
            .with_start_velocity(0.5)
            .with_end_velocity(0.5)
            .add_constraint(CentripetalAccelerationConstraint::new(0.25));

        let traj = time_parameterize(&points, &config).unwrap();

        // v^2 / r <= 0.25
        for s in traj.states() {
            assert!(s.velocity_ms <= 0.5 + 1e-6);
        }
        assert!((traj.states()[0].velocity_ms - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_infeasible_velocities() {
        let points = straight_points(1.0, 0.1);

        // Can't stop from 2 m/s in 1 m at 1 m/s^2
        let config = TrajectoryConfig::new(3.0, 1.0).with_start_velocity(2.0);
        assert!(matches!(
            time_parameterize(&points, &config),
            Err(TrajectoryError::StartVelocityInfeasible { .. })
        ));

        // Can't reach 2 m/s in 1 m at 1 m/s^2
        let config = TrajectoryConfig::new(3.0, 1.0).with_end_velocity(2.0);
        match time_parameterize(&points, &config) {
            Err(TrajectoryError::EndVelocityInfeasible {
                requested_ms,
                achievable_ms,
            }) => {
                assert_eq!(requested_ms, 2.0);
                assert!((achievable_ms - 2f64.sqrt()).abs() < 1e-9);
            }
            other => panic!("Expected infeasible end velocity, got {:?}", other),
        }

        // Start faster than the max velocity
        let config = TrajectoryConfig::new(1.0, 1.0).with_start_velocity(2.0);
        assert!(matches!(
            time_parameterize(&points, &config),
            Err(TrajectoryError::StartVelocityInfeasible { .. })
        ));
    }

    #[derive(Debug)]
    struct BrokenConstraint;

    impl TrajectoryConstraint for BrokenConstraint {
        fn max_velocity_ms(&self, _: &Pose2, _: f64, _: f64) -> f64 {
            f64::INFINITY
        }

        fn min_max_acceleration(&self, _: &Pose2, _: f64, _: f64) -> MinMax {
            MinMax::new(1.0, -1.0)
        }
    }

    #[test]
    fn test_infeasible_constraint() {
        let points = straight_points(1.0, 0.1);
        let config = TrajectoryConfig::new(1.0, 1.0).add_constraint(BrokenConstraint);

        assert!(matches!(
            time_parameterize(&points, &config),
            Err(TrajectoryError::InfeasibleConstraint { .. })
        ));
    }

    #[test]
    fn test_invalid_config() {
        let points = straight_points(1.0, 0.1);

        assert!(matches!(
            time_parameterize(&[], &TrajectoryConfig::new(1.0, 1.0)),
            Err(TrajectoryError::InvalidConfig(_))
        ));
        assert!(matches!(
            time_parameterize(&points, &TrajectoryConfig::new(0.0, 1.0)),
            Err(TrajectoryError::InvalidConfig(_))
        ));
        assert!(matches!(
            time_parameterize(&points, &TrajectoryConfig::new(1.0, -1.0)),
            Err(TrajectoryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_single_point() {
        let points = [PoseWithCurvature::new(Pose2::new(1.0, 1.0, 0.0), 0.0)];

        let traj = time_parameterize(&points, &TrajectoryConfig::new(1.0, 1.0)).unwrap();

        assert_eq!(traj.states().len(), 1);
        assert_eq!(traj.total_time_s(), 0.0);
    }
}
