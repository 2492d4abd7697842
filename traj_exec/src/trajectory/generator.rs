//! Trajectory generation from waypoints
//!
//! Generation runs waypoints through the whole planning pipeline: control vectors, splines,
//! pose and curvature samples and finally time parameterisation.
//!
//! Reversed paths are fitted with the robot's heading turned through 180 degrees, so the splines
//! follow the direction of travel, and the samples are turned back afterwards with their
//! curvature negated.
//!
//! If the splines are malformed a trajectory which holds the robot at the start of the path is
//! returned instead of an error, since failing to plan must not stop the control loop.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::f64::consts::PI;

use log::{debug, error};
use nalgebra::{UnitComplex, Vector2};

use util::geom::{Pose2, Transform2};

use super::{time_parameterize, SplineType, TrajGenParams, Trajectory, TrajectoryConfig, TrajectoryError};
use crate::spline::{
    cubic_control_vectors_from_waypoints, cubic_splines_from_control_vectors,
    quintic_splines_from_control_vectors, quintic_splines_from_waypoints,
    spline_points_from_splines, CubicControlVector, QuinticControlVector, Spline,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Generate a trajectory along cubic splines from `start` to `end` through the interior points.
pub fn generate_cubic(
    start: &Pose2,
    interior_m: &[Vector2<f64>],
    end: &Pose2,
    config: &TrajectoryConfig,
) -> Result<Trajectory, TrajectoryError> {
    let (initial, last) = cubic_control_vectors_from_waypoints(start, interior_m, end);

    cubic_from_control_vectors(&initial, interior_m, &last, start, config)
}

/// Generate a trajectory along cubic splines between the given control vectors, passing through
/// the interior points.
pub fn generate_cubic_from_control_vectors(
    initial: &CubicControlVector,
    interior_m: &[Vector2<f64>],
    end: &CubicControlVector,
    config: &TrajectoryConfig,
) -> Result<Trajectory, TrajectoryError> {
    cubic_from_control_vectors(initial, interior_m, end, &initial.pose(), config)
}

/// Generate a trajectory along quintic splines through every waypoint.
pub fn generate_quintic(
    waypoints: &[Pose2],
    config: &TrajectoryConfig,
) -> Result<Trajectory, TrajectoryError> {
    let start = match waypoints.first() {
        Some(s) if waypoints.len() >= 2 => *s,
        _ => return Err(not_enough_waypoints(waypoints.len())),
    };

    let waypoints: Vec<Pose2> = if config.reversed {
        waypoints.iter().map(|w| w.transform_by(&flip())).collect()
    } else {
        waypoints.to_vec()
    };

    from_splines(&quintic_splines_from_waypoints(&waypoints), &start, config)
}

/// Generate a trajectory along quintic splines joining each consecutive pair of control vectors.
pub fn generate_quintic_from_control_vectors(
    control_vectors: &[QuinticControlVector],
    config: &TrajectoryConfig,
) -> Result<Trajectory, TrajectoryError> {
    let start = match control_vectors.first() {
        Some(cv) if control_vectors.len() >= 2 => cv.pose(),
        _ => return Err(not_enough_waypoints(control_vectors.len())),
    };

    let control_vectors: Vec<QuinticControlVector> = if config.reversed {
        control_vectors.iter().map(|cv| cv.reversed()).collect()
    } else {
        control_vectors.to_vec()
    };

    from_splines(
        &quintic_splines_from_control_vectors(&control_vectors),
        &start,
        config,
    )
}

/// Generate the trajectory described by the generation parameters.
pub fn generate_from_params(
    params: &TrajGenParams,
    config: &TrajectoryConfig,
) -> Result<Trajectory, TrajectoryError> {
    let waypoints = params.waypoint_poses();

    match params.spline_type {
        SplineType::Cubic => {
            if waypoints.len() < 2 {
                return Err(not_enough_waypoints(waypoints.len()));
            }

            let interior_m: Vec<Vector2<f64>> = waypoints[1..waypoints.len() - 1]
                .iter()
                .map(|w| w.position_m)
                .collect();

            generate_cubic(
                &waypoints[0],
                &interior_m,
                &waypoints[waypoints.len() - 1],
                config,
            )
        }
        SplineType::Quintic => generate_quintic(&waypoints, config),
    }
}

fn cubic_from_control_vectors(
    initial: &CubicControlVector,
    interior_m: &[Vector2<f64>],
    end: &CubicControlVector,
    start_pose: &Pose2,
    config: &TrajectoryConfig,
) -> Result<Trajectory, TrajectoryError> {
    let (initial, end) = if config.reversed {
        (initial.reversed(), end.reversed())
    } else {
        (*initial, *end)
    };

    from_splines(
        &cubic_splines_from_control_vectors(&initial, interior_m, &end),
        start_pose,
        config,
    )
}

/// Discretise and time parameterise the splines, undoing the reversal flip if needed.
fn from_splines(
    splines: &[Spline],
    start_pose: &Pose2,
    config: &TrajectoryConfig,
) -> Result<Trajectory, TrajectoryError> {
    let mut points = match spline_points_from_splines(splines) {
        Ok(p) => p,
        Err(e) => {
            error!("{}, holding position at the start of the path instead", e);
            return Ok(Trajectory::do_nothing(*start_pose));
        }
    };

    debug!(
        "{} splines discretised into {} points",
        splines.len(),
        points.len()
    );

    if config.reversed {
        let flip = flip();
        for p in points.iter_mut() {
            p.pose = p.pose.transform_by(&flip);
            p.curvature_m = -p.curvature_m;
        }
    }

    time_parameterize(&points, config)
}

/// Half turn about the pose's own position.
fn flip() -> Transform2 {
    Transform2::new(Vector2::zeros(), UnitComplex::new(PI))
}

fn not_enough_waypoints(num: usize) -> TrajectoryError {
    TrajectoryError::InvalidConfig(format!(
        "at least 2 waypoints are needed to generate a trajectory, got {}",
        num
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::trajectory::constraint::CentripetalAccelerationConstraint;
    use std::f64::consts::FRAC_PI_2;
    use util::maths::get_ang_dist;

    fn assert_poses_close(a: &Pose2, b: &Pose2, tol: f64) {
        assert!(a.distance_to(b) < tol, "{:?} != {:?}", a, b);
        assert!(
            get_ang_dist(a.get_heading(), b.get_heading()).abs() < tol,
            "{:?} != {:?}",
            a,
            b
        );
    }

    fn assert_strictly_increasing(traj: &Trajectory) {
        for pair in traj.states().windows(2) {
            assert!(pair[1].time_s > pair[0].time_s);
        }
    }

    #[test]
    fn test_straight_line() {
        let start = Pose2::new(0.0, 0.0, 0.0);
        let end = Pose2::new(10.0, 0.0, 0.0);
        let config = TrajectoryConfig::new(2.0, 2.0);

        let traj = generate_cubic(&start, &[], &end, &config).unwrap();
        let states = traj.states();

        assert_poses_close(&states[0].pose, &start, 1e-9);
        assert_poses_close(&states[states.len() - 1].pose, &end, 1e-9);
        assert_strictly_increasing(&traj);

        assert!(traj.total_time_s() > 0.0);
        assert!((traj.total_time_s() - 6.0).abs() < 1e-2);

        assert_poses_close(&traj.sample(0.0).pose, &start, 1e-9);
        assert_poses_close(&traj.sample(traj.total_time_s()).pose, &end, 1e-9);
    }

    #[test]
    fn test_curved_path_with_interior_points() {
        let start = Pose2::new(0.0, 0.0, 0.0);
        let end = Pose2::new(4.0, 4.0, FRAC_PI_2);
        let interior = [Vector2::new(2.0, 0.5), Vector2::new(3.5, 2.0)];

        let config = TrajectoryConfig::new(1.5, 1.0)
            .add_constraint(CentripetalAccelerationConstraint::new(0.5));

        let traj = generate_cubic(&start, &interior, &end, &config).unwrap();
        let states = traj.states();

        assert_poses_close(&states[0].pose, &start, 1e-9);
        assert_poses_close(&states[states.len() - 1].pose, &end, 1e-9);
        assert_strictly_increasing(&traj);

        for s in states {
            assert!(s.velocity_ms <= 1.5 + 1e-6);
            assert!(s.velocity_ms.powi(2) * s.curvature_m.abs() <= 0.5 + 1e-6);
        }
    }

    #[test]
    fn test_reversed() {
        let start = Pose2::new(0.0, 0.0, 0.0);
        let end = Pose2::new(-3.0, 0.0, 0.0);
        let config = TrajectoryConfig::new(1.0, 1.0).with_reversed(true);

        let traj = generate_cubic(&start, &[], &end, &config).unwrap();
        let states = traj.states();

        // Still facing +X while backing up
        assert_poses_close(&states[0].pose, &start, 1e-9);
        assert_poses_close(&states[states.len() - 1].pose, &end, 1e-9);
        assert_strictly_increasing(&traj);

        for s in &states[1..states.len() - 1] {
            assert!(s.velocity_ms < 0.0);
            assert!(get_ang_dist(s.pose.get_heading(), 0.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_malformed_gives_do_nothing() {
        let start = Pose2::new(0.0, 0.0, 0.0);
        let end = Pose2::new(1.0, 0.0, PI);

        let traj = generate_cubic(&start, &[], &end, &TrajectoryConfig::new(1.0, 1.0)).unwrap();

        assert_eq!(traj, Trajectory::do_nothing(start));
    }

    #[test]
    fn test_malformed_control_vectors() {
        // Out and straight back to the same place
        let traj = generate_cubic_from_control_vectors(
            &CubicControlVector::new([0.0, 1.0], [0.0, 0.0]),
            &[],
            &CubicControlVector::new([0.0, -1.0], [0.0, 0.0]),
            &TrajectoryConfig::new(1.0, 1.0),
        )
        .unwrap();

        assert_eq!(traj.states().len(), 1);
        assert_eq!(traj.total_time_s(), 0.0);
        assert_eq!(traj.initial_pose(), Pose2::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_quintic() {
        let waypoints = [
            Pose2::new(0.0, 0.0, 0.0),
            Pose2::new(3.0, 1.0, FRAC_PI_2 / 2.0),
            Pose2::new(5.0, 4.0, FRAC_PI_2),
        ];
        let config = TrajectoryConfig::new(2.0, 1.0);

        let traj = generate_quintic(&waypoints, &config).unwrap();
        let states = traj.states();

        assert_poses_close(&states[0].pose, &waypoints[0], 1e-9);
        assert_poses_close(&states[states.len() - 1].pose, &waypoints[2], 1e-9);
        assert_strictly_increasing(&traj);

        // Passes through the middle waypoint
        assert!(states
            .iter()
            .any(|s| s.pose.distance_to(&waypoints[1]) < 1e-9));
    }

    #[test]
    fn test_quintic_reversed() {
        let waypoints = [Pose2::new(0.0, 0.0, 0.0), Pose2::new(-2.0, 0.0, 0.0)];
        let config = TrajectoryConfig::new(1.0, 1.0).with_reversed(true);

        let traj = generate_quintic(&waypoints, &config).unwrap();
        let states = traj.states();

        assert_poses_close(&states[states.len() - 1].pose, &waypoints[1], 1e-9);
        assert!(traj.sample(traj.total_time_s() / 2.0).velocity_ms < 0.0);
    }

    #[test]
    fn test_quintic_control_vectors() {
        let cvs = [
            QuinticControlVector::new([0.0, 2.0, 0.0], [0.0, 0.0, 0.0]),
            QuinticControlVector::new([2.0, 2.0, 0.0], [0.0, 0.0, 0.0]),
        ];

        let traj = generate_quintic_from_control_vectors(&cvs, &TrajectoryConfig::new(1.0, 1.0))
            .unwrap();

        assert_poses_close(&traj.initial_pose(), &Pose2::new(0.0, 0.0, 0.0), 1e-9);
        assert!((traj.states()[traj.states().len() - 1].pose.x_m() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_not_enough_waypoints() {
        let config = TrajectoryConfig::new(1.0, 1.0);

        assert!(matches!(
            generate_quintic(&[Pose2::identity()], &config),
            Err(TrajectoryError::InvalidConfig(_))
        ));
        assert!(matches!(
            generate_quintic_from_control_vectors(&[], &config),
            Err(TrajectoryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_params() {
        let params: TrajGenParams = util::params::from_str(
            r#"
            spline_type = "Cubic"
            waypoints = [[0.0, 0.0, 0.0], [1.5, 0.5, 0.0], [3.0, 0.0, 0.0]]
            max_velocity_ms = 1.0
            max_acceleration_mss = 0.5
            "#,
        )
        .unwrap();
        let config = TrajectoryConfig::from_params(&params);

        let traj = generate_from_params(&params, &config).unwrap();

        assert_poses_close(&traj.initial_pose(), &Pose2::identity(), 1e-9);
        assert!(traj.states().iter().any(|s| (s.pose.position_m
            - Vector2::new(1.5, 0.5))
        .norm()
            < 1e-9));
        assert_strictly_increasing(&traj);
    }
}
