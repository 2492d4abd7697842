//! Construction of spline segments from waypoints and control vectors

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;
use nalgebra::Vector2;

use util::geom::Pose2;

use super::{CubicControlVector, QuinticControlVector, Spline};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Ratio between the magnitude of an automatically generated control vector's first derivative
/// and the straight line distance it has to cover.
pub const CONTROL_VECTOR_SCALAR: f64 = 1.2;

/// Control vectors with a first derivative shorter than this carry no heading.
const MIN_TANGENT_M: f64 = 1e-9;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the start and end control vectors for a cubic spline path through the given waypoints.
///
/// Only the headings of `start` and `end` are used; the headings through the interior points are
/// chosen later so that the path's curvature is continuous.
///
/// A heading can only be kept if its waypoint is apart from its neighbour. Coincident waypoints
/// give a zero first derivative, so the heading is lost and a warning is logged.
pub fn cubic_control_vectors_from_waypoints(
    start: &Pose2,
    interior_m: &[Vector2<f64>],
    end: &Pose2,
) -> (CubicControlVector, CubicControlVector) {
    let (start_scalar, end_scalar) = match (interior_m.first(), interior_m.last()) {
        (Some(first), Some(last)) => (
            CONTROL_VECTOR_SCALAR * (first - start.position_m).norm(),
            CONTROL_VECTOR_SCALAR * (end.position_m - last).norm(),
        ),
        _ => {
            let scalar = CONTROL_VECTOR_SCALAR * start.distance_to(end);
            (scalar, scalar)
        }
    };

    (
        cubic_control_vector(start_scalar, start),
        cubic_control_vector(end_scalar, end),
    )
}

/// Build the cubic splines passing through the interior waypoints between the two control
/// vectors.
///
/// The first derivatives at the interior waypoints are chosen to make the second derivative
/// continuous across every knot. `interior_m.len() + 1` splines are returned.
pub fn cubic_splines_from_control_vectors(
    start: &CubicControlVector,
    interior_m: &[Vector2<f64>],
    end: &CubicControlVector,
) -> Vec<Spline> {
    let num_interior = interior_m.len();

    match num_interior {
        0 => vec![Spline::from_cubic_control_vectors(start, end)],
        1 => {
            let mid = interior_m[0];
            let dx = (3.0 * (end.x[0] - start.x[0]) - end.x[1] - start.x[1]) / 4.0;
            let dy = (3.0 * (end.y[0] - start.y[0]) - end.y[1] - start.y[1]) / 4.0;
            let mid_cv = CubicControlVector::new([mid.x, dx], [mid.y, dy]);

            vec![
                Spline::from_cubic_control_vectors(start, &mid_cv),
                Spline::from_cubic_control_vectors(&mid_cv, end),
            ]
        }
        _ => {
            // All points on the path, including both ends
            let mut points_m = Vec::with_capacity(num_interior + 2);
            points_m.push(Vector2::new(start.x[0], start.y[0]));
            points_m.extend_from_slice(interior_m);
            points_m.push(Vector2::new(end.x[0], end.y[0]));

            // Tridiagonal system, with a the sub diagonal, b the main diagonal and c the super
            // diagonal.
            let mut a = vec![1.0; num_interior];
            let b = vec![4.0; num_interior];
            let mut c = vec![1.0; num_interior];
            a[0] = 0.0;
            c[num_interior - 1] = 0.0;

            let mut dx = vec![0.0; num_interior];
            let mut dy = vec![0.0; num_interior];

            dx[0] = 3.0 * (interior_m[1].x - start.x[0]) - start.x[1];
            dy[0] = 3.0 * (interior_m[1].y - start.y[0]) - start.y[1];

            for i in 1..num_interior - 1 {
                dx[i] = 3.0 * (points_m[i + 2].x - points_m[i].x);
                dy[i] = 3.0 * (points_m[i + 2].y - points_m[i].y);
            }

            dx[num_interior - 1] = 3.0 * (end.x[0] - interior_m[num_interior - 2].x) - end.x[1];
            dy[num_interior - 1] = 3.0 * (end.y[0] - interior_m[num_interior - 2].y) - end.y[1];

            let fx = thomas_algorithm(&a, &b, &c, &dx);
            let fy = thomas_algorithm(&a, &b, &c, &dy);

            // First derivatives at every point on the path
            let mut derivs_x = Vec::with_capacity(num_interior + 2);
            derivs_x.push(start.x[1]);
            derivs_x.extend(fx);
            derivs_x.push(end.x[1]);

            let mut derivs_y = Vec::with_capacity(num_interior + 2);
            derivs_y.push(start.y[1]);
            derivs_y.extend(fy);
            derivs_y.push(end.y[1]);

            (0..=num_interior)
                .map(|i| {
                    Spline::new_cubic(
                        [points_m[i].x, derivs_x[i]],
                        [points_m[i + 1].x, derivs_x[i + 1]],
                        [points_m[i].y, derivs_y[i]],
                        [points_m[i + 1].y, derivs_y[i + 1]],
                    )
                })
                .collect()
        }
    }
}

/// Get quintic control vectors for each of the given poses, with zero second derivative.
///
/// Each control vector's first derivative is scaled from the distance to the next pose, or for
/// the last pose the distance from the previous one.
pub fn quintic_control_vectors_from_waypoints(waypoints: &[Pose2]) -> Vec<QuinticControlVector> {
    let num_waypoints = waypoints.len();

    waypoints
        .iter()
        .enumerate()
        .map(|(i, pose)| {
            let dist_m = match (i + 1 < num_waypoints, i > 0) {
                (true, _) => pose.distance_to(&waypoints[i + 1]),
                (false, true) => pose.distance_to(&waypoints[i - 1]),
                (false, false) => 0.0,
            };
            quintic_control_vector(CONTROL_VECTOR_SCALAR * dist_m, pose)
        })
        .collect()
}

/// Build one quintic spline per consecutive pair of waypoints.
///
/// The control vectors at both ends of each segment are scaled from that segment's length, so
/// adjacent segments share headings but not derivative magnitudes. Fewer than two waypoints gives
/// no splines.
pub fn quintic_splines_from_waypoints(waypoints: &[Pose2]) -> Vec<Spline> {
    waypoints
        .windows(2)
        .map(|pair| {
            let scalar = CONTROL_VECTOR_SCALAR * pair[0].distance_to(&pair[1]);
            Spline::from_quintic_control_vectors(
                &quintic_control_vector(scalar, &pair[0]),
                &quintic_control_vector(scalar, &pair[1]),
            )
        })
        .collect()
}

/// Build one quintic spline per consecutive pair of control vectors.
pub fn quintic_splines_from_control_vectors(control_vectors: &[QuinticControlVector]) -> Vec<Spline> {
    control_vectors
        .windows(2)
        .map(|pair| Spline::from_quintic_control_vectors(&pair[0], &pair[1]))
        .collect()
}

fn cubic_control_vector(scalar: f64, pose: &Pose2) -> CubicControlVector {
    warn_if_heading_lost(scalar, pose);

    CubicControlVector::new(
        [pose.x_m(), scalar * pose.heading.cos_angle()],
        [pose.y_m(), scalar * pose.heading.sin_angle()],
    )
}

fn quintic_control_vector(scalar: f64, pose: &Pose2) -> QuinticControlVector {
    warn_if_heading_lost(scalar, pose);

    QuinticControlVector::new(
        [pose.x_m(), scalar * pose.heading.cos_angle(), 0.0],
        [pose.y_m(), scalar * pose.heading.sin_angle(), 0.0],
    )
}

fn warn_if_heading_lost(scalar: f64, pose: &Pose2) {
    if scalar.abs() < MIN_TANGENT_M {
        warn!(
            "Waypoint ({:.3}, {:.3}) coincides with its neighbour, its heading of {:.3} rad is lost",
            pose.x_m(),
            pose.y_m(),
            pose.get_heading()
        );
    }
}

/// Solve the tridiagonal system with sub diagonal `a`, main diagonal `b`, super diagonal `c` and
/// right hand side `d`.
///
/// `a[0]` and `c[n - 1]` are ignored. The system must be diagonally dominant, which holds for the
/// spline system since every `b` is 4 while `a + c <= 2`.
fn thomas_algorithm(a: &[f64], b: &[f64], c: &[f64], d: &[f64]) -> Vec<f64> {
    let n = d.len();
    if n == 0 {
        return Vec::new();
    }

    let mut c_star = vec![0.0; n];
    let mut d_star = vec![0.0; n];

    c_star[0] = c[0] / b[0];
    d_star[0] = d[0] / b[0];

    // Forward sweep
    for i in 1..n {
        let m = 1.0 / (b[i] - a[i] * c_star[i - 1]);
        c_star[i] = c[i] * m;
        d_star[i] = (d[i] - a[i] * d_star[i - 1]) * m;
    }

    // Back substitution
    let mut x = vec![0.0; n];
    x[n - 1] = d_star[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d_star[i] - c_star[i] * x[i + 1];
    }

    x
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_thomas_algorithm() {
        // Solution is [1, 2, 3]
        let x = thomas_algorithm(
            &[0.0, 1.0, 1.0],
            &[4.0, 4.0, 4.0],
            &[1.0, 1.0, 0.0],
            &[6.0, 12.0, 14.0],
        );

        for (xi, expected) in x.iter().zip(&[1.0, 2.0, 3.0]) {
            assert!((xi - expected).abs() < 1e-12);
        }

        assert!(thomas_algorithm(&[], &[], &[], &[]).is_empty());
    }

    #[test]
    fn test_cubic_control_vector_scalars() {
        let start = Pose2::new(0.0, 0.0, 0.0);
        let end = Pose2::new(10.0, 0.0, FRAC_PI_2);

        let (initial, last) = cubic_control_vectors_from_waypoints(&start, &[], &end);
        assert!((initial.x[1] - 12.0).abs() < 1e-12);
        assert!(last.x[1].abs() < 1e-9);
        assert!((last.y[1] - 12.0).abs() < 1e-12);

        let (initial, last) =
            cubic_control_vectors_from_waypoints(&start, &[Vector2::new(3.0, 4.0)], &end);
        assert!((initial.x[1] - 6.0).abs() < 1e-12);
        assert!((last.y[1] - 1.2 * 65f64.sqrt()).abs() < 1e-12);
    }

    /// Adjacent splines must meet with matching position, heading and curvature.
    fn assert_continuous(splines: &[Spline]) {
        for pair in splines.windows(2) {
            let end = pair[0].get_point(1.0);
            let start = pair[1].get_point(0.0);

            assert!(end.pose.distance_to(&start.pose) < 1e-9);
            assert!((end.pose.get_heading() - start.pose.get_heading()).abs() < 1e-9);
            assert!((end.curvature_m - start.curvature_m).abs() < 1e-9);
        }
    }

    #[test]
    fn test_coincident_waypoints_lose_heading() {
        let start = Pose2::new(1.0, 1.0, 0.0);
        let end = Pose2::new(1.0, 1.0, std::f64::consts::PI);

        let (initial, last) = cubic_control_vectors_from_waypoints(&start, &[], &end);
        assert_eq!(initial.x[1], 0.0);
        assert_eq!(initial.y[1], 0.0);
        assert_eq!(last.x[1], 0.0);
        assert_eq!(last.y[1], 0.0);

        for cv in quintic_control_vectors_from_waypoints(&[start, end]) {
            assert_eq!(cv.x[1], 0.0);
            assert_eq!(cv.y[1], 0.0);
        }
    }

    #[test]
    fn test_cubic_splines_with_many_interior_points() {
        let start = Pose2::new(0.0, 0.0, 0.0);
        let end = Pose2::new(6.0, 0.0, 0.0);
        let interior = [
            Vector2::new(1.5, 1.0),
            Vector2::new(3.0, -1.0),
            Vector2::new(4.5, 0.5),
        ];

        let (initial, last) = cubic_control_vectors_from_waypoints(&start, &interior, &end);
        let splines = cubic_splines_from_control_vectors(&initial, &interior, &last);

        assert_eq!(splines.len(), 4);
        assert_continuous(&splines);

        for (spline, point) in splines.iter().zip(&interior) {
            assert!((spline.get_point(1.0).pose.position_m - point).norm() < 1e-9);
        }
        assert!(splines[3].get_point(1.0).pose.distance_to(&end) < 1e-9);
    }

    #[test]
    fn test_cubic_splines_with_one_interior_point() {
        let start = Pose2::new(0.0, 0.0, 0.0);
        let end = Pose2::new(4.0, 0.0, 0.0);
        let interior = [Vector2::new(2.0, 1.0)];

        let (initial, last) = cubic_control_vectors_from_waypoints(&start, &interior, &end);
        let splines = cubic_splines_from_control_vectors(&initial, &interior, &last);

        assert_eq!(splines.len(), 2);

        let knot = splines[0].get_point(1.0);
        assert!((knot.pose.position_m - interior[0]).norm() < 1e-9);

        // Symmetric path so the heading at the top is flat
        assert!(knot.pose.get_heading().abs() < 1e-9);
        assert!(knot.pose.distance_to(&splines[1].get_point(0.0).pose) < 1e-9);
    }

    #[test]
    fn test_quintic_from_waypoints() {
        let waypoints = [
            Pose2::new(0.0, 0.0, 0.0),
            Pose2::new(2.0, 2.0, FRAC_PI_2),
            Pose2::new(0.0, 4.0, std::f64::consts::PI),
        ];

        let splines = quintic_splines_from_waypoints(&waypoints);
        assert_eq!(splines.len(), 2);

        for (spline, pair) in splines.iter().zip(waypoints.windows(2)) {
            let start = spline.get_point(0.0);
            let end = spline.get_point(1.0);

            assert!(start.pose.distance_to(&pair[0]) < 1e-9);
            assert!(end.pose.distance_to(&pair[1]) < 1e-9);
            assert!(util::maths::get_ang_dist(end.pose.get_heading(), pair[1].get_heading()).abs() < 1e-9);
        }

        assert!(quintic_splines_from_waypoints(&waypoints[..1]).is_empty());
    }

    #[test]
    fn test_quintic_control_vectors_from_waypoints() {
        let waypoints = [Pose2::new(0.0, 0.0, 0.0), Pose2::new(5.0, 0.0, 0.0)];
        let cvs = quintic_control_vectors_from_waypoints(&waypoints);

        assert_eq!(cvs.len(), 2);
        assert!((cvs[0].x[1] - 6.0).abs() < 1e-12);
        assert!((cvs[1].x[1] - 6.0).abs() < 1e-12);
        assert_eq!(cvs[1].x[2], 0.0);

        let splines = quintic_splines_from_control_vectors(&cvs);
        assert_eq!(splines.len(), 1);
        assert!((splines[0].get_point(0.5).pose.x_m() - 2.5).abs() < 1e-9);
    }
}
