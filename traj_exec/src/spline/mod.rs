//! # Spline module
//!
//! Splines are parametric polynomial curves in X and Y, with the parameter `t` running from 0 at
//! the start of the segment to 1 at the end. Cubic (degree 3) and quintic (degree 5) Hermite
//! splines are supported, built from [`ControlVector`]s which give the position and derivatives
//! of the curve at each end.
//!
//! Every spline stores a 6 row coefficient matrix. Rows hold, in order, the coefficients of x, y,
//! dx, dy, ddx and ddy, and columns are ordered by descending power of `t`. The derivative rows
//! are stored multiplied up by `t` so that a single basis vector `[t^n, ..., t, 1]` evaluates
//! every row; the derivatives are recovered by dividing by `t` (or `t^2`).

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cubic;
mod helper;
mod parameterizer;
mod quintic;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{DMatrix, DVector};
use serde::Serialize;

use util::geom::Pose2;

pub use helper::*;
pub use parameterizer::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Below this squared speed (w.r.t. `t`) the curvature of a point is taken as zero.
const MIN_SPEED_SQ: f64 = 1e-12;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The position and derivatives of a curve at one end of a spline segment, per dimension.
///
/// Element 0 is the position, element 1 the first derivative and, for quintic splines, element 2
/// the second derivative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlVector<const N: usize> {
    pub x: [f64; N],
    pub y: [f64; N],
}

/// Control vector for a cubic spline: `[position, velocity]`.
pub type CubicControlVector = ControlVector<2>;

/// Control vector for a quintic spline: `[position, velocity, acceleration]`.
pub type QuinticControlVector = ControlVector<3>;

/// A pose on a path along with the path's curvature at that pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PoseWithCurvature {
    pub pose: Pose2,

    /// Signed curvature, positive when turning anticlockwise.
    ///
    /// Units: 1/meters
    pub curvature_m: f64,
}

/// A cubic or quintic polynomial curve segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Spline {
    degree: usize,
    coefficients: DMatrix<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while working with splines.
#[derive(Debug, thiserror::Error)]
pub enum SplineError {
    #[error(
        "Could not parameterise a malformed spline after {0} iterations, two or more adjacent \
        waypoints are probably very close together with headings in opposing directions"
    )]
    MalformedSpline(usize),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<const N: usize> ControlVector<N> {
    pub fn new(x: [f64; N], y: [f64; N]) -> Self {
        Self { x, y }
    }

    /// The pose at this end of the segment, with the heading given by the direction of the first
    /// derivative.
    pub fn pose(&self) -> Pose2 {
        Pose2::new(self.x[0], self.y[0], self.y[1].atan2(self.x[1]))
    }

    /// Return a copy of this control vector with the first derivative negated.
    pub(crate) fn reversed(&self) -> Self {
        let mut cv = *self;
        cv.x[1] = -cv.x[1];
        cv.y[1] = -cv.y[1];
        cv
    }
}

impl PoseWithCurvature {
    pub fn new(pose: Pose2, curvature_m: f64) -> Self {
        Self { pose, curvature_m }
    }
}

impl Spline {
    /// Build a spline from the x and y polynomial coefficients, highest power first.
    ///
    /// Both slices must hold `degree + 1` coefficients.
    pub(crate) fn from_polynomials(degree: usize, x: &[f64], y: &[f64]) -> Self {
        let num_cols = degree + 1;
        let mut coefficients = DMatrix::zeros(6, num_cols);

        for i in 0..num_cols {
            let power = (degree - i) as f64;

            coefficients[(0, i)] = x[i];
            coefficients[(1, i)] = y[i];

            // First derivative, kept at the same column so it's evaluated by the same basis and
            // then divided by t.
            coefficients[(2, i)] = x[i] * power;
            coefficients[(3, i)] = y[i] * power;
        }

        for i in 0..degree {
            let power = (degree - 1 - i) as f64;

            coefficients[(4, i)] = coefficients[(2, i)] * power;
            coefficients[(5, i)] = coefficients[(3, i)] * power;
        }

        Self {
            degree,
            coefficients,
        }
    }

    /// The degree of the polynomial, 3 for cubic and 5 for quintic splines.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// The 6 x (degree + 1) coefficient matrix of the spline.
    pub fn coefficients(&self) -> &DMatrix<f64> {
        &self.coefficients
    }

    /// Evaluate the spline at the parameter `t`, which should be in [0, 1].
    ///
    /// Where the curve is stationary (zero first derivative) the curvature is undefined and is
    /// reported as zero.
    pub fn get_point(&self, t: f64) -> PoseWithCurvature {
        let num_cols = self.degree + 1;

        let bases = DVector::from_iterator(
            num_cols,
            (0..num_cols).map(|i| t.powi((self.degree - i) as i32)),
        );

        let combined = &self.coefficients * bases;

        let (dx, dy, ddx, ddy) = if t == 0.0 {
            // Dividing by t would be singular, so read the derivatives directly from the
            // coefficients of t^1 (first derivative) and t^2 (second derivative).
            (
                self.coefficients[(2, self.degree - 1)],
                self.coefficients[(3, self.degree - 1)],
                self.coefficients[(4, self.degree - 2)],
                self.coefficients[(5, self.degree - 2)],
            )
        } else {
            (
                combined[2] / t,
                combined[3] / t,
                combined[4] / t / t,
                combined[5] / t / t,
            )
        };

        let speed_sq = dx * dx + dy * dy;
        let curvature_m = if speed_sq < MIN_SPEED_SQ {
            0.0
        } else {
            (dx * ddy - ddx * dy) / (speed_sq * dx.hypot(dy))
        };

        PoseWithCurvature::new(
            Pose2::new(combined[0], combined[1], dy.atan2(dx)),
            curvature_m,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_polynomials_derivative_rows() {
        // x = t^3 + 2t^2 + 3t + 4
        let spline = Spline::from_polynomials(3, &[1.0, 2.0, 3.0, 4.0], &[0.0; 4]);
        let c = spline.coefficients();

        assert_eq!(c.nrows(), 6);
        assert_eq!(c.ncols(), 4);

        // dx * t = 3t^3 + 4t^2 + 3t
        assert_eq!(
            [c[(2, 0)], c[(2, 1)], c[(2, 2)], c[(2, 3)]],
            [3.0, 4.0, 3.0, 0.0]
        );

        // ddx * t^2 = 6t^3 + 4t^2
        assert_eq!(
            [c[(4, 0)], c[(4, 1)], c[(4, 2)], c[(4, 3)]],
            [6.0, 4.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_get_point_at_zero_uses_coefficients() {
        // x = t^3 + 2t^2 + 3t, y = t^2
        let spline = Spline::from_polynomials(3, &[1.0, 2.0, 3.0, 0.0], &[0.0, 1.0, 0.0, 0.0]);

        let p = spline.get_point(0.0);

        // dx = 3, dy = 0, ddx = 4, ddy = 2
        assert!(p.pose.get_heading().abs() < 1e-12);
        assert!((p.curvature_m - (3.0 * 2.0) / 27.0).abs() < 1e-12);

        // Approaching zero from above should agree
        let q = spline.get_point(1e-7);
        assert!((q.curvature_m - p.curvature_m).abs() < 1e-4);
    }

    #[test]
    fn test_stationary_point_has_zero_curvature() {
        // A spline which never moves
        let spline = Spline::from_polynomials(3, &[0.0, 0.0, 0.0, 1.0], &[0.0, 0.0, 0.0, 2.0]);

        let p = spline.get_point(0.5);

        assert_eq!(p.curvature_m, 0.0);
        assert_eq!(p.pose.position_m, nalgebra::Vector2::new(1.0, 2.0));
    }

    #[test]
    fn test_control_vector_pose() {
        let cv = CubicControlVector::new([1.0, 0.0], [2.0, 3.0]);
        let pose = cv.pose();

        assert!((pose.get_heading() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);

        let rev = cv.reversed();
        assert_eq!(rev.y, [2.0, -3.0]);
    }
}
