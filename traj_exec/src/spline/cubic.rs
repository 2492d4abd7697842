//! Cubic Hermite splines

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Matrix4, Vector4};

use super::{CubicControlVector, Spline};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Spline {
    /// Build a cubic spline from the `[position, velocity]` of each dimension at each end.
    pub fn new_cubic(
        x_initial: [f64; 2],
        x_final: [f64; 2],
        y_initial: [f64; 2],
        y_final: [f64; 2],
    ) -> Self {
        let basis = hermite_basis();

        let x = basis * Vector4::new(x_initial[0], x_initial[1], x_final[0], x_final[1]);
        let y = basis * Vector4::new(y_initial[0], y_initial[1], y_final[0], y_final[1]);

        Self::from_polynomials(3, x.as_slice(), y.as_slice())
    }

    /// Build a cubic spline between two control vectors.
    pub fn from_cubic_control_vectors(
        initial: &CubicControlVector,
        end: &CubicControlVector,
    ) -> Self {
        Self::new_cubic(initial.x, end.x, initial.y, end.y)
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Hermite basis which maps `[p0, v0, p1, v1]` onto the polynomial coefficients `[a3, a2, a1,
/// a0]`.
fn hermite_basis() -> Matrix4<f64> {
    Matrix4::new(
        2.0, 1.0, -2.0, 1.0, //
        -3.0, -2.0, 3.0, -1.0, //
        0.0, 1.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, 0.0,
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cubic_end_conditions() {
        let spline = Spline::new_cubic([1.0, 2.0], [4.0, 0.5], [-1.0, 0.0], [3.0, 1.0]);

        let start = spline.get_point(0.0);
        let end = spline.get_point(1.0);

        assert!((start.pose.x_m() - 1.0).abs() < 1e-12);
        assert!((start.pose.y_m() + 1.0).abs() < 1e-12);
        assert!(start.pose.get_heading().abs() < 1e-12);

        assert!((end.pose.x_m() - 4.0).abs() < 1e-12);
        assert!((end.pose.y_m() - 3.0).abs() < 1e-12);
        assert!((end.pose.get_heading() - 2f64.atan2(1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_cubic_straight_line() {
        let spline = Spline::from_cubic_control_vectors(
            &CubicControlVector::new([0.0, 1.0], [0.0, 0.0]),
            &CubicControlVector::new([1.0, 1.0], [0.0, 0.0]),
        );

        // x = t
        let c = spline.coefficients();
        assert_eq!(
            [c[(0, 0)], c[(0, 1)], c[(0, 2)], c[(0, 3)]],
            [0.0, 0.0, 1.0, 0.0]
        );

        let mid = spline.get_point(0.5);
        assert!((mid.pose.x_m() - 0.5).abs() < 1e-12);
        assert_eq!(mid.curvature_m, 0.0);
    }
}
