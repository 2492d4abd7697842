//! Quintic Hermite splines

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Matrix6, Vector6};

use super::{QuinticControlVector, Spline};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Spline {
    /// Build a quintic spline from the `[position, velocity, acceleration]` of each dimension at
    /// each end.
    pub fn new_quintic(
        x_initial: [f64; 3],
        x_final: [f64; 3],
        y_initial: [f64; 3],
        y_final: [f64; 3],
    ) -> Self {
        let basis = hermite_basis();

        let x = basis
            * Vector6::new(
                x_initial[0],
                x_initial[1],
                x_initial[2],
                x_final[0],
                x_final[1],
                x_final[2],
            );
        let y = basis
            * Vector6::new(
                y_initial[0],
                y_initial[1],
                y_initial[2],
                y_final[0],
                y_final[1],
                y_final[2],
            );

        Self::from_polynomials(5, x.as_slice(), y.as_slice())
    }

    /// Build a quintic spline between two control vectors.
    pub fn from_quintic_control_vectors(
        initial: &QuinticControlVector,
        end: &QuinticControlVector,
    ) -> Self {
        Self::new_quintic(initial.x, end.x, initial.y, end.y)
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Hermite basis which maps `[p0, v0, a0, p1, v1, a1]` onto the polynomial coefficients
/// `[a5, a4, a3, a2, a1, a0]`.
fn hermite_basis() -> Matrix6<f64> {
    Matrix6::new(
        -6.0, -3.0, -0.5, 6.0, -3.0, 0.5, //
        15.0, 8.0, 1.5, -15.0, 7.0, -1.0, //
        -10.0, -6.0, -1.5, 10.0, -4.0, 0.5, //
        0.0, 0.0, 0.5, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, 0.0, 0.0, 0.0,
    )
}
