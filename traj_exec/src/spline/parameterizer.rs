//! Adaptive discretisation of splines into pose and curvature samples
//!
//! A segment of the spline is accepted once the twist between the poses at its two ends is small
//! enough in every component, otherwise it is split in half and both halves are checked in turn.
//! The subdivision runs on an explicit stack, rather than by recursion, so that a malformed spline
//! can't blow up the call stack.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;

use super::{PoseWithCurvature, Spline, SplineError};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Maximum forward step between accepted samples.
///
/// Units: meters
pub const MAX_DX_M: f64 = 0.127;

/// Maximum sideways step between accepted samples.
///
/// Units: meters
pub const MAX_DY_M: f64 = 0.00127;

/// Maximum change in heading between accepted samples.
///
/// Units: radians
pub const MAX_DTHETA_RAD: f64 = 0.0872;

/// Number of subdivision steps after which a spline is declared malformed.
pub const MAX_ITERATIONS: usize = 5000;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Discretise the whole of the spline, `t` from 0 to 1.
pub fn parameterize(spline: &Spline) -> Result<Vec<PoseWithCurvature>, SplineError> {
    parameterize_between(spline, 0.0, 1.0)
}

/// Discretise the spline between `t0` and `t1`.
///
/// The first sample is always the point at `t0` and the last the point at `t1`, with the samples
/// between ordered by increasing `t`.
pub fn parameterize_between(
    spline: &Spline,
    t0: f64,
    t1: f64,
) -> Result<Vec<PoseWithCurvature>, SplineError> {
    let mut points = vec![spline.get_point(t0)];

    // Segments still to be checked, the top of the stack is always the earliest in t.
    let mut stack = vec![(t0, t1)];
    let mut iterations = 0;

    while let Some((start_t, end_t)) = stack.pop() {
        let start = spline.get_point(start_t);
        let end = spline.get_point(end_t);

        let twist = start.pose.log(&end.pose);

        if twist.dy_m.abs() > MAX_DY_M
            || twist.dx_m.abs() > MAX_DX_M
            || twist.dtheta_rad.abs() > MAX_DTHETA_RAD
        {
            let mid_t = (start_t + end_t) / 2.0;
            stack.push((mid_t, end_t));
            stack.push((start_t, mid_t));
        } else {
            points.push(end);
        }

        iterations += 1;
        if iterations >= MAX_ITERATIONS {
            return Err(SplineError::MalformedSpline(iterations));
        }
    }

    trace!(
        "Spline parameterised into {} points in {} iterations",
        points.len(),
        iterations
    );

    Ok(points)
}

/// Discretise a chain of splines into one list of samples.
///
/// The first sample of every spline after the first is dropped, since it duplicates the last
/// sample of the spline before it.
pub fn spline_points_from_splines(
    splines: &[Spline],
) -> Result<Vec<PoseWithCurvature>, SplineError> {
    let mut points: Vec<PoseWithCurvature> = Vec::new();

    for (i, spline) in splines.iter().enumerate() {
        let spline_points = parameterize(spline)?;
        let skip = if i == 0 { 0 } else { 1 };
        points.extend(spline_points.into_iter().skip(skip));
    }

    Ok(points)
}
