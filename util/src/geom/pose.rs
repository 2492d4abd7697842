//! Pose on the XY plane

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{UnitComplex, Vector2};
use serde::{Deserialize, Serialize};

use super::{Transform2, Twist2};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Below this angle the exponential and logarithm maps switch to their Taylor
/// expansions.
const SMALL_ANGLE_RAD: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A position and heading on the XY plane.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose2 {
    /// The position of the pose.
    ///
    /// Units: meters
    pub position_m: Vector2<f64>,

    /// The heading of the pose, anticlockwise from the +ve X axis.
    pub heading: UnitComplex<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose2 {
    pub fn new(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self {
            position_m: Vector2::new(x_m, y_m),
            heading: UnitComplex::new(heading_rad),
        }
    }

    pub fn from_parts(position_m: Vector2<f64>, heading: UnitComplex<f64>) -> Self {
        Self {
            position_m,
            heading,
        }
    }

    pub fn identity() -> Self {
        Self::from_parts(Vector2::zeros(), UnitComplex::identity())
    }

    pub fn x_m(&self) -> f64 {
        self.position_m[0]
    }

    pub fn y_m(&self) -> f64 {
        self.position_m[1]
    }

    /// Return the heading of the pose in radians, in the range (-pi, pi].
    pub fn get_heading(&self) -> f64 {
        self.heading.angle()
    }

    /// Apply a transform expressed in this pose's frame.
    pub fn transform_by(&self, transform: &Transform2) -> Self {
        Self {
            position_m: self.position_m + self.heading * transform.translation_m,
            heading: self.heading * transform.rotation,
        }
    }

    /// Express this pose in the frame of `other`.
    pub fn relative_to(&self, other: &Pose2) -> Self {
        let transform = Transform2::between(other, self);

        Self::from_parts(transform.translation_m, transform.rotation)
    }

    /// Straight line distance between the positions of the two poses.
    pub fn distance_to(&self, other: &Pose2) -> f64 {
        (self.position_m - other.position_m).norm()
    }

    /// Follow the given twist (a constant curvature arc in this pose's frame)
    /// and return the pose at the end of it.
    pub fn exp(&self, twist: &Twist2) -> Self {
        let dtheta = twist.dtheta_rad;
        let sin_theta = dtheta.sin();
        let cos_theta = dtheta.cos();

        let (s, c) = if dtheta.abs() < SMALL_ANGLE_RAD {
            (1.0 - dtheta * dtheta / 6.0, 0.5 * dtheta)
        } else {
            (sin_theta / dtheta, (1.0 - cos_theta) / dtheta)
        };

        let transform = Transform2::new(
            Vector2::new(
                twist.dx_m * s - twist.dy_m * c,
                twist.dx_m * c + twist.dy_m * s,
            ),
            UnitComplex::new(dtheta),
        );

        self.transform_by(&transform)
    }

    /// Find the twist which takes this pose to `end`.
    ///
    /// This is the inverse of [`Pose2::exp`].
    pub fn log(&self, end: &Pose2) -> Twist2 {
        let transform = Transform2::between(self, end);
        let dtheta = transform.rotation.angle();
        let half_dtheta = dtheta / 2.0;
        let cos_minus_one = transform.rotation.cos_angle() - 1.0;

        let half_theta_by_tan_half_dtheta = if cos_minus_one.abs() < SMALL_ANGLE_RAD {
            1.0 - dtheta * dtheta / 12.0
        } else {
            -(half_dtheta * transform.rotation.sin_angle()) / cos_minus_one
        };

        let translation_part = UnitComplex::new((-half_dtheta).atan2(half_theta_by_tan_half_dtheta))
            * transform.translation_m
            * half_theta_by_tan_half_dtheta.hypot(half_dtheta);

        Twist2::new(translation_part[0], translation_part[1], dtheta)
    }

    /// Interpolate along the constant curvature arc joining this pose to
    /// `end`.
    ///
    /// `t` is clamped to [0, 1].
    pub fn interpolate(&self, end: &Pose2, t: f64) -> Self {
        if t <= 0.0 {
            *self
        } else if t >= 1.0 {
            *end
        } else {
            self.exp(&(self.log(end) * t))
        }
    }
}

impl Default for Pose2 {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const EPS: f64 = 1e-9;

    fn assert_pose_eq(a: &Pose2, b: &Pose2) {
        assert!(a.distance_to(b) < EPS, "{:?} != {:?}", a, b);
        assert!(
            (a.heading.inverse() * b.heading).angle().abs() < EPS,
            "{:?} != {:?}",
            a,
            b
        );
    }

    #[test]
    fn test_exp_quarter_circle() {
        let end = Pose2::identity().exp(&Twist2::new(FRAC_PI_2, 0.0, FRAC_PI_2));

        assert_pose_eq(&end, &Pose2::new(1.0, 1.0, FRAC_PI_2));
    }

    #[test]
    fn test_exp_straight() {
        let start = Pose2::new(1.0, 2.0, FRAC_PI_2);
        let end = start.exp(&Twist2::new(3.0, 0.5, 0.0));

        assert_pose_eq(&end, &Pose2::new(0.5, 5.0, FRAC_PI_2));
    }

    #[test]
    fn test_log_inverts_exp() {
        let start = Pose2::new(-1.0, 3.0, 0.3);
        let end = Pose2::new(2.0, 0.5, -2.1);

        let twist = start.log(&end);
        assert_pose_eq(&start.exp(&twist), &end);

        // A half turn on the spot is still recoverable
        let flipped = Pose2::new(-1.0, 3.0, 0.3 + PI);
        let twist = start.log(&flipped);
        assert!(twist.dx_m.abs() < EPS && twist.dy_m.abs() < EPS);
        assert_pose_eq(&start.exp(&twist), &flipped);
    }

    #[test]
    fn test_relative_to_and_transform_by() {
        let origin = Pose2::new(1.0, 1.0, FRAC_PI_2);
        let pose = Pose2::new(1.0, 3.0, PI);

        let rel = pose.relative_to(&origin);
        assert_pose_eq(&rel, &Pose2::new(2.0, 0.0, FRAC_PI_2));

        let transform = Transform2::between(&origin, &pose);
        assert_pose_eq(&origin.transform_by(&transform), &pose);
        assert_pose_eq(
            &pose.transform_by(&transform.inverse()),
            &origin,
        );
    }

    #[test]
    fn test_interpolate() {
        let start = Pose2::identity();
        let end = Pose2::new(4.0, 0.0, 0.0);

        assert_pose_eq(&start.interpolate(&end, 0.25), &Pose2::new(1.0, 0.0, 0.0));
        assert_pose_eq(&start.interpolate(&end, -1.0), &start);
        assert_pose_eq(&start.interpolate(&end, 2.0), &end);
    }
}
