//! Constraints on velocity over the whole path or a region of it

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;

use util::geom::Pose2;

use super::{MinMax, TrajectoryConstraint};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A fixed maximum velocity.
#[derive(Debug, Clone, Copy)]
pub struct MaxVelocityConstraint {
    /// Units: meters/second
    pub max_velocity_ms: f64,
}

/// Applies an inner constraint only while the robot is inside an axis aligned rectangle.
#[derive(Debug)]
pub struct RectangularRegionConstraint {
    /// Units: meters
    bottom_left_m: Vector2<f64>,

    /// Units: meters
    top_right_m: Vector2<f64>,

    constraint: Box<dyn TrajectoryConstraint>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MaxVelocityConstraint {
    pub fn new(max_velocity_ms: f64) -> Self {
        Self { max_velocity_ms }
    }
}

impl TrajectoryConstraint for MaxVelocityConstraint {
    fn max_velocity_ms(&self, _pose: &Pose2, _curvature_m: f64, _velocity_ms: f64) -> f64 {
        self.max_velocity_ms
    }
}

impl RectangularRegionConstraint {
    /// Create a new region constraint, the corners may be given in any order.
    pub fn new<C>(corner_a_m: Vector2<f64>, corner_b_m: Vector2<f64>, constraint: C) -> Self
    where
        C: TrajectoryConstraint + 'static,
    {
        Self {
            bottom_left_m: corner_a_m.inf(&corner_b_m),
            top_right_m: corner_a_m.sup(&corner_b_m),
            constraint: Box::new(constraint),
        }
    }

    /// True if the position of the pose is inside the region, including its edges.
    pub fn is_pose_in_region(&self, pose: &Pose2) -> bool {
        let p = &pose.position_m;

        p.x >= self.bottom_left_m.x
            && p.x <= self.top_right_m.x
            && p.y >= self.bottom_left_m.y
            && p.y <= self.top_right_m.y
    }
}

impl TrajectoryConstraint for RectangularRegionConstraint {
    fn max_velocity_ms(&self, pose: &Pose2, curvature_m: f64, velocity_ms: f64) -> f64 {
        if self.is_pose_in_region(pose) {
            self.constraint
                .max_velocity_ms(pose, curvature_m, velocity_ms)
        } else {
            f64::INFINITY
        }
    }

    fn min_max_acceleration(&self, pose: &Pose2, curvature_m: f64, velocity_ms: f64) -> MinMax {
        if self.is_pose_in_region(pose) {
            self.constraint
                .min_max_acceleration(pose, curvature_m, velocity_ms)
        } else {
            MinMax::default()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_region() {
        let region = RectangularRegionConstraint::new(
            Vector2::new(2.0, 1.0),
            Vector2::new(0.0, -1.0),
            MaxVelocityConstraint::new(0.5),
        );

        let inside = Pose2::new(1.0, 0.0, 0.0);
        let edge = Pose2::new(2.0, 1.0, 0.0);
        let outside = Pose2::new(3.0, 0.0, 0.0);

        assert!(region.is_pose_in_region(&inside));
        assert!(region.is_pose_in_region(&edge));
        assert!(!region.is_pose_in_region(&outside));

        assert_eq!(region.max_velocity_ms(&inside, 0.0, 2.0), 0.5);
        assert_eq!(region.max_velocity_ms(&outside, 0.0, 2.0), f64::INFINITY);
        assert_eq!(
            region.min_max_acceleration(&outside, 0.0, 2.0),
            MinMax::default()
        );
    }
}
