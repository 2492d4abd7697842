//! Centripetal acceleration constraint

use util::geom::Pose2;

use super::TrajectoryConstraint;

/// Limits the velocity around bends so that the centripetal acceleration of the robot stays
/// below a maximum, which keeps the wheels from slipping on tight turns.
#[derive(Debug, Clone, Copy)]
pub struct CentripetalAccelerationConstraint {
    /// Units: meters/second^2
    pub max_centripetal_accel_mss: f64,
}

impl CentripetalAccelerationConstraint {
    pub fn new(max_centripetal_accel_mss: f64) -> Self {
        Self {
            max_centripetal_accel_mss,
        }
    }
}

impl TrajectoryConstraint for CentripetalAccelerationConstraint {
    fn max_velocity_ms(&self, _pose: &Pose2, curvature_m: f64, _velocity_ms: f64) -> f64 {
        // a_c = v^2 * k, infinite on straights.
        (self.max_centripetal_accel_mss / curvature_m.abs()).sqrt()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_centripetal_limit() {
        let constraint = CentripetalAccelerationConstraint::new(2.0);
        let pose = Pose2::identity();

        // 0.5 m radius
        assert!((constraint.max_velocity_ms(&pose, 2.0, 5.0) - 1.0).abs() < 1e-12);
        assert!((constraint.max_velocity_ms(&pose, -2.0, 5.0) - 1.0).abs() < 1e-12);
        assert_eq!(constraint.max_velocity_ms(&pose, 0.0, 5.0), f64::INFINITY);

        let min_max = constraint.min_max_acceleration(&pose, 2.0, 1.0);
        assert_eq!(min_max.max_acceleration_mss, f64::INFINITY);
    }
}
