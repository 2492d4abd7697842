//! Trajectory generation configuration and parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::Deserialize;

use util::geom::Pose2;

use super::constraint::{
    CentripetalAccelerationConstraint, MaxVelocityConstraint, RectangularRegionConstraint,
    TrajectoryConstraint,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Limits and constraints used to time parameterise a path.
#[derive(Debug)]
pub struct TrajectoryConfig {
    /// Units: meters/second
    pub max_velocity_ms: f64,

    /// Units: meters/second^2
    pub max_acceleration_mss: f64,

    /// Speed at the start of the path, always positive even for reversed paths.
    ///
    /// Units: meters/second
    pub start_velocity_ms: f64,

    /// Speed at the end of the path, always positive even for reversed paths.
    ///
    /// Units: meters/second
    pub end_velocity_ms: f64,

    /// If true the path is driven backwards.
    pub reversed: bool,

    constraints: Vec<Box<dyn TrajectoryConstraint>>,
}

/// Parameters for trajectory generation, loaded from `traj_gen.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct TrajGenParams {
    /// The kind of spline to fit through the waypoints.
    pub spline_type: SplineType,

    /// Waypoints as `[x_m, y_m, heading_rad]`.
    ///
    /// Cubic paths only use the headings of the first and last waypoints, the headings through the
    /// interior waypoints are chosen to keep curvature continuous.
    pub waypoints: Vec<[f64; 3]>,

    /// Units: meters/second
    pub max_velocity_ms: f64,

    /// Units: meters/second^2
    pub max_acceleration_mss: f64,

    /// Units: meters/second
    #[serde(default)]
    pub start_velocity_ms: f64,

    /// Units: meters/second
    #[serde(default)]
    pub end_velocity_ms: f64,

    #[serde(default)]
    pub reversed: bool,

    /// If given, limits the centripetal acceleration around bends.
    ///
    /// Units: meters/second^2
    #[serde(default)]
    pub max_centripetal_accel_mss: Option<f64>,

    /// If given, limits the path speed so that no wheel of the drivetrain exceeds this speed.
    ///
    /// Units: meters/second
    #[serde(default)]
    pub max_wheel_speed_ms: Option<f64>,

    /// Regions of the path with a lower speed limit.
    #[serde(default)]
    pub slow_zones: Vec<SlowZoneParams>,
}

/// An axis aligned region with its own speed limit.
#[derive(Debug, Clone, Deserialize)]
pub struct SlowZoneParams {
    /// Units: meters
    pub corner_a_m: [f64; 2],

    /// Units: meters
    pub corner_b_m: [f64; 2],

    /// Units: meters/second
    pub max_velocity_ms: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
pub enum SplineType {
    Cubic,
    Quintic,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajectoryConfig {
    /// Create a new configuration starting and ending at rest, driving forwards, with no extra
    /// constraints.
    pub fn new(max_velocity_ms: f64, max_acceleration_mss: f64) -> Self {
        Self {
            max_velocity_ms,
            max_acceleration_mss,
            start_velocity_ms: 0.0,
            end_velocity_ms: 0.0,
            reversed: false,
            constraints: Vec::new(),
        }
    }

    /// Build the configuration described by the generation parameters.
    ///
    /// The drivetrain wheel speed constraint needs the drivetrain's kinematics, so it isn't added
    /// here.
    pub fn from_params(params: &TrajGenParams) -> Self {
        let mut config = Self::new(params.max_velocity_ms, params.max_acceleration_mss)
            .with_start_velocity(params.start_velocity_ms)
            .with_end_velocity(params.end_velocity_ms)
            .with_reversed(params.reversed);

        if let Some(accel) = params.max_centripetal_accel_mss {
            config = config.add_constraint(CentripetalAccelerationConstraint::new(accel));
        }

        for zone in &params.slow_zones {
            config = config.add_constraint(RectangularRegionConstraint::new(
                Vector2::from(zone.corner_a_m),
                Vector2::from(zone.corner_b_m),
                MaxVelocityConstraint::new(zone.max_velocity_ms),
            ));
        }

        config
    }

    pub fn with_start_velocity(mut self, start_velocity_ms: f64) -> Self {
        self.start_velocity_ms = start_velocity_ms;
        self
    }

    pub fn with_end_velocity(mut self, end_velocity_ms: f64) -> Self {
        self.end_velocity_ms = end_velocity_ms;
        self
    }

    pub fn with_reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    pub fn add_constraint<C>(self, constraint: C) -> Self
    where
        C: TrajectoryConstraint + 'static,
    {
        self.add_boxed_constraint(Box::new(constraint))
    }

    pub fn add_boxed_constraint(mut self, constraint: Box<dyn TrajectoryConstraint>) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn constraints(&self) -> &[Box<dyn TrajectoryConstraint>] {
        &self.constraints
    }
}

impl TrajGenParams {
    pub fn waypoint_poses(&self) -> Vec<Pose2> {
        self.waypoints
            .iter()
            .map(|w| Pose2::new(w[0], w[1], w[2]))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const PARAMS: &str = r#"
        spline_type = "Cubic"
        waypoints = [[0.0, 0.0, 0.0], [2.0, 1.0, 0.0], [4.0, 0.0, 0.0]]
        max_velocity_ms = 1.5
        max_acceleration_mss = 0.75
        end_velocity_ms = 0.2
        max_centripetal_accel_mss = 1.0

        [[slow_zones]]
        corner_a_m = [1.0, -1.0]
        corner_b_m = [3.0, 2.0]
        max_velocity_ms = 0.5
    "#;

    #[test]
    fn test_from_params() {
        let params: TrajGenParams = util::params::from_str(PARAMS).unwrap();

        assert_eq!(params.spline_type, SplineType::Cubic);
        assert_eq!(params.waypoint_poses().len(), 3);
        assert_eq!(params.start_velocity_ms, 0.0);
        assert!(!params.reversed);
        assert!(params.max_wheel_speed_ms.is_none());

        let config = TrajectoryConfig::from_params(&params);

        assert_eq!(config.max_velocity_ms, 1.5);
        assert_eq!(config.end_velocity_ms, 0.2);
        assert_eq!(config.constraints().len(), 2);

        // The slow zone only applies inside its region
        let inside = Pose2::new(2.0, 0.0, 0.0);
        let outside = Pose2::new(0.5, 0.0, 0.0);
        let zone = &config.constraints()[1];
        assert_eq!(zone.max_velocity_ms(&inside, 0.0, 1.5), 0.5);
        assert_eq!(zone.max_velocity_ms(&outside, 0.0, 1.5), f64::INFINITY);
    }
}
