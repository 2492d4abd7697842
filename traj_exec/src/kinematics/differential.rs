//! Differential (tank/skid steer) drive kinematics

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::{normalize_speeds, ChassisSpeeds, KinematicsError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Kinematics for a drive with a left and a right set of wheels which can't steer.
///
/// A differential drive can't move sideways, so any `vy_ms` in the chassis speeds is ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferentialDriveKinematics {
    /// Distance between the left and right wheels.
    ///
    /// Units: meters
    pub track_width_m: f64,
}

/// Speed of each side of a differential drive.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferentialDriveWheelSpeeds {
    /// Units: meters/second
    pub left_ms: f64,

    /// Units: meters/second
    pub right_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DifferentialDriveKinematics {
    pub fn new(track_width_m: f64) -> Result<Self, KinematicsError> {
        if !(track_width_m > 0.0) {
            return Err(KinematicsError::InvalidGeometry(format!(
                "track width must be positive, got {} m",
                track_width_m
            )));
        }

        Ok(Self { track_width_m })
    }

    pub fn to_wheel_speeds(&self, speeds: &ChassisSpeeds) -> DifferentialDriveWheelSpeeds {
        let half_track_m = self.track_width_m / 2.0;

        DifferentialDriveWheelSpeeds {
            left_ms: speeds.vx_ms - half_track_m * speeds.omega_rads,
            right_ms: speeds.vx_ms + half_track_m * speeds.omega_rads,
        }
    }

    pub fn to_chassis_speeds(&self, wheel_speeds: &DifferentialDriveWheelSpeeds) -> ChassisSpeeds {
        ChassisSpeeds::new(
            (wheel_speeds.left_ms + wheel_speeds.right_ms) / 2.0,
            0.0,
            (wheel_speeds.right_ms - wheel_speeds.left_ms) / self.track_width_m,
        )
    }
}

impl DifferentialDriveWheelSpeeds {
    pub fn new(left_ms: f64, right_ms: f64) -> Self {
        Self { left_ms, right_ms }
    }

    /// Scale both sides down by the same factor if either is faster than `attainable_max_ms`.
    ///
    /// Returns true if the fastest was more than `NORMALISE_REPORT_TOLERANCE` over the maximum.
    pub fn normalize(&mut self, attainable_max_ms: f64) -> bool {
        let mut speeds = [self.left_ms, self.right_ms];
        let scaled = normalize_speeds(&mut speeds, attainable_max_ms);

        self.left_ms = speeds[0];
        self.right_ms = speeds[1];

        scaled
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_invalid_track_width() {
        assert!(DifferentialDriveKinematics::new(0.0).is_err());
        assert!(DifferentialDriveKinematics::new(-1.0).is_err());
        assert!(DifferentialDriveKinematics::new(f64::NAN).is_err());
    }

    #[test]
    fn test_wheel_speeds() {
        let kin = DifferentialDriveKinematics::new(0.5).unwrap();

        let straight = kin.to_wheel_speeds(&ChassisSpeeds::new(1.0, 0.0, 0.0));
        assert_eq!(straight, DifferentialDriveWheelSpeeds::new(1.0, 1.0));

        let spin = kin.to_wheel_speeds(&ChassisSpeeds::new(0.0, 0.0, 2.0));
        assert_eq!(spin, DifferentialDriveWheelSpeeds::new(-0.5, 0.5));
    }

    #[test]
    fn test_round_trip() {
        let kin = DifferentialDriveKinematics::new(0.6).unwrap();
        let speeds = ChassisSpeeds::new(1.2, 0.0, -0.8);

        let back = kin.to_chassis_speeds(&kin.to_wheel_speeds(&speeds));

        assert!((back.vx_ms - 1.2).abs() < 1e-12);
        assert!((back.omega_rads + 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_normalize() {
        let mut speeds = DifferentialDriveWheelSpeeds::new(-4.0, 2.0);

        assert!(speeds.normalize(2.0));
        assert_eq!(speeds, DifferentialDriveWheelSpeeds::new(-2.0, 1.0));
    }
}
