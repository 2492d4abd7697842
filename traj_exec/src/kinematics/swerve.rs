//! Swerve drive kinematics

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{cell::RefCell, f64::consts::PI};

use nalgebra::{DMatrix, DVector, UnitComplex, Vector2};
use serde::{Deserialize, Serialize};

use super::{normalize_speeds, pseudo_inverse, ChassisSpeeds, InverseKinematicsCache, KinematicsError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Kinematics for a swerve drive with any number (two or more) of independently steered modules.
///
/// Module states are always in the same order as the module positions given to
/// [`SwerveDriveKinematics::new`].
#[derive(Debug, Clone)]
pub struct SwerveDriveKinematics {
    /// Position of each module relative to the centre of the robot.
    ///
    /// Units: meters
    module_positions_m: Vec<Vector2<f64>>,

    cache: RefCell<InverseKinematicsCache>,

    /// Pseudo-inverse of the inverse kinematics about the centre of the robot.
    forward_kinematics: DMatrix<f64>,
}

/// The speed and steering angle of one swerve module.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwerveModuleState {
    /// Units: meters/second
    pub speed_ms: f64,

    /// Steering angle of the module relative to the robot's forward direction.
    pub angle: UnitComplex<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SwerveDriveKinematics {
    /// Create a new swerve drive from the positions of its modules relative to the centre of the
    /// robot.
    pub fn new(module_positions_m: Vec<Vector2<f64>>) -> Result<Self, KinematicsError> {
        if module_positions_m.len() < 2 {
            return Err(KinematicsError::NotEnoughModules(module_positions_m.len()));
        }

        let centre_m = Vector2::zeros();
        let inverse_kinematics = build_inverse_kinematics(&module_positions_m, &centre_m);
        let forward_kinematics = pseudo_inverse(&inverse_kinematics)?;

        Ok(Self {
            module_positions_m,
            cache: RefCell::new(InverseKinematicsCache::new(centre_m, inverse_kinematics)),
            forward_kinematics,
        })
    }

    pub fn num_modules(&self) -> usize {
        self.module_positions_m.len()
    }

    pub fn module_positions_m(&self) -> &[Vector2<f64>] {
        &self.module_positions_m
    }

    /// The centre of rotation the cached inverse kinematics were built for.
    pub fn cached_centre_of_rotation_m(&self) -> Vector2<f64> {
        self.cache.borrow().centre_of_rotation_m()
    }

    /// Get the module states for the given chassis speeds, rotating about the centre of the
    /// robot.
    pub fn to_module_states(&self, speeds: &ChassisSpeeds) -> Vec<SwerveModuleState> {
        self.to_module_states_about(speeds, &Vector2::zeros())
    }

    /// Get the module states for the given chassis speeds, rotating about `centre_of_rotation_m`.
    ///
    /// The module speeds are not normalised, so may be above what the modules can achieve.
    pub fn to_module_states_about(
        &self,
        speeds: &ChassisSpeeds,
        centre_of_rotation_m: &Vector2<f64>,
    ) -> Vec<SwerveModuleState> {
        let module_vels =
            InverseKinematicsCache::apply(&self.cache, centre_of_rotation_m, speeds, |cor| {
                build_inverse_kinematics(&self.module_positions_m, cor)
            });

        module_vels
            .as_slice()
            .chunks(2)
            .map(|v| SwerveModuleState::new(v[0].hypot(v[1]), v[1].atan2(v[0])))
            .collect()
    }

    /// Get the least squares chassis speeds which best explain the given module states.
    pub fn to_chassis_speeds(
        &self,
        module_states: &[SwerveModuleState],
    ) -> Result<ChassisSpeeds, KinematicsError> {
        if module_states.len() != self.num_modules() {
            return Err(KinematicsError::ModuleCountMismatch {
                expected: self.num_modules(),
                found: module_states.len(),
            });
        }

        let module_vels = DVector::from_iterator(
            2 * module_states.len(),
            module_states.iter().flat_map(|s| {
                let v = s.angle * Vector2::new(s.speed_ms, 0.0);
                IntoIterator::into_iter([v.x, v.y])
            }),
        );

        Ok(ChassisSpeeds::from_vector(
            &(&self.forward_kinematics * module_vels),
        ))
    }

    /// Scale all module speeds down by the same factor if any is faster than `attainable_max_ms`.
    ///
    /// Returns true if the fastest was more than `NORMALISE_REPORT_TOLERANCE` over the maximum.
    pub fn normalize_module_speeds(states: &mut [SwerveModuleState], attainable_max_ms: f64) -> bool {
        let mut speeds: Vec<f64> = states.iter().map(|s| s.speed_ms).collect();
        let scaled = normalize_speeds(&mut speeds, attainable_max_ms);

        for (state, speed) in states.iter_mut().zip(speeds) {
            state.speed_ms = speed;
        }

        scaled
    }
}

impl SwerveModuleState {
    pub fn new(speed_ms: f64, angle_rad: f64) -> Self {
        Self {
            speed_ms,
            angle: UnitComplex::new(angle_rad),
        }
    }

    /// Units: radians
    pub fn angle_rad(&self) -> f64 {
        self.angle.angle()
    }

    /// Minimise the steering needed to reach `desired` from the module's `current_angle`.
    ///
    /// If reaching the desired angle would need more than a quarter turn the module is instead
    /// steered to the opposite angle and driven backwards.
    pub fn optimize(desired: &SwerveModuleState, current_angle: &UnitComplex<f64>) -> Self {
        let delta_rad = (current_angle.inverse() * desired.angle).angle();

        if delta_rad.abs() > PI / 2.0 {
            Self {
                speed_ms: -desired.speed_ms,
                angle: desired.angle * UnitComplex::new(PI),
            }
        } else {
            *desired
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the 2N x 3 matrix taking `[vx, vy, omega]` to the x and y velocity of each module, for
/// rotation about the given point.
fn build_inverse_kinematics(
    module_positions_m: &[Vector2<f64>],
    centre_of_rotation_m: &Vector2<f64>,
) -> DMatrix<f64> {
    let mut matrix = DMatrix::zeros(2 * module_positions_m.len(), 3);

    for (i, pos) in module_positions_m.iter().enumerate() {
        matrix[(2 * i, 0)] = 1.0;
        matrix[(2 * i, 2)] = -pos.y + centre_of_rotation_m.y;
        matrix[(2 * i + 1, 1)] = 1.0;
        matrix[(2 * i + 1, 2)] = pos.x - centre_of_rotation_m.x;
    }

    matrix
}
