//! Implementations for the DriveCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace};
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use super::{DriveCtrlError, Drivetrain, Params, WheelDemands};
use crate::{
    kinematics::ChassisSpeeds,
    trajectory::{self, constraint::TrajectoryConstraint},
};
use util::{
    archive::{Archived, Archiver},
    module::CyclicModule,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive control module state
#[derive(Default)]
pub struct DriveCtrl {
    params: Option<Params>,

    drivetrain: Option<Drivetrain>,

    trajectory: Option<trajectory::Trajectory>,

    report: StatusReport,
    arch_report: Archiver,

    output: Option<OutputData>,
    arch_sample: Archiver,
    arch_demands: Archiver,
}

/// Input data to drive control.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputData {
    /// Time since the start of the trajectory.
    ///
    /// Units: seconds
    pub time_s: f64,
}

/// Output demands from DriveCtrl that the motor drivers must execute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputData {
    /// The trajectory state being followed, `None` if there is no trajectory.
    pub sample: Option<trajectory::State>,

    /// Feed-forward chassis speeds for the sampled state.
    pub chassis_speeds: ChassisSpeeds,

    /// Normalised wheel or module demands.
    pub demands: WheelDemands,
}

/// Status report for DriveCtrl processing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatusReport {
    /// True if a trajectory is loaded.
    pub trajectory_loaded: bool,

    /// True if the wheel demands had to be scaled down noticeably, by more than
    /// `NORMALISE_REPORT_TOLERANCE`, to stay within the maximum wheel speed.
    pub normalised: bool,

    /// True once the end of the trajectory has been reached.
    pub finished: bool,
}

/// Flattened copy of the sampled state and chassis speeds for the archive.
#[derive(Serialize)]
struct SampleRecord {
    time_s: f64,
    x_m: f64,
    y_m: f64,
    heading_rad: f64,
    velocity_ms: f64,
    acceleration_mss: f64,
    curvature_m: f64,
    vx_ms: f64,
    vy_ms: f64,
    omega_rads: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CyclicModule for DriveCtrl {
    type InitData = &'static str;
    type InitError = DriveCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = DriveCtrlError;

    /// Initialise the DriveCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(
        &mut self,
        init_data: Self::InitData,
        session: Option<&Session>,
    ) -> Result<(), Self::InitError> {
        let params = params::load(init_data)?;

        self.init_with_params(params, session)
    }

    /// Perform cyclic processing of drive control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        let (params, drivetrain) = match (&self.params, &self.drivetrain) {
            (Some(p), Some(d)) => (p, d),
            _ => return Err(DriveCtrlError::NotInitialised),
        };

        // Sample the trajectory and find the feed-forward speeds, or stay still if there's
        // nothing to follow.
        let (sample, chassis_speeds) = match self.trajectory {
            Some(ref traj) => {
                let s = traj.sample(input_data.time_s);

                self.report.trajectory_loaded = true;
                self.report.finished = input_data.time_s >= traj.total_time_s();

                (
                    Some(s),
                    ChassisSpeeds::new(s.velocity_ms, 0.0, s.velocity_ms * s.curvature_m),
                )
            }
            None => (None, ChassisSpeeds::default()),
        };

        let mut demands = drivetrain.to_wheel_demands(
            &chassis_speeds,
            &Vector2::from(params.centre_of_rotation_m),
        );
        self.report.normalised = demands.normalize(params.max_wheel_speed_ms);

        trace!(
            "DriveCtrl output:\n    chassis: {:?}\n    demands: {:?}",
            chassis_speeds,
            demands
        );

        let output = OutputData {
            sample,
            chassis_speeds,
            demands,
        };

        self.output = Some(output.clone());

        Ok((output, self.report))
    }
}

impl Archived for DriveCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        // All archivers are set up together, so none will write anything
        if !self.arch_report.is_active() {
            return Ok(());
        }

        self.arch_report.serialise(self.report)?;

        if let Some(ref output) = self.output {
            if let Some(s) = output.sample {
                self.arch_sample.serialise(SampleRecord {
                    time_s: s.time_s,
                    x_m: s.pose.x_m(),
                    y_m: s.pose.y_m(),
                    heading_rad: s.pose.get_heading(),
                    velocity_ms: s.velocity_ms,
                    acceleration_mss: s.acceleration_mss,
                    curvature_m: s.curvature_m,
                    vx_ms: output.chassis_speeds.vx_ms,
                    vy_ms: output.chassis_speeds.vy_ms,
                    omega_rads: output.chassis_speeds.omega_rads,
                })?;
            }

            self.arch_demands.serialise(output.demands.to_record())?;
        }

        Ok(())
    }
}

impl DriveCtrl {
    /// Initialise the module from already loaded parameters.
    pub fn init_with_params(
        &mut self,
        params: Params,
        session: Option<&Session>,
    ) -> Result<(), DriveCtrlError> {
        let drivetrain = Drivetrain::from_params(&params.drivetrain)?;

        if let Some(session) = session {
            let archiver = |path: &str| {
                Archiver::from_path(session, path)
                    .map_err(|e| DriveCtrlError::ArchiveInitError(e.to_string()))
            };

            self.arch_report = archiver("drive_ctrl/status_report.csv")?;
            self.arch_sample = archiver("drive_ctrl/sample.csv")?;
            self.arch_demands = archiver("drive_ctrl/demands.csv")?;
        }

        info!(
            "DriveCtrl initialised with a {} drivetrain",
            match drivetrain {
                Drivetrain::Mecanum(_) => "mecanum",
                Drivetrain::Swerve(_) => "swerve",
                Drivetrain::Differential(_) => "differential",
            }
        );

        self.params = Some(params);
        self.drivetrain = Some(drivetrain);

        Ok(())
    }

    /// Set the trajectory to follow, replacing any previous trajectory.
    ///
    /// Times passed to `proc` are measured from the start of this trajectory.
    pub fn load_trajectory(&mut self, trajectory: trajectory::Trajectory) {
        info!(
            "Loaded a {:.3} s trajectory with {} states",
            trajectory.total_time_s(),
            trajectory.states().len()
        );

        self.trajectory = Some(trajectory);
    }

    pub fn drivetrain(&self) -> Option<&Drivetrain> {
        self.drivetrain.as_ref()
    }

    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }

    /// A trajectory constraint keeping every wheel below `max_wheel_speed_ms` when driven by
    /// this module, about its configured centre of rotation.
    ///
    /// Returns `None` if the module isn't initialised.
    pub fn trajectory_constraint(
        &self,
        max_wheel_speed_ms: f64,
    ) -> Option<Box<dyn TrajectoryConstraint>> {
        match (&self.params, &self.drivetrain) {
            (Some(p), Some(d)) => Some(d.constraint(
                max_wheel_speed_ms,
                &Vector2::from(p.centre_of_rotation_m),
            )),
            _ => None,
        }
    }
}
