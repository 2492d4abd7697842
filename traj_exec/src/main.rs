//! Trajectory executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and drive control
//!     - Plan the trajectory from the generation parameters and save it to the session
//!     - Main loop, at a fixed period:
//!         - Drive control processing and archiving
//!     - Exit once the end of the trajectory is reached
//!
//! # Usage
//!
//!     traj_exec [TRAJ_GEN_PARAMS]
//!
//! where `TRAJ_GEN_PARAMS` is the trajectory generation parameter file relative to the params
//! directory, `traj_gen.toml` by default.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use traj_lib::{
    drive_ctrl::{DriveCtrl, InputData},
    trajectory::{generator, TrajGenParams, TrajectoryConfig},
};
use util::{
    logger::{logger_init, LevelFilter},
    module::CyclicModule,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.02;

/// Default trajectory generation parameter file.
const DEFAULT_TRAJ_GEN_PARAMS: &str = "traj_gen.toml";

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("traj_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger, the kinematics cache and spline parameteriser trace every call
    logger_init(
        LevelFilter::Trace,
        &[
            ("traj_lib::kinematics", LevelFilter::Debug),
            ("traj_lib::spline", LevelFilter::Debug),
        ],
        Some(&session),
    )
    .wrap_err("Failed to initialise logging")?;

    info!("Trajectory Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let args: Vec<String> = env::args().collect();
    debug!("CLI arguments: {:?}", args);

    let traj_gen_path = match args.len() {
        2 => args[1].as_str(),
        _ => DEFAULT_TRAJ_GEN_PARAMS,
    };

    let traj_gen_params: TrajGenParams = util::params::load(traj_gen_path)
        .wrap_err_with(|| format!("Could not load the trajectory parameters from {}", traj_gen_path))?;

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    let mut drive_ctrl = DriveCtrl::default();
    drive_ctrl
        .init("drive_ctrl.toml", Some(&session))
        .wrap_err("Failed to initialise DriveCtrl")?;

    info!("Module initialisation complete\n");

    // ---- PLAN TRAJECTORY ----

    let mut traj_config = TrajectoryConfig::from_params(&traj_gen_params);

    if let Some(max_wheel_speed_ms) = traj_gen_params.max_wheel_speed_ms {
        if let Some(constraint) = drive_ctrl.trajectory_constraint(max_wheel_speed_ms) {
            traj_config = traj_config.add_boxed_constraint(constraint);
        }
    }

    let trajectory = generator::generate_from_params(&traj_gen_params, &traj_config)
        .wrap_err("Failed to generate the trajectory")?;

    info!(
        "Trajectory planned: {} states over {:.3} s",
        trajectory.states().len(),
        trajectory.total_time_s()
    );

    session
        .save_json("trajectory.json", &trajectory)
        .wrap_err("Failed to save the trajectory")?;

    drive_ctrl.load_trajectory(trajectory);

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let traj_start_instant = Instant::now();
    let mut num_cycles: u64 = 0;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- DRIVE CONTROL ----

        let input = InputData {
            time_s: (cycle_start_instant - traj_start_instant).as_secs_f64(),
        };

        let (_, report) = drive_ctrl
            .proc_and_archive(&input)
            .wrap_err("Error during DriveCtrl processing")?;

        if report.normalised {
            debug!("Wheel demands normalised at {:.3} s", input.time_s);
        }

        num_cycles += 1;

        if report.finished {
            info!("End of trajectory reached after {} cycles", num_cycles);
            break;
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
            ),
        }
    }

    // ---- SHUTDOWN ----

    info!("End of execution");

    Ok(())
}
