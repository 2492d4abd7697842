//! Cyclic module interface
//!
//! Every module run from the `traj_exec` main loop implements [`CyclicModule`]:
//! it's initialised once with its parameters and then processed once per
//! cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::warn;

// Internal imports
use crate::{archive::Archived, session::Session};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A module which is processed once per control cycle.
pub trait CyclicModule {
    /// Data required during initialisation
    type InitData;
    /// An error which can occur during initialisation.
    type InitError;

    /// Data required for cyclic processing.
    type InputData;
    /// Data produced by cyclic processing.
    type OutputData;
    /// A report on the status of the cyclic processing.
    type StatusReport;
    /// An error which can occur during cyclic processing.
    type ProcError;

    /// Initialise the module.
    ///
    /// # Inputs
    /// - `init_data`: The data required to initialise the module
    /// - `session`: The current session, `None` if archiving is not wanted
    fn init(&mut self, init_data: Self::InitData, session: Option<&Session>)
        -> Result<(), Self::InitError>;

    /// Main module processing function.
    ///
    /// # Outputs
    /// - On success a tuple of the output data and status report.
    /// - On error a `ProcError` instance.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;

    /// Process one cycle and then write the module's archives.
    ///
    /// A failure to write the archives is logged but does not fail the cycle.
    fn proc_and_archive(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    where
        Self: Archived + Sized,
    {
        let result = self.proc(input_data)?;

        if let Err(e) = self.write() {
            warn!("Could not write the module archives: {}", e);
        }

        Ok(result)
    }
}
