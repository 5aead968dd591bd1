//! ---
//! fsim_section: "11-simulation"
//! fsim_subsection: "module"
//! fsim_type: "source"
//! fsim_scope: "code"
//! fsim_description: "Engine-side interfaces shared with the run orchestration core."
//! fsim_version: "v0.1.0"
//! fsim_owner: "tbd"
//! ---
use std::fmt;

use crate::conditions::SimulationConditions;
use crate::error::SimulationError;
use crate::flight::FlightData;

/// Extension observing or participating in a single simulation attempt.
///
/// Instances are created per attempt, either supplied directly by the caller
/// or resolved from a plugin identifier, and are owned by the conditions
/// handed to the engine.
pub trait SimulationListener: Send + fmt::Debug {
    fn name(&self) -> &str;

    /// Called by the engine before the first integration step.
    fn start_simulation(&mut self, _conditions: &SimulationConditions) -> Result<(), SimulationError> {
        Ok(())
    }

    /// Called by the engine once the attempt has finished, successfully or not.
    fn end_simulation(&mut self, _outcome: Result<&FlightData, &SimulationError>) {}
}
