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
use crate::error::{EngineBuildError, SimulationError};
use crate::flight::FlightData;

/// A numerical simulation engine.
///
/// `simulate` runs synchronously and may take arbitrarily long. The engine is
/// responsible for invoking the listeners carried by the conditions.
pub trait SimulationEngine: Send {
    fn simulate(&mut self, conditions: SimulationConditions) -> Result<FlightData, SimulationError>;
}

/// Stateless factory producing a fresh engine for every attempt.
pub trait EngineFactory: Send + Sync + fmt::Debug {
    /// Identifier used in logs and error messages.
    fn name(&self) -> &str;

    fn create(&self) -> Result<Box<dyn SimulationEngine>, EngineBuildError>;
}
