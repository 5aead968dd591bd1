//! ---
//! fsim_section: "01-core-functionality"
//! fsim_subsection: "module"
//! fsim_type: "source"
//! fsim_scope: "code"
//! fsim_description: "Simulation run lifecycle and orchestration."
//! fsim_version: "v0.1.0"
//! fsim_owner: "tbd"
//! ---
use r_fsim_engine::{EngineBuildError, SimulationError};
use thiserror::Error;

use crate::guard::ConcurrencyViolation;
use crate::listeners::PluginError;

/// Out-of-range launch or integration parameter.
pub use r_fsim_common::limits::LimitViolation as OptionsError;

pub type Result<T> = std::result::Result<T, RunError>;

/// Errors surfaced by [`SimulationRun`](crate::SimulationRun) operations.
///
/// Every variant leaves the run exactly as it was before the call.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid simulation definition: {0}")]
    InvalidDefinition(String),
    #[error("invalid simulation options: {0}")]
    InvalidOptions(#[from] OptionsError),
    #[error("cannot simulate imported simulation")]
    ExternalSimulation,
    #[error("could not instantiate simulation listener {id}: {source}")]
    ListenerResolution {
        id: String,
        #[source]
        source: PluginError,
    },
    #[error("simulation engine unavailable: {0}")]
    EngineUnavailable(#[from] EngineBuildError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error("simulation run misuse: {0}")]
    Concurrency(#[from] ConcurrencyViolation),
}
