//! ---
//! fsim_section: "11-simulation"
//! fsim_subsection: "module"
//! fsim_type: "source"
//! fsim_scope: "code"
//! fsim_description: "Engine-side interfaces shared with the run orchestration core."
//! fsim_version: "v0.1.0"
//! fsim_owner: "tbd"
//! ---
use thiserror::Error;

/// Failure raised by an engine while executing a simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("simulation diverged at t={time_s:.3}s: {reason}")]
    Divergence { time_s: f64, reason: String },
    #[error("invalid simulation configuration: {0}")]
    InvalidConfiguration(String),
    #[error("simulation listener {listener} failed: {reason}")]
    Listener { listener: String, reason: String },
    #[error("simulation exceeded the step limit of {limit}")]
    StepLimit { limit: u64 },
    #[error("simulation aborted: {0}")]
    Aborted(String),
}

/// Failure to construct an engine instance. Always a wiring defect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot instantiate simulation engine {engine}: {reason}")]
pub struct EngineBuildError {
    pub engine: String,
    pub reason: String,
}

impl EngineBuildError {
    pub fn new(engine: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
            reason: reason.into(),
        }
    }
}
