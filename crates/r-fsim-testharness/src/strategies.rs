//! ---
//! fsim_section: "15-testing"
//! fsim_subsection: "module"
//! fsim_type: "source"
//! fsim_scope: "code"
//! fsim_description: "Test harness fixtures and shared exports."
//! fsim_version: "v0.1.0"
//! fsim_owner: "tbd"
//! ---
use std::sync::Arc;

use r_fsim_engine::{AerodynamicCalculator, MassCalculator, SimulationStepper, StrategySet};

#[derive(Debug, Clone)]
pub struct NamedStepper(pub String);

impl SimulationStepper for NamedStepper {
    fn name(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct NamedAerodynamics(pub String);

impl AerodynamicCalculator for NamedAerodynamics {
    fn name(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct NamedMass(pub String);

impl MassCalculator for NamedMass {
    fn name(&self) -> &str {
        &self.0
    }
}

/// `rk4/barrowman/basic` selections.
pub fn default_strategies() -> StrategySet {
    StrategySet::new(
        Arc::new(NamedStepper("rk4".into())),
        Arc::new(NamedAerodynamics("barrowman".into())),
        Arc::new(NamedMass("basic".into())),
    )
}
