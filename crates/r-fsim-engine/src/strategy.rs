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
use std::sync::Arc;

/// Integrator advancing the physical state vector.
pub trait SimulationStepper: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;
}

/// Aerodynamic force and moment calculator.
pub trait AerodynamicCalculator: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;
}

/// Mass, centre of gravity and inertia calculator.
pub trait MassCalculator: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;
}

/// Algorithm selections held by a single run and handed to the engine.
#[derive(Debug, Clone)]
pub struct StrategySet {
    pub stepper: Arc<dyn SimulationStepper>,
    pub aerodynamics: Arc<dyn AerodynamicCalculator>,
    pub mass: Arc<dyn MassCalculator>,
}

impl StrategySet {
    pub fn new(
        stepper: Arc<dyn SimulationStepper>,
        aerodynamics: Arc<dyn AerodynamicCalculator>,
        mass: Arc<dyn MassCalculator>,
    ) -> Self {
        Self {
            stepper,
            aerodynamics,
            mass,
        }
    }

    /// Strategy names in `stepper/aerodynamics/mass` order, for diagnostics.
    pub fn describe(&self) -> String {
        format!(
            "{}/{}/{}",
            self.stepper.name(),
            self.aerodynamics.name(),
            self.mass.name()
        )
    }
}
