//! ---
//! fsim_section: "11-simulation"
//! fsim_subsection: "module"
//! fsim_type: "source"
//! fsim_scope: "code"
//! fsim_description: "Engine-side interfaces shared with the run orchestration core."
//! fsim_version: "v0.1.0"
//! fsim_owner: "tbd"
//! ---
//! Interfaces between the R-FSIM run core and its external collaborators.
//!
//! The numerical engine, its stepper and the aerodynamic and mass calculators
//! live outside this workspace. This crate only fixes the contracts the run
//! core relies on: the shared [`Design`], the [`EngineFactory`] /
//! [`SimulationEngine`] pair, per-run [`StrategySet`] selections, extension
//! [`SimulationListener`]s and the [`FlightData`] produced by a run.

pub mod conditions;
pub mod design;
pub mod engine;
pub mod error;
pub mod flight;
pub mod listener;
pub mod strategy;

pub use conditions::{IntegrationSettings, LaunchConditions, SimulationConditions};
pub use design::Design;
pub use engine::{EngineFactory, SimulationEngine};
pub use error::{EngineBuildError, SimulationError};
pub use flight::{FlightData, FlightEvent, FlightEventKind, WarningSet};
pub use listener::SimulationListener;
pub use strategy::{AerodynamicCalculator, MassCalculator, SimulationStepper, StrategySet};
