//! ---
//! fsim_section: "15-testing"
//! fsim_subsection: "module"
//! fsim_type: "source"
//! fsim_scope: "code"
//! fsim_description: "Test harness fixtures and shared exports."
//! fsim_version: "v0.1.0"
//! fsim_owner: "tbd"
//! ---
//! Fixtures for exercising the run core without a numerical engine.
//!
//! Everything here implements the `r-fsim-engine` contracts only, so the
//! harness can be used from the core's unit tests as well as from
//! integration suites.

pub mod design;
pub mod engine;
pub mod plugins;
pub mod strategies;

pub use design::TestDesign;
pub use engine::{sample_flight, EngineCall, EngineHook, ScriptedEngineFactory};
pub use plugins::{CountingListener, ListenerLog};
pub use strategies::{default_strategies, NamedAerodynamics, NamedMass, NamedStepper};
