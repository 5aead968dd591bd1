//! ---
//! fsim_section: "01-core-functionality"
//! fsim_subsection: "module"
//! fsim_type: "source"
//! fsim_scope: "code"
//! fsim_description: "Simulation run lifecycle and orchestration."
//! fsim_version: "v0.1.0"
//! fsim_owner: "tbd"
//! ---
//! Run orchestration core for R-FSIM.
//!
//! [`SimulationRun`] is the unit of work: it owns its options and plugin
//! list, references a shared design, and commits engine results atomically
//! together with the inputs that produced them. Shared collaborators (engine
//! factory, plugin registry, strategy defaults, configuration defaults) are
//! grouped in a [`SimulationEnvironment`].

pub mod environment;
pub mod error;
pub mod guard;
pub mod listeners;
pub mod options;
pub mod result;
pub mod simulation;
pub mod status;

pub use environment::SimulationEnvironment;
pub use error::{OptionsError, Result, RunError};
pub use guard::{ConcurrencyGuard, ConcurrencyViolation, WriteGuard};
pub use listeners::{
    ChangeEvent, ChangeNotifier, ChangeSource, ListenerId, PluginError, PluginFactory, PluginIds,
    PluginRegistry, StateChangeListener,
};
pub use options::{OptionsHandle, SimulationOptions};
pub use result::{CommittedResult, Provenance};
pub use simulation::{MotorConfiguration, PersistedSimulation, SimulationRun};
pub use status::{effective_status, SimulationStatus};
