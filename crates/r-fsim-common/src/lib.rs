//! ---
//! fsim_section: "01-core-functionality"
//! fsim_subsection: "module"
//! fsim_type: "source"
//! fsim_scope: "code"
//! fsim_description: "Shared primitives and utilities for the core runtime."
//! fsim_version: "v0.1.0"
//! fsim_owner: "tbd"
//! ---
//! Shared primitives for the R-FSIM workspace: configuration loading, tracing
//! bootstrap and timing helpers consumed by the run core.

pub mod config;
pub mod limits;
pub mod logging;
pub mod time;

pub use config::{AppConfig, LoadedAppConfig, LoggingConfig, SimulationDefaults};
pub use limits::{LaunchParameters, LimitViolation};
pub use logging::{init_tracing, LogFormat};
