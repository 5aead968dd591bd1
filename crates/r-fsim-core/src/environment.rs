//! ---
//! fsim_section: "01-core-functionality"
//! fsim_subsection: "module"
//! fsim_type: "source"
//! fsim_scope: "code"
//! fsim_description: "Simulation run lifecycle and orchestration."
//! fsim_version: "v0.1.0"
//! fsim_owner: "tbd"
//! ---
use std::sync::Arc;

use r_fsim_common::config::{AppConfig, SimulationDefaults};
use r_fsim_engine::{EngineFactory, StrategySet};
use tracing::debug;

use crate::error::{Result, RunError};
use crate::listeners::PluginRegistry;

/// Collaborators shared by every run created in one application context.
///
/// Cheap to clone; runs keep their own clone.
#[derive(Debug, Clone)]
pub struct SimulationEnvironment {
    engine: Arc<dyn EngineFactory>,
    plugins: Arc<PluginRegistry>,
    strategies: StrategySet,
    defaults: Arc<SimulationDefaults>,
}

impl SimulationEnvironment {
    /// Environment with an empty plugin registry and built-in defaults.
    pub fn new(engine: Arc<dyn EngineFactory>, strategies: StrategySet) -> Self {
        Self {
            engine,
            plugins: Arc::new(PluginRegistry::new()),
            strategies,
            defaults: Arc::new(SimulationDefaults::default()),
        }
    }

    pub fn with_plugins(mut self, plugins: PluginRegistry) -> Self {
        self.plugins = Arc::new(plugins);
        self
    }

    pub fn with_defaults(mut self, defaults: SimulationDefaults) -> Self {
        self.defaults = Arc::new(defaults);
        self
    }

    /// Build the environment from loaded configuration.
    ///
    /// Every `default_plugins` entry must be registered, otherwise each fresh
    /// run would fail on its first attempt.
    pub fn from_config(
        config: &AppConfig,
        engine: Arc<dyn EngineFactory>,
        strategies: StrategySet,
        plugins: PluginRegistry,
    ) -> Result<Self> {
        if let Some(missing) = config
            .simulation
            .default_plugins
            .iter()
            .find(|id| !plugins.contains(id))
        {
            return Err(RunError::InvalidDefinition(format!(
                "default plugin {missing} is not registered"
            )));
        }
        debug!(
            engine = engine.name(),
            strategies = %strategies.describe(),
            plugins = plugins.len(),
            default_plugins = config.simulation.default_plugins.len(),
            "simulation environment configured"
        );
        Ok(Self::new(engine, strategies)
            .with_plugins(plugins)
            .with_defaults(config.simulation.clone()))
    }

    pub fn engine(&self) -> &Arc<dyn EngineFactory> {
        &self.engine
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    /// Strategy selection given to new runs.
    pub fn strategies(&self) -> &StrategySet {
        &self.strategies
    }

    pub fn defaults(&self) -> &SimulationDefaults {
        &self.defaults
    }
}
