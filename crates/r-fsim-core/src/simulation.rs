//! ---
//! fsim_section: "01-core-functionality"
//! fsim_subsection: "module"
//! fsim_type: "source"
//! fsim_scope: "code"
//! fsim_description: "Simulation run lifecycle and orchestration."
//! fsim_version: "v0.1.0"
//! fsim_owner: "tbd"
//! ---
//! The simulation run aggregate.
//!
//! A [`SimulationRun`] binds options and a plugin list to a shared design,
//! drives the engine for one attempt at a time and keeps the last successful
//! result together with the inputs that produced it. Whether that result is
//! still current is derived on every [`SimulationRun::status`] call.
//!
//! Runs are single-writer objects. Write operations take the run's
//! [`ConcurrencyGuard`] and fail with [`RunError::Concurrency`] when it is
//! already held; read accessors panic if another thread is inside a write
//! operation.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;

use parking_lot::Mutex;
use r_fsim_common::time::elapsed_ms;
use r_fsim_engine::{
    AerodynamicCalculator, Design, FlightData, MassCalculator, SimulationListener,
    SimulationStepper, StrategySet, WarningSet,
};
use r_fsim_logging::{fsim_debug, fsim_error, fsim_info, log_system_event, LogContext, SystemEventOutcome};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::environment::SimulationEnvironment;
use crate::error::{Result, RunError};
use crate::guard::ConcurrencyGuard;
use crate::listeners::{ChangeEvent, ChangeNotifier, ChangeSource, ListenerId, PluginIds, StateChangeListener};
use crate::options::{OptionsHandle, SimulationOptions};
use crate::result::{CommittedResult, Provenance};
use crate::status::{effective_status, SimulationStatus};

const OP_SET_NAME: &str = "setName";
const OP_SET_STEPPER: &str = "setSimulationStepper";
const OP_SET_AERODYNAMICS: &str = "setAerodynamicCalculator";
const OP_SET_MASS: &str = "setMassCalculator";
const OP_SIMULATE: &str = "simulate";
const OP_COPY: &str = "copy";
const OP_DUPLICATE: &str = "duplicateSimulation";

/// Storage form of a run, as written by `to_persisted` and read by `from_persisted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSimulation {
    #[serde(default)]
    pub name: String,
    pub status: SimulationStatus,
    pub options: SimulationOptions,
    #[serde(default)]
    pub plugin_ids: Vec<String>,
    #[serde(default)]
    pub data: Option<FlightData>,
}

/// Motor configuration currently selected in a run's options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotorConfiguration {
    pub id: Option<String>,
    pub description: String,
}

struct RunState {
    name: String,
    status: SimulationStatus,
    strategies: StrategySet,
    result: Option<CommittedResult>,
}

struct RunInner {
    guard: ConcurrencyGuard,
    design: Arc<dyn Design>,
    environment: SimulationEnvironment,
    options: OptionsHandle,
    plugin_ids: PluginIds,
    notifier: ChangeNotifier,
    monitor: Arc<ConditionMonitor>,
    monitor_id: ListenerId,
    state: Mutex<RunState>,
    attempts: AtomicU64,
}

impl RunInner {
    // Lock order: state, then options.
    fn current_status(&self) -> SimulationStatus {
        let design_modification = self.design.functional_modification_id();
        let state = self.state.lock();
        let provenance = state.result.as_ref().and_then(CommittedResult::provenance);
        self.options.with(|live| {
            effective_status(state.status, provenance, live, design_modification)
        })
    }

    fn fire(&self, source: ChangeSource) {
        self.notifier.notify(&ChangeEvent::new(source));
    }
}

impl Drop for RunInner {
    fn drop(&mut self) {
        self.options.unsubscribe(self.monitor_id);
    }
}

/// Watches the run's options and re-fires the run's change event whenever the
/// derived status moves to a different value.
struct ConditionMonitor {
    run: Weak<RunInner>,
    last: Mutex<Option<SimulationStatus>>,
}

impl ConditionMonitor {
    fn new(run: Weak<RunInner>) -> Self {
        Self {
            run,
            last: Mutex::new(None),
        }
    }

    /// Record `status` as seen; returns whether it differs from the previous one.
    fn observe(&self, status: SimulationStatus) -> bool {
        let mut last = self.last.lock();
        let changed = *last != Some(status);
        *last = Some(status);
        changed
    }
}

impl StateChangeListener for ConditionMonitor {
    fn state_changed(&self, _event: &ChangeEvent) {
        let Some(run) = self.run.upgrade() else {
            return;
        };
        let status = run.current_status();
        if self.observe(status) {
            debug!(status = %status, "derived simulation status changed");
            run.fire(ChangeSource::Options);
        }
    }
}

/// One simulation of a design: options, plugins, status and committed result.
///
/// Cloning a `SimulationRun` yields another handle to the same run. Use
/// [`SimulationRun::copy`] for an independent run.
#[derive(Clone)]
pub struct SimulationRun {
    inner: Arc<RunInner>,
}

impl SimulationRun {
    /// Fresh run of `design` with options derived from the environment defaults.
    ///
    /// The plugin list starts with the configured default plugins.
    pub fn new(design: Arc<dyn Design>, environment: SimulationEnvironment) -> Self {
        let options = SimulationOptions::for_design(design.as_ref(), environment.defaults());
        let plugin_ids = PluginIds::new(environment.defaults().default_plugins.clone());
        let strategies = environment.strategies().clone();
        Self::assemble(
            design,
            environment,
            RunState {
                name: String::new(),
                status: SimulationStatus::NotSimulated,
                strategies,
                result: None,
            },
            options,
            plugin_ids,
        )
    }

    /// Rebuild a run from storage.
    ///
    /// A persisted `UpToDate` becomes `Loaded` and its result is tied to the
    /// current options and design revision. Without flight data the run is
    /// `NotSimulated`. `Outdated` and `External` runs keep their data but get
    /// no provenance.
    pub fn from_persisted(
        design: Arc<dyn Design>,
        environment: SimulationEnvironment,
        persisted: PersistedSimulation,
    ) -> Result<Self> {
        persisted.options.validate()?;
        if let Some(blank) = persisted.plugin_ids.iter().find(|id| id.trim().is_empty()) {
            return Err(RunError::InvalidDefinition(format!(
                "blank plugin identifier {blank:?}"
            )));
        }

        let PersistedSimulation {
            name,
            status,
            options,
            plugin_ids,
            data,
        } = persisted;
        let status = match (status, &data) {
            (_, None) => SimulationStatus::NotSimulated,
            (SimulationStatus::UpToDate, Some(_)) => SimulationStatus::Loaded,
            (other, Some(_)) => other,
        };
        let result = match (status, data) {
            (SimulationStatus::Loaded, Some(data)) => Some(CommittedResult::simulated(
                data,
                Provenance {
                    options: options.clone(),
                    motor_description: None,
                    design_modification: design.functional_modification_id(),
                },
            )),
            (SimulationStatus::NotSimulated, _) => None,
            (_, data) => data.map(CommittedResult::unverified),
        };
        debug!(simulation = %name, status = %status, "simulation restored");

        let strategies = environment.strategies().clone();
        Ok(Self::assemble(
            design,
            environment,
            RunState {
                name,
                status,
                strategies,
                result,
            },
            options,
            PluginIds::new(plugin_ids),
        ))
    }

    fn assemble(
        design: Arc<dyn Design>,
        environment: SimulationEnvironment,
        state: RunState,
        options: SimulationOptions,
        plugin_ids: PluginIds,
    ) -> Self {
        let options = OptionsHandle::new(options);
        let inner = Arc::new_cyclic(|run: &Weak<RunInner>| {
            let monitor = Arc::new(ConditionMonitor::new(run.clone()));
            let monitor_id = options.subscribe(monitor.clone());
            RunInner {
                guard: ConcurrencyGuard::new(),
                design,
                environment,
                options,
                plugin_ids,
                notifier: ChangeNotifier::new(),
                monitor,
                monitor_id,
                state: Mutex::new(state),
                attempts: AtomicU64::new(0),
            }
        });
        Self { inner }
    }

    fn verified(&self) -> &RunInner {
        if let Err(violation) = self.inner.guard.verify() {
            panic!("{violation}");
        }
        &self.inner
    }

    /// Storage form of the run, carrying the status as reported by [`status`](Self::status).
    ///
    /// # Panics
    /// If another thread is inside a write operation on this run.
    pub fn to_persisted(&self) -> PersistedSimulation {
        let inner = self.verified();
        let status = inner.current_status();
        let state = inner.state.lock();
        PersistedSimulation {
            name: state.name.clone(),
            status,
            options: inner.options.snapshot(),
            plugin_ids: inner.plugin_ids.to_vec(),
            data: state
                .result
                .as_ref()
                .map(|result| result.data().as_ref().clone()),
        }
    }

    /// # Panics
    /// If another thread is inside a write operation on this run.
    pub fn name(&self) -> String {
        self.verified().state.lock().name.clone()
    }

    /// Rename the run. Renaming to the current name changes nothing and fires no event.
    pub fn set_name(&self, name: impl Into<String>) -> Result<()> {
        let _write = self.inner.guard.lock(OP_SET_NAME)?;
        let name = name.into();
        {
            let mut state = self.inner.state.lock();
            if state.name == name {
                return Ok(());
            }
            state.name = name;
        }
        self.inner.fire(ChangeSource::Simulation);
        Ok(())
    }

    /// Current status, derived from the committed provenance and the live state.
    ///
    /// # Panics
    /// If another thread is inside a write operation on this run.
    pub fn status(&self) -> SimulationStatus {
        self.verified().current_status()
    }

    /// Live handle to the run's options. Edits through it affect [`status`](Self::status).
    ///
    /// # Panics
    /// If another thread is inside a write operation on this run.
    pub fn options(&self) -> OptionsHandle {
        self.verified().options.clone()
    }

    /// Live handle to the ordered plugin identifiers resolved on each attempt.
    ///
    /// # Panics
    /// If another thread is inside a write operation on this run.
    pub fn plugin_ids(&self) -> PluginIds {
        self.verified().plugin_ids.clone()
    }

    /// # Panics
    /// If another thread is inside a write operation on this run.
    pub fn design(&self) -> Arc<dyn Design> {
        self.verified().design.clone()
    }

    pub fn environment(&self) -> &SimulationEnvironment {
        &self.inner.environment
    }

    /// # Panics
    /// If another thread is inside a write operation on this run.
    pub fn strategies(&self) -> StrategySet {
        self.verified().state.lock().strategies.clone()
    }

    pub fn set_stepper(&self, stepper: Arc<dyn SimulationStepper>) -> Result<()> {
        let _write = self.inner.guard.lock(OP_SET_STEPPER)?;
        self.inner.state.lock().strategies.stepper = stepper;
        Ok(())
    }

    pub fn set_aerodynamic_calculator(&self, aerodynamics: Arc<dyn AerodynamicCalculator>) -> Result<()> {
        let _write = self.inner.guard.lock(OP_SET_AERODYNAMICS)?;
        self.inner.state.lock().strategies.aerodynamics = aerodynamics;
        Ok(())
    }

    pub fn set_mass_calculator(&self, mass: Arc<dyn MassCalculator>) -> Result<()> {
        let _write = self.inner.guard.lock(OP_SET_MASS)?;
        self.inner.state.lock().strategies.mass = mass;
        Ok(())
    }

    /// Motor configuration selected in the live options, described by the design.
    ///
    /// # Panics
    /// If another thread is inside a write operation on this run.
    pub fn motor_configuration(&self) -> MotorConfiguration {
        let inner = self.verified();
        let id = inner.options.with(|options| options.motor_configuration.clone());
        let description = inner.design.motor_configuration_description(id.as_deref());
        MotorConfiguration { id, description }
    }

    /// # Panics
    /// If another thread is inside a write operation on this run.
    pub fn committed_result(&self) -> Option<CommittedResult> {
        self.verified().state.lock().result.clone()
    }

    /// Flight data of the last commit, or imported data for external runs.
    ///
    /// # Panics
    /// If another thread is inside a write operation on this run.
    pub fn simulated_data(&self) -> Option<Arc<FlightData>> {
        self.verified()
            .state
            .lock()
            .result
            .as_ref()
            .map(|result| result.data().clone())
    }

    /// Options frozen at the last commit; `None` unless the run is `UpToDate` or `Loaded` by origin.
    ///
    /// # Panics
    /// If another thread is inside a write operation on this run.
    pub fn simulated_options(&self) -> Option<SimulationOptions> {
        self.verified()
            .state
            .lock()
            .result
            .as_ref()
            .and_then(CommittedResult::provenance)
            .map(|provenance| provenance.options.clone())
    }

    /// # Panics
    /// If another thread is inside a write operation on this run.
    pub fn simulated_motor_description(&self) -> Option<String> {
        self.verified()
            .state
            .lock()
            .result
            .as_ref()
            .and_then(CommittedResult::provenance)
            .and_then(|provenance| provenance.motor_description.clone())
    }

    /// # Panics
    /// If another thread is inside a write operation on this run.
    pub fn simulated_warnings(&self) -> Option<WarningSet> {
        self.verified()
            .state
            .lock()
            .result
            .as_ref()
            .map(|result| result.warnings().clone())
    }

    /// # Panics
    /// If another thread is inside a write operation on this run.
    pub fn subscribe(&self, listener: Arc<dyn StateChangeListener>) -> ListenerId {
        self.verified().notifier.subscribe(listener)
    }

    /// # Panics
    /// If another thread is inside a write operation on this run.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.verified().notifier.unsubscribe(id)
    }

    /// Run one simulation attempt and commit its result.
    ///
    /// `extra_listeners` run before the plugins named in [`plugin_ids`](Self::plugin_ids).
    /// The engine call blocks the current thread. On any error the run is left
    /// exactly as it was.
    pub fn simulate(&self, extra_listeners: Vec<Box<dyn SimulationListener>>) -> Result<()> {
        let _write = self.inner.guard.lock(OP_SIMULATE)?;
        let inner = &self.inner;
        let attempt = inner.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        let (name, stored, strategies) = {
            let state = inner.state.lock();
            (state.name.clone(), state.status, state.strategies.clone())
        };
        let design_name = inner.design.name();
        let ctx = LogContext::new()
            .with_simulation(&name)
            .with_design(&design_name)
            .with_operation(OP_SIMULATE)
            .with_attempt(attempt);

        if stored == SimulationStatus::External {
            log_system_event(
                Some(&ctx),
                "simulation.rejected",
                "imported simulation cannot be simulated",
                SystemEventOutcome::Rejected,
            );
            return Err(RunError::ExternalSimulation);
        }

        let options = inner.options.snapshot();
        if let Err(err) = options.validate() {
            log_system_event(Some(&ctx), "simulation.rejected", &err.to_string(), SystemEventOutcome::Rejected);
            return Err(err.into());
        }

        let mut engine = inner.environment.engine().create().map_err(|err| {
            fsim_error!(context = ctx.clone(), "simulation engine unavailable: {}", err);
            RunError::from(err)
        })?;

        let plugin_ids = inner.plugin_ids.to_vec();
        let plugins = inner.environment.plugins().resolve_all(&plugin_ids)?;

        let design_modification = inner.design.functional_modification_id();
        let motor_description = inner
            .design
            .motor_configuration_description(options.motor_configuration.as_deref());
        let mut conditions = options.to_conditions(inner.design.clone(), strategies);
        conditions.listeners = extra_listeners;
        conditions.listeners.extend(plugins);

        fsim_debug!(
            context = ctx.clone(),
            "invoking {} engine with {} listeners ({})",
            inner.environment.engine().name(),
            conditions.listeners.len(),
            conditions.strategies.describe()
        );
        let started = Instant::now();
        let outcome = engine.simulate(conditions);
        let elapsed = elapsed_ms(started);
        debug!(simulation = %name, attempt, elapsed_ms = elapsed, ok = outcome.is_ok(), "engine returned");

        let data = match outcome {
            Ok(data) => data,
            Err(err) => {
                fsim_error!(context = ctx.clone(), "simulation failed after {} ms: {}", elapsed, err);
                log_system_event(Some(&ctx), "simulation.failed", &err.to_string(), SystemEventOutcome::Fault);
                return Err(err.into());
            }
        };

        let warnings = data.warnings.len();
        let committed = CommittedResult::simulated(
            data,
            Provenance {
                options,
                motor_description: Some(motor_description),
                design_modification,
            },
        );
        {
            let mut state = inner.state.lock();
            state.result = Some(committed);
            state.status = SimulationStatus::UpToDate;
        }
        inner.monitor.observe(inner.current_status());

        fsim_info!(
            context = ctx,
            "simulation committed after {} ms with {} warnings",
            elapsed,
            warnings
        );
        inner.fire(ChangeSource::Simulation);
        Ok(())
    }

    /// Independent copy bound to the same design.
    ///
    /// Name, strategies, options and plugin list are copied. The copy has no
    /// result, no subscribers and starts `NotSimulated`.
    pub fn copy(&self) -> Result<SimulationRun> {
        let _write = self.inner.guard.lock(OP_COPY)?;
        let inner = &self.inner;
        let (name, strategies) = {
            let state = inner.state.lock();
            (state.name.clone(), state.strategies.clone())
        };
        debug!(simulation = %name, "simulation copied");
        Ok(Self::assemble(
            inner.design.clone(),
            inner.environment.clone(),
            RunState {
                name,
                status: SimulationStatus::NotSimulated,
                strategies,
                result: None,
            },
            inner.options.snapshot(),
            inner.plugin_ids.detached(),
        ))
    }

    /// Fresh run of `design` carrying over this run's name, options, plugins,
    /// stepper and aerodynamic calculator.
    ///
    /// The mass calculator is the environment default and nothing simulated
    /// is carried over.
    pub fn duplicate_simulation(&self, design: Arc<dyn Design>) -> Result<SimulationRun> {
        let _write = self.inner.guard.lock(OP_DUPLICATE)?;
        let inner = &self.inner;
        let duplicate = SimulationRun::new(design, inner.environment.clone());
        {
            let source = inner.state.lock();
            let mut target = duplicate.inner.state.lock();
            target.name = source.name.clone();
            target.strategies.stepper = source.strategies.stepper.clone();
            target.strategies.aerodynamics = source.strategies.aerodynamics.clone();
        }
        duplicate.inner.options.copy_from(&inner.options.snapshot());
        duplicate.inner.plugin_ids.replace(inner.plugin_ids.to_vec());
        debug!(
            design = %duplicate.inner.design.name(),
            plugins = duplicate.inner.plugin_ids.len(),
            "simulation duplicated"
        );
        Ok(duplicate)
    }

    /// Whether both handles refer to the same run.
    pub fn same_run(&self, other: &SimulationRun) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for SimulationRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("SimulationRun")
            .field("name", &state.name)
            .field("stored_status", &state.status)
            .field("design", &self.inner.design.name())
            .field("strategies", &state.strategies.describe())
            .field("plugin_ids", &self.inner.plugin_ids.to_vec())
            .field("has_result", &state.result.is_some())
            .finish()
    }
}
