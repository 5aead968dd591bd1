//! ---
//! fsim_section: "15-testing"
//! fsim_subsection: "module"
//! fsim_type: "source"
//! fsim_scope: "code"
//! fsim_description: "Test harness fixtures and shared exports."
//! fsim_version: "v0.1.0"
//! fsim_owner: "tbd"
//! ---
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use r_fsim_engine::{
    EngineBuildError, EngineFactory, FlightData, FlightEvent, FlightEventKind,
    SimulationConditions, SimulationEngine, SimulationError,
};
use tracing::debug;

/// Callback run inside `simulate` before the scripted outcome is produced.
pub type EngineHook = Arc<dyn Fn(&SimulationConditions) + Send + Sync>;

/// What the engine observed for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineCall {
    pub listener_names: Vec<String>,
    pub motor_configuration: Option<String>,
    pub random_seed: u64,
    pub time_step_s: f64,
    pub strategies: String,
    pub design_modification: u64,
}

#[derive(Default)]
struct EngineState {
    created: AtomicUsize,
    calls: Mutex<Vec<EngineCall>>,
    outcomes: Mutex<VecDeque<Result<FlightData, SimulationError>>>,
    hook: Mutex<Option<EngineHook>>,
    build_failure: Mutex<Option<EngineBuildError>>,
}

/// Engine factory returning scripted outcomes and recording every call.
///
/// When the script is exhausted every call succeeds with [`sample_flight`].
#[derive(Clone, Default)]
pub struct ScriptedEngineFactory {
    state: Arc<EngineState>,
}

impl ScriptedEngineFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory whose `create` always fails.
    pub fn unbuildable(reason: &str) -> Self {
        let factory = Self::new();
        *factory.state.build_failure.lock() = Some(EngineBuildError::new("scripted", reason));
        factory
    }

    pub fn push_outcome(&self, outcome: Result<FlightData, SimulationError>) -> &Self {
        self.state.outcomes.lock().push_back(outcome);
        self
    }

    pub fn fail_next(&self, error: SimulationError) -> &Self {
        self.push_outcome(Err(error))
    }

    pub fn set_hook(&self, hook: EngineHook) {
        *self.state.hook.lock() = Some(hook);
    }

    /// Number of engines created so far.
    pub fn engines_created(&self) -> usize {
        self.state.created.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.state.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.calls.lock().len()
    }
}

impl fmt::Debug for ScriptedEngineFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedEngineFactory")
            .field("engines_created", &self.engines_created())
            .field("calls", &self.call_count())
            .finish()
    }
}

impl EngineFactory for ScriptedEngineFactory {
    fn name(&self) -> &str {
        "scripted"
    }

    fn create(&self) -> Result<Box<dyn SimulationEngine>, EngineBuildError> {
        if let Some(err) = self.state.build_failure.lock().clone() {
            return Err(err);
        }
        self.state.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedEngine {
            state: self.state.clone(),
        }))
    }
}

struct ScriptedEngine {
    state: Arc<EngineState>,
}

impl SimulationEngine for ScriptedEngine {
    fn simulate(&mut self, mut conditions: SimulationConditions) -> Result<FlightData, SimulationError> {
        let call = EngineCall {
            listener_names: conditions.listener_names(),
            motor_configuration: conditions.motor_configuration.clone(),
            random_seed: conditions.random_seed,
            time_step_s: conditions.integration.time_step_s,
            strategies: conditions.strategies.describe(),
            design_modification: conditions.design.functional_modification_id(),
        };
        debug!(listeners = call.listener_names.len(), "scripted engine invoked");
        self.state.calls.lock().push(call);

        let hook = self.state.hook.lock().clone();
        if let Some(hook) = hook {
            hook(&conditions);
        }

        let mut listeners = conditions.take_listeners();
        let started = listeners
            .iter_mut()
            .try_for_each(|listener| listener.start_simulation(&conditions));
        if let Err(err) = started {
            for listener in listeners.iter_mut() {
                listener.end_simulation(Err(&err));
            }
            return Err(err);
        }

        let outcome = self
            .state
            .outcomes
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(sample_flight()));
        for listener in listeners.iter_mut() {
            listener.end_simulation(outcome.as_ref());
        }
        outcome
    }
}

/// Plausible flight of a small single-stage model rocket.
pub fn sample_flight() -> FlightData {
    let mut data = FlightData::empty();
    data.max_altitude_m = 312.4;
    data.max_velocity_ms = 86.9;
    data.max_acceleration_ms2 = 141.2;
    data.max_mach = 0.26;
    data.time_to_apogee_s = 8.2;
    data.flight_time_s = 41.7;
    data.ground_hit_velocity_ms = 5.1;
    data.launch_rod_velocity_ms = 14.8;
    data.events = vec![
        FlightEvent::new(FlightEventKind::Launch, 0.0),
        FlightEvent::new(FlightEventKind::LiftOff, 0.05),
        FlightEvent::new(FlightEventKind::LaunchRodCleared, 0.21),
        FlightEvent::new(FlightEventKind::Burnout, 1.86),
        FlightEvent::new(FlightEventKind::Apogee, 8.2),
        FlightEvent::new(FlightEventKind::RecoveryDeviceDeployment, 8.3),
        FlightEvent::new(FlightEventKind::GroundHit, 41.7),
        FlightEvent::new(FlightEventKind::SimulationEnd, 41.7),
    ];
    data.warnings.add("recovery device deployed while in motion");
    data
}
