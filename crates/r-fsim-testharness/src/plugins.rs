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

use parking_lot::Mutex;
use r_fsim_engine::{FlightData, SimulationConditions, SimulationError, SimulationListener};

/// Shared journal of listener callbacks, in call order.
#[derive(Debug, Clone, Default)]
pub struct ListenerLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl ListenerLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Simulation listener writing `start:<name>` / `end:<name>` into a [`ListenerLog`].
#[derive(Debug)]
pub struct CountingListener {
    name: String,
    log: ListenerLog,
    fail_on_start: bool,
}

impl CountingListener {
    pub fn new(name: impl Into<String>, log: ListenerLog) -> Self {
        Self {
            name: name.into(),
            log,
            fail_on_start: false,
        }
    }

    /// Listener that rejects the attempt from `start_simulation`.
    pub fn failing(name: impl Into<String>, log: ListenerLog) -> Self {
        Self {
            fail_on_start: true,
            ..Self::new(name, log)
        }
    }

    pub fn boxed(self) -> Box<dyn SimulationListener> {
        Box::new(self)
    }
}

impl SimulationListener for CountingListener {
    fn name(&self) -> &str {
        &self.name
    }

    fn start_simulation(&mut self, _conditions: &SimulationConditions) -> Result<(), SimulationError> {
        self.log.push(format!("start:{}", self.name));
        if self.fail_on_start {
            return Err(SimulationError::Listener {
                listener: self.name.clone(),
                reason: "rejected start".into(),
            });
        }
        Ok(())
    }

    fn end_simulation(&mut self, _outcome: Result<&FlightData, &SimulationError>) {
        self.log.push(format!("end:{}", self.name));
    }
}
