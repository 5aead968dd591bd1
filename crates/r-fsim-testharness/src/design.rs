//! ---
//! fsim_section: "15-testing"
//! fsim_subsection: "module"
//! fsim_type: "source"
//! fsim_scope: "code"
//! fsim_description: "Test harness fixtures and shared exports."
//! fsim_version: "v0.1.0"
//! fsim_owner: "tbd"
//! ---
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use r_fsim_engine::Design;

/// In-memory design whose modification counter can be bumped by tests.
#[derive(Debug)]
pub struct TestDesign {
    name: String,
    modification: AtomicU64,
    default_motor: Mutex<Option<String>>,
}

impl TestDesign {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modification: AtomicU64::new(1),
            default_motor: Mutex::new(Some("C6-5".to_owned())),
        }
    }

    pub fn shared(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(name))
    }

    /// Simulate an external edit of the design.
    pub fn touch(&self) -> u64 {
        self.modification.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn set_default_motor(&self, motor: Option<&str>) {
        *self.default_motor.lock() = motor.map(str::to_owned);
    }
}

impl Design for TestDesign {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn functional_modification_id(&self) -> u64 {
        self.modification.load(Ordering::SeqCst)
    }

    fn default_motor_configuration(&self) -> Option<String> {
        self.default_motor.lock().clone()
    }

    fn motor_configuration_description(&self, configuration: Option<&str>) -> String {
        match configuration {
            Some(id) => format!("[{id}]"),
            None => "[No motors]".to_owned(),
        }
    }
}
