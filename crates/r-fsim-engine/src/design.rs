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

/// Shared, externally owned description of the vehicle being simulated.
///
/// Runs hold an `Arc<dyn Design>` and never mutate it. Editing tools bump the
/// functional modification counter whenever a change would alter flight
/// behaviour; runs compare that counter against the value captured when their
/// result was committed.
pub trait Design: Send + Sync + fmt::Debug {
    /// Human readable design name.
    fn name(&self) -> String;

    /// Monotonically increasing counter of flight-relevant modifications.
    fn functional_modification_id(&self) -> u64;

    /// Motor configuration selected by default for new runs.
    fn default_motor_configuration(&self) -> Option<String>;

    /// Describe a motor configuration, e.g. `"[C6-5; D12-3]"`.
    ///
    /// `None` describes the design without motors.
    fn motor_configuration_description(&self, configuration: Option<&str>) -> String;
}
