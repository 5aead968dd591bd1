//! ---
//! fsim_section: "03-logging"
//! fsim_subsection: "module"
//! fsim_type: "source"
//! fsim_scope: "code"
//! fsim_description: "Structured logging adapters and sinks."
//! fsim_version: "v0.1.0"
//! fsim_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Structured logging helpers shared by the R-FSIM crates.
//!
//! Subscribers are installed by `r_fsim_common::logging::init_tracing`; this
//! crate only shapes the events.

use tracing::Level;

pub mod macros;

/// Structured logging context propagated by the convenience macros.
#[derive(Debug, Default, Clone)]
pub struct LogContext<'a> {
    /// Display name of the simulation run.
    pub simulation: Option<&'a str>,
    /// Name of the design the run is bound to.
    pub design: Option<&'a str>,
    /// Operation tag, matching the concurrency guard tag where applicable.
    pub operation: Option<&'a str>,
    /// Sequence number of the simulation attempt on this run.
    pub attempt: Option<u64>,
}

impl<'a> LogContext<'a> {
    /// Create an empty logging context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a simulation name.
    pub fn with_simulation(mut self, simulation: &'a str) -> Self {
        self.simulation = Some(simulation);
        self
    }

    /// Attach a design name.
    pub fn with_design(mut self, design: &'a str) -> Self {
        self.design = Some(design);
        self
    }

    /// Attach an operation tag.
    pub fn with_operation(mut self, operation: &'a str) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Attach an attempt number.
    pub fn with_attempt(mut self, attempt: u64) -> Self {
        self.attempt = Some(attempt);
        self
    }
}

/// High-level outcome used when emitting lifecycle log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEventOutcome {
    /// The operation completed successfully.
    Success,
    /// The operation was rejected before any side effect.
    Rejected,
    /// The operation failed or was aborted.
    Fault,
}

impl SystemEventOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            SystemEventOutcome::Success => "success",
            SystemEventOutcome::Rejected => "rejected",
            SystemEventOutcome::Fault => "fault",
        }
    }
}

/// Emit a standardized lifecycle event with an outcome.
pub fn log_system_event(
    context: Option<&LogContext>,
    event: &str,
    message: &str,
    outcome: SystemEventOutcome,
) {
    let default_ctx = LogContext::default();
    let ctx = context.unwrap_or(&default_ctx);
    // `tracing::event!` needs a constant level, hence one arm per outcome.
    macro_rules! emit {
        ($level:expr) => {
            tracing::event!(
                $level,
                event,
                outcome = outcome.as_str(),
                simulation = ctx.simulation.unwrap_or(""),
                design = ctx.design.unwrap_or(""),
                operation = ctx.operation.unwrap_or(""),
                attempt = ctx.attempt.unwrap_or_default(),
                message = %message
            )
        };
    }
    match outcome {
        SystemEventOutcome::Success => emit!(Level::INFO),
        SystemEventOutcome::Rejected => emit!(Level::WARN),
        SystemEventOutcome::Fault => emit!(Level::ERROR),
    }
}
