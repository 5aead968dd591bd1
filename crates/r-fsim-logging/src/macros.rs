//! ---
//! fsim_section: "03-logging"
//! fsim_subsection: "module"
//! fsim_type: "source"
//! fsim_scope: "code"
//! fsim_description: "Structured logging adapters and sinks."
//! fsim_version: "v0.1.0"
//! fsim_owner: "tbd"
//! ---
/// Emit an informational log enriched with simulation run context.
#[macro_export]
macro_rules! fsim_info {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::INFO,
            simulation = ctx.simulation.unwrap_or(""),
            design = ctx.design.unwrap_or(""),
            operation = ctx.operation.unwrap_or(""),
            attempt = ctx.attempt.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        let ctx = &$crate::LogContext::default();
        tracing::event!(
            tracing::Level::INFO,
            simulation = ctx.simulation.unwrap_or(""),
            design = ctx.design.unwrap_or(""),
            operation = ctx.operation.unwrap_or(""),
            attempt = ctx.attempt.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
}

/// Emit a debug log enriched with simulation run context.
#[macro_export]
macro_rules! fsim_debug {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::DEBUG,
            simulation = ctx.simulation.unwrap_or(""),
            design = ctx.design.unwrap_or(""),
            operation = ctx.operation.unwrap_or(""),
            attempt = ctx.attempt.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        let ctx = &$crate::LogContext::default();
        tracing::event!(
            tracing::Level::DEBUG,
            simulation = ctx.simulation.unwrap_or(""),
            design = ctx.design.unwrap_or(""),
            operation = ctx.operation.unwrap_or(""),
            attempt = ctx.attempt.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
}

/// Emit a warning log enriched with simulation run context.
#[macro_export]
macro_rules! fsim_warn {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::WARN,
            simulation = ctx.simulation.unwrap_or(""),
            design = ctx.design.unwrap_or(""),
            operation = ctx.operation.unwrap_or(""),
            attempt = ctx.attempt.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        let ctx = &$crate::LogContext::default();
        tracing::event!(
            tracing::Level::WARN,
            simulation = ctx.simulation.unwrap_or(""),
            design = ctx.design.unwrap_or(""),
            operation = ctx.operation.unwrap_or(""),
            attempt = ctx.attempt.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
}

/// Emit an error log enriched with simulation run context.
#[macro_export]
macro_rules! fsim_error {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::ERROR,
            simulation = ctx.simulation.unwrap_or(""),
            design = ctx.design.unwrap_or(""),
            operation = ctx.operation.unwrap_or(""),
            attempt = ctx.attempt.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        let ctx = &$crate::LogContext::default();
        tracing::event!(
            tracing::Level::ERROR,
            simulation = ctx.simulation.unwrap_or(""),
            design = ctx.design.unwrap_or(""),
            operation = ctx.operation.unwrap_or(""),
            attempt = ctx.attempt.unwrap_or_default(),
            message = %format_args!($($arg)+)
        );
    }};
}
