//! ---
//! fsim_section: "01-core-functionality"
//! fsim_subsection: "module"
//! fsim_type: "source"
//! fsim_scope: "code"
//! fsim_description: "Shared primitives and utilities for the core runtime."
//! fsim_version: "v0.1.0"
//! fsim_owner: "tbd"
//! ---
use anyhow::{anyhow, Context, Result};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

const LOG_ENV: &str = "R_FSIM_LOG";
const FALLBACK_ENV: &str = "RUST_LOG";

/// Used when neither environment variable is set. Other crates stay at `warn`.
pub const DEFAULT_DIRECTIVES: &str =
    "warn,r_fsim_core=debug,r_fsim_engine=info,r_fsim_common=info,r_fsim_logging=info";

// Dropping a guard stops its writer thread, so both live for the process.
struct WriterGuards {
    _file: WorkerGuard,
    _stdout: WorkerGuard,
}

static WRITER_GUARDS: OnceCell<WriterGuards> = OnceCell::new();

/// Available log formats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    #[default]
    StructuredJson,
    Pretty,
}

/// Install the process-wide subscriber for an R-FSIM service.
///
/// The filter comes from `R_FSIM_LOG`, then `RUST_LOG`, then
/// [`DEFAULT_DIRECTIVES`]. An unparsable directive is an error. Stdout follows
/// [`LogFormat`]; `<prefix>-<service>.log` in the configured directory always
/// receives JSON and rolls daily.
///
/// Fails if a global subscriber is already installed, including by an earlier
/// call.
pub fn init_tracing(service_name: &str, config: &LoggingConfig) -> Result<()> {
    let filter = filter_from(env_directive())?;

    std::fs::create_dir_all(&config.directory).with_context(|| {
        format!(
            "failed to create log directory {}",
            config.directory.display()
        )
    })?;
    let prefix = config.file_prefix.as_deref().unwrap_or(service_name);
    let (file_writer, file_guard) = tracing_appender::non_blocking(rolling::daily(
        &config.directory,
        format!("{prefix}-{service_name}.log"),
    ));
    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());

    let stdout_layer = match config.format {
        LogFormat::Pretty => fmt::layer()
            .with_timer(UtcTime::rfc_3339())
            .with_writer(stdout_writer)
            .boxed(),
        LogFormat::StructuredJson => fmt::layer()
            .json()
            .with_timer(UtcTime::rfc_3339())
            .with_target(false)
            .with_writer(stdout_writer)
            .boxed(),
    };
    let file_layer = fmt::layer()
        .json()
        .with_timer(UtcTime::rfc_3339())
        .with_writer(file_writer)
        .boxed();

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("tracing subscriber already installed")?;

    WRITER_GUARDS
        .set(WriterGuards {
            _file: file_guard,
            _stdout: stdout_guard,
        })
        .map_err(|_| anyhow!("log writer guards already held"))?;

    info!(
        service = %service_name,
        log_dir = %config.directory.display(),
        format = ?config.format,
        "tracing initialised"
    );
    Ok(())
}

fn env_directive() -> Option<(&'static str, String)> {
    [LOG_ENV, FALLBACK_ENV]
        .into_iter()
        .find_map(|var| std::env::var(var).ok().map(|value| (var, value)))
}

fn filter_from(directive: Option<(&'static str, String)>) -> Result<EnvFilter> {
    match directive {
        Some((var, value)) => EnvFilter::try_new(&value)
            .with_context(|| format!("invalid {var} directive `{value}`")),
        None => Ok(EnvFilter::new(DEFAULT_DIRECTIVES)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_targets_workspace_crates() {
        let filter = filter_from(None).expect("default directives parse");
        let rendered = filter.to_string();
        assert!(rendered.contains("r_fsim_core=debug"), "{rendered}");
        assert!(rendered.contains("warn"), "{rendered}");
    }

    #[test]
    fn invalid_directive_names_its_variable() {
        let err = filter_from(Some((LOG_ENV, "r_fsim_core=loud".to_owned())))
            .expect_err("unknown level");
        assert!(format!("{err:#}").contains("R_FSIM_LOG"), "{err:#}");
    }

    #[test]
    fn explicit_directive_is_used() {
        let filter = filter_from(Some((FALLBACK_ENV, "r_fsim_engine=trace".to_owned())))
            .expect("valid directive");
        assert!(filter.to_string().contains("r_fsim_engine=trace"));
    }
}
