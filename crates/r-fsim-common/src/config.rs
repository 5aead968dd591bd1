//! ---
//! fsim_section: "01-core-functionality"
//! fsim_subsection: "module"
//! fsim_type: "source"
//! fsim_scope: "code"
//! fsim_description: "Shared primitives and utilities for the core runtime."
//! fsim_version: "v0.1.0"
//! fsim_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use tracing::debug;

use crate::limits::LaunchParameters;
use crate::logging::LogFormat;

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::StructuredJson
}

fn default_rod_length() -> f64 {
    1.0
}

fn default_rod_direction() -> f64 {
    90.0
}

fn default_wind_speed() -> f64 {
    2.0
}

fn default_wind_turbulence() -> f64 {
    0.1
}

fn default_latitude() -> f64 {
    45.0
}

fn default_use_isa() -> bool {
    true
}

fn default_temperature() -> f64 {
    288.15
}

fn default_pressure() -> f64 {
    101_325.0
}

fn default_time_step() -> Duration {
    Duration::from_millis(10)
}

fn default_max_angle_step() -> f64 {
    3.0
}

fn default_calculate_extra() -> bool {
    true
}

/// Primary configuration object for the R-FSIM runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub simulation: SimulationDefaults,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: PathBuf,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &str = "R_FSIM_CONFIG";

    /// Load configuration from disk, respecting the `R_FSIM_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
        }
    }
}

/// Launch and integration defaults applied to freshly created runs.
///
/// Angles are configured in degrees; the run core converts them to radians.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationDefaults {
    #[serde(default = "default_rod_length")]
    pub launch_rod_length_m: f64,
    #[serde(default)]
    pub launch_rod_angle_deg: f64,
    #[serde(default = "default_rod_direction")]
    pub launch_rod_direction_deg: f64,
    #[serde(default = "default_wind_speed")]
    pub wind_speed_average_ms: f64,
    #[serde(default = "default_wind_turbulence")]
    pub wind_turbulence_intensity: f64,
    #[serde(default)]
    pub launch_altitude_m: f64,
    #[serde(default = "default_latitude")]
    pub launch_latitude_deg: f64,
    #[serde(default = "default_use_isa")]
    pub use_isa: bool,
    #[serde(default = "default_temperature")]
    pub launch_temperature_k: f64,
    #[serde(default = "default_pressure")]
    pub launch_pressure_pa: f64,
    #[serde(default = "default_time_step")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub time_step: Duration,
    #[serde(default = "default_max_angle_step")]
    pub max_angle_step_deg: f64,
    #[serde(default = "default_calculate_extra")]
    pub calculate_extra: bool,
    /// Fixed seed for every new run. A random seed is drawn per run when unset.
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Plugin identifiers appended to the plugin list of every new run.
    #[serde(default)]
    pub default_plugins: Vec<String>,
}

impl Default for SimulationDefaults {
    fn default() -> Self {
        Self {
            launch_rod_length_m: default_rod_length(),
            launch_rod_angle_deg: 0.0,
            launch_rod_direction_deg: default_rod_direction(),
            wind_speed_average_ms: default_wind_speed(),
            wind_turbulence_intensity: default_wind_turbulence(),
            launch_altitude_m: 0.0,
            launch_latitude_deg: default_latitude(),
            use_isa: default_use_isa(),
            launch_temperature_k: default_temperature(),
            launch_pressure_pa: default_pressure(),
            time_step: default_time_step(),
            max_angle_step_deg: default_max_angle_step(),
            calculate_extra: default_calculate_extra(),
            random_seed: None,
            default_plugins: Vec::new(),
        }
    }
}

impl SimulationDefaults {
    /// Range-checked parameters, in configuration units.
    pub fn launch_parameters(&self) -> LaunchParameters {
        LaunchParameters {
            rod_length_m: self.launch_rod_length_m,
            rod_angle_deg: self.launch_rod_angle_deg,
            wind_speed_average_ms: self.wind_speed_average_ms,
            wind_turbulence_intensity: self.wind_turbulence_intensity,
            latitude_deg: self.launch_latitude_deg,
            temperature_k: self.launch_temperature_k,
            pressure_pa: self.launch_pressure_pa,
            time_step_s: self.time_step.as_secs_f64(),
            max_angle_step_deg: self.max_angle_step_deg,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.launch_parameters()
            .check()
            .map_err(|err| anyhow!("{}: {}", err.setting(), err))?;
        if let Some(blank) = self.default_plugins.iter().find(|id| id.trim().is_empty()) {
            return Err(anyhow!("default_plugins contains a blank identifier {:?}", blank));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: AppConfig = "".parse().expect("empty config parses");
        assert_eq!(config.simulation.time_step, Duration::from_millis(10));
        assert_eq!(config.simulation.launch_rod_direction_deg, 90.0);
        assert!(config.simulation.random_seed.is_none());
        assert!(config.simulation.default_plugins.is_empty());
        assert_eq!(config.logging.format, LogFormat::StructuredJson);
    }

    #[test]
    fn simulation_section_overrides_defaults() {
        let config: AppConfig = r#"
            [logging]
            format = "pretty"

            [simulation]
            launch_rod_length_m = 1.5
            launch_rod_angle_deg = 5.0
            time_step = 25
            random_seed = 42
            default_plugins = ["telemetry.csv", "apogee.alert"]
        "#
        .parse()
        .expect("config parses");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.simulation.launch_rod_length_m, 1.5);
        assert_eq!(config.simulation.time_step, Duration::from_millis(25));
        assert_eq!(config.simulation.random_seed, Some(42));
        assert_eq!(
            config.simulation.default_plugins,
            vec!["telemetry.csv".to_owned(), "apogee.alert".to_owned()]
        );
    }

    #[test]
    fn steep_launch_rod_is_rejected() {
        let err = "[simulation]\nlaunch_rod_angle_deg = 75.0"
            .parse::<AppConfig>()
            .expect_err("rod angle beyond limit");
        assert!(err.to_string().contains("launch_rod_angle_deg"));
    }

    #[test]
    fn zero_time_step_is_rejected() {
        let err = "[simulation]\ntime_step = 0"
            .parse::<AppConfig>()
            .expect_err("zero time step");
        assert!(err.to_string().contains("time_step"));
    }

    #[test]
    fn blank_default_plugin_is_rejected() {
        let err = "[simulation]\ndefault_plugins = [\"ok\", \" \"]"
            .parse::<AppConfig>()
            .expect_err("blank plugin id");
        assert!(err.to_string().contains("default_plugins"));
    }
}
