//! ---
//! fsim_section: "11-simulation"
//! fsim_subsection: "module"
//! fsim_type: "source"
//! fsim_scope: "code"
//! fsim_description: "Engine-side interfaces shared with the run orchestration core."
//! fsim_version: "v0.1.0"
//! fsim_owner: "tbd"
//! ---
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::design::Design;
use crate::listener::SimulationListener;
use crate::strategy::StrategySet;

/// Launch site and atmosphere parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchConditions {
    pub rod_length_m: f64,
    /// Angle from vertical, radians.
    pub rod_angle_rad: f64,
    /// Azimuth of the rod, radians.
    pub rod_direction_rad: f64,
    pub wind_speed_average_ms: f64,
    pub wind_turbulence_intensity: f64,
    pub launch_altitude_m: f64,
    pub launch_latitude_deg: f64,
    /// Use the international standard atmosphere instead of the explicit values below.
    pub use_isa: bool,
    pub launch_temperature_k: f64,
    pub launch_pressure_pa: f64,
}

impl Default for LaunchConditions {
    fn default() -> Self {
        Self {
            rod_length_m: 1.0,
            rod_angle_rad: 0.0,
            rod_direction_rad: PI / 2.0,
            wind_speed_average_ms: 2.0,
            wind_turbulence_intensity: 0.1,
            launch_altitude_m: 0.0,
            launch_latitude_deg: 45.0,
            use_isa: true,
            launch_temperature_k: 288.15,
            launch_pressure_pa: 101_325.0,
        }
    }
}

/// Numerical integration settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationSettings {
    pub time_step_s: f64,
    pub max_angle_step_rad: f64,
    /// Compute the optional derived quantities (extra flight data columns).
    pub calculate_extra: bool,
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        Self {
            time_step_s: 0.01,
            max_angle_step_rad: 3.0 * PI / 180.0,
            calculate_extra: true,
        }
    }
}

/// Everything an engine needs for one attempt.
pub struct SimulationConditions {
    pub design: Arc<dyn Design>,
    pub motor_configuration: Option<String>,
    pub launch: LaunchConditions,
    pub integration: IntegrationSettings,
    pub random_seed: u64,
    pub strategies: StrategySet,
    /// Listeners in execution order.
    pub listeners: Vec<Box<dyn SimulationListener>>,
}

impl SimulationConditions {
    /// Names of the attached listeners, in execution order.
    pub fn listener_names(&self) -> Vec<String> {
        self.listeners
            .iter()
            .map(|listener| listener.name().to_owned())
            .collect()
    }

    /// Detach the listeners so they can be driven while the conditions are borrowed.
    pub fn take_listeners(&mut self) -> Vec<Box<dyn SimulationListener>> {
        std::mem::take(&mut self.listeners)
    }
}

impl fmt::Debug for SimulationConditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationConditions")
            .field("design", &self.design.name())
            .field("motor_configuration", &self.motor_configuration)
            .field("launch", &self.launch)
            .field("integration", &self.integration)
            .field("random_seed", &self.random_seed)
            .field("strategies", &self.strategies.describe())
            .field("listeners", &self.listener_names())
            .finish()
    }
}
