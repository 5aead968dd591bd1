//! ---
//! fsim_section: "01-core-functionality"
//! fsim_subsection: "module"
//! fsim_type: "source"
//! fsim_scope: "code"
//! fsim_description: "Shared primitives and utilities for the core runtime."
//! fsim_version: "v0.1.0"
//! fsim_owner: "tbd"
//! ---
//! Accepted ranges for launch and integration parameters.
//!
//! Both configured defaults and per-run options are checked here, in the
//! units used by the configuration file.

use std::ops::RangeInclusive;

use thiserror::Error;

pub const MAX_ROD_ANGLE_DEG: f64 = 60.0;
pub const LATITUDE_RANGE_DEG: RangeInclusive<f64> = -90.0..=90.0;

// Radian round trips of a limit value land a few ulps off.
const ANGLE_TOLERANCE_DEG: f64 = 1e-9;

/// Parameter outside its accepted range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LimitViolation {
    #[error("launch rod length must be non-negative, got {0} m")]
    RodLength(f64),
    #[error("launch rod angle must be within ±60°, got {0:.1}°")]
    RodAngle(f64),
    #[error("wind speed and turbulence intensity must be non-negative")]
    Wind,
    #[error("launch latitude must be within [-90, 90], got {0}")]
    Latitude(f64),
    #[error("launch temperature and pressure must be positive")]
    Atmosphere,
    #[error("time step must be positive, got {0} s")]
    TimeStep(f64),
    #[error("maximum angle step must be positive, got {0}°")]
    MaxAngleStep(f64),
}

impl LimitViolation {
    /// Configuration key of the offending parameter.
    pub fn setting(&self) -> &'static str {
        match self {
            LimitViolation::RodLength(_) => "launch_rod_length_m",
            LimitViolation::RodAngle(_) => "launch_rod_angle_deg",
            LimitViolation::Wind => "wind_speed_average_ms",
            LimitViolation::Latitude(_) => "launch_latitude_deg",
            LimitViolation::Atmosphere => "launch_temperature_k",
            LimitViolation::TimeStep(_) => "time_step",
            LimitViolation::MaxAngleStep(_) => "max_angle_step_deg",
        }
    }
}

/// Parameters subject to range checks, in configuration units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchParameters {
    pub rod_length_m: f64,
    pub rod_angle_deg: f64,
    pub wind_speed_average_ms: f64,
    pub wind_turbulence_intensity: f64,
    pub latitude_deg: f64,
    pub temperature_k: f64,
    pub pressure_pa: f64,
    pub time_step_s: f64,
    pub max_angle_step_deg: f64,
}

impl LaunchParameters {
    /// First violated range, in declaration order. NaN fails every check.
    pub fn check(&self) -> Result<(), LimitViolation> {
        if !(self.rod_length_m >= 0.0) {
            return Err(LimitViolation::RodLength(self.rod_length_m));
        }
        if !(self.rod_angle_deg.abs() <= MAX_ROD_ANGLE_DEG + ANGLE_TOLERANCE_DEG) {
            return Err(LimitViolation::RodAngle(self.rod_angle_deg));
        }
        if !(self.wind_speed_average_ms >= 0.0) || !(self.wind_turbulence_intensity >= 0.0) {
            return Err(LimitViolation::Wind);
        }
        if !LATITUDE_RANGE_DEG.contains(&self.latitude_deg) {
            return Err(LimitViolation::Latitude(self.latitude_deg));
        }
        if !(self.temperature_k > 0.0) || !(self.pressure_pa > 0.0) {
            return Err(LimitViolation::Atmosphere);
        }
        if !(self.time_step_s > 0.0) {
            return Err(LimitViolation::TimeStep(self.time_step_s));
        }
        if !(self.max_angle_step_deg > 0.0) {
            return Err(LimitViolation::MaxAngleStep(self.max_angle_step_deg));
        }
        Ok(())
    }
}
