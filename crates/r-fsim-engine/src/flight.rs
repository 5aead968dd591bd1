//! ---
//! fsim_section: "11-simulation"
//! fsim_subsection: "module"
//! fsim_type: "source"
//! fsim_scope: "code"
//! fsim_description: "Engine-side interfaces shared with the run orchestration core."
//! fsim_version: "v0.1.0"
//! fsim_owner: "tbd"
//! ---
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Warnings raised while computing a flight, de-duplicated and sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningSet {
    warnings: BTreeSet<String>,
}

impl WarningSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the warning was not present yet.
    pub fn add(&mut self, warning: impl Into<String>) -> bool {
        self.warnings.insert(warning.into())
    }

    pub fn contains(&self, warning: &str) -> bool {
        self.warnings.contains(warning)
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.warnings.iter().map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightEventKind {
    Launch,
    Ignition,
    LiftOff,
    LaunchRodCleared,
    Burnout,
    StageSeparation,
    Apogee,
    RecoveryDeviceDeployment,
    GroundHit,
    SimulationEnd,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightEvent {
    pub kind: FlightEventKind,
    pub time_s: f64,
}

impl FlightEvent {
    pub fn new(kind: FlightEventKind, time_s: f64) -> Self {
        Self { kind, time_s }
    }
}

/// Summary output of one simulated flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightData {
    pub max_altitude_m: f64,
    pub max_velocity_ms: f64,
    pub max_acceleration_ms2: f64,
    pub max_mach: f64,
    pub time_to_apogee_s: f64,
    pub flight_time_s: f64,
    pub ground_hit_velocity_ms: f64,
    pub launch_rod_velocity_ms: f64,
    #[serde(default)]
    pub events: Vec<FlightEvent>,
    #[serde(default)]
    pub warnings: WarningSet,
    pub completed_at: DateTime<Utc>,
}

impl FlightData {
    /// Flight data with all summary values zeroed, stamped with the current time.
    pub fn empty() -> Self {
        Self {
            max_altitude_m: 0.0,
            max_velocity_ms: 0.0,
            max_acceleration_ms2: 0.0,
            max_mach: 0.0,
            time_to_apogee_s: 0.0,
            flight_time_s: 0.0,
            ground_hit_velocity_ms: 0.0,
            launch_rod_velocity_ms: 0.0,
            events: Vec::new(),
            warnings: WarningSet::new(),
            completed_at: Utc::now(),
        }
    }

    /// Time of the first event of the given kind.
    pub fn event_time(&self, kind: FlightEventKind) -> Option<f64> {
        self.events
            .iter()
            .find(|event| event.kind == kind)
            .map(|event| event.time_s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_set_deduplicates() {
        let mut warnings = WarningSet::new();
        assert!(warnings.add("large angle of attack"));
        assert!(!warnings.add("large angle of attack"));
        assert!(warnings.add("recovery device deployed at high speed"));
        assert_eq!(warnings.len(), 2);
        assert!(warnings.contains("large angle of attack"));
    }

    #[test]
    fn flight_data_deserializes_without_optional_sections() {
        let value = serde_json::json!({
            "max_altitude_m": 312.5,
            "max_velocity_ms": 88.0,
            "max_acceleration_ms2": 140.0,
            "max_mach": 0.26,
            "time_to_apogee_s": 8.1,
            "flight_time_s": 41.0,
            "ground_hit_velocity_ms": 5.2,
            "launch_rod_velocity_ms": 14.3,
            "completed_at": "2024-01-01T00:00:00Z"
        });
        let data: FlightData = serde_json::from_value(value).expect("flight data parses");
        assert!(data.events.is_empty());
        assert!(data.warnings.is_empty());
        assert_eq!(data.event_time(FlightEventKind::Apogee), None);
    }

    #[test]
    fn event_time_returns_first_match() {
        let mut data = FlightData::empty();
        data.events.push(FlightEvent::new(FlightEventKind::Burnout, 1.8));
        data.events.push(FlightEvent::new(FlightEventKind::Apogee, 7.9));
        data.events.push(FlightEvent::new(FlightEventKind::Burnout, 9.0));
        assert_eq!(data.event_time(FlightEventKind::Burnout), Some(1.8));
        assert_eq!(data.event_time(FlightEventKind::Apogee), Some(7.9));
    }
}
