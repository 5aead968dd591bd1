//! ---
//! fsim_section: "01-core-functionality"
//! fsim_subsection: "module"
//! fsim_type: "source"
//! fsim_scope: "code"
//! fsim_description: "Simulation run lifecycle and orchestration."
//! fsim_version: "v0.1.0"
//! fsim_owner: "tbd"
//! ---
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::options::SimulationOptions;
use crate::result::Provenance;

/// Lifecycle state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationStatus {
    /// Simulated, and the design and options still match the committed result.
    UpToDate,
    /// Restored from storage; treated like `UpToDate` when checking staleness.
    Loaded,
    /// The design or the options changed after the last commit.
    Outdated,
    /// Imported flight data that cannot be re-simulated.
    External,
    NotSimulated,
}

impl SimulationStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SimulationStatus::UpToDate => "up_to_date",
            SimulationStatus::Loaded => "loaded",
            SimulationStatus::Outdated => "outdated",
            SimulationStatus::External => "external",
            SimulationStatus::NotSimulated => "not_simulated",
        }
    }

    /// Whether staleness must be checked against a committed provenance.
    pub const fn tracks_provenance(&self) -> bool {
        matches!(self, SimulationStatus::UpToDate | SimulationStatus::Loaded)
    }
}

impl fmt::Display for SimulationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status reported to callers for the given stored state.
///
/// Never cached: runs call this on every query with the live options and the
/// design's current modification counter.
pub fn effective_status(
    stored: SimulationStatus,
    provenance: Option<&Provenance>,
    live_options: &SimulationOptions,
    design_modification: u64,
) -> SimulationStatus {
    if !stored.tracks_provenance() {
        return stored;
    }
    match provenance {
        Some(provenance)
            if provenance.design_modification == design_modification
                && provenance.options == *live_options =>
        {
            stored
        }
        _ => SimulationStatus::Outdated,
    }
}

#[cfg(test)]
mod tests {
    use r_fsim_common::config::SimulationDefaults;
    use r_fsim_testharness::TestDesign;

    use super::*;

    fn options() -> SimulationOptions {
        let defaults = SimulationDefaults {
            random_seed: Some(11),
            ..SimulationDefaults::default()
        };
        SimulationOptions::for_design(&TestDesign::new("Status"), &defaults)
    }

    fn provenance(options: &SimulationOptions, modification: u64) -> Provenance {
        Provenance {
            options: options.clone(),
            motor_description: Some("[C6-5]".into()),
            design_modification: modification,
        }
    }

    #[test]
    fn matching_provenance_keeps_stored_status() {
        let live = options();
        let frozen = provenance(&live, 3);
        for stored in [SimulationStatus::UpToDate, SimulationStatus::Loaded] {
            assert_eq!(effective_status(stored, Some(&frozen), &live, 3), stored);
        }
    }

    #[test]
    fn design_edit_marks_outdated() {
        let live = options();
        let frozen = provenance(&live, 3);
        assert_eq!(
            effective_status(SimulationStatus::Loaded, Some(&frozen), &live, 4),
            SimulationStatus::Outdated
        );
    }

    #[test]
    fn option_edit_marks_outdated() {
        let mut live = options();
        let frozen = provenance(&live, 3);
        live.launch.wind_speed_average_ms += 1.0;
        assert_eq!(
            effective_status(SimulationStatus::UpToDate, Some(&frozen), &live, 3),
            SimulationStatus::Outdated
        );
    }

    #[test]
    fn missing_provenance_is_outdated() {
        assert_eq!(
            effective_status(SimulationStatus::UpToDate, None, &options(), 1),
            SimulationStatus::Outdated
        );
    }

    #[test]
    fn untracked_statuses_pass_through() {
        let live = options();
        for stored in [
            SimulationStatus::NotSimulated,
            SimulationStatus::External,
            SimulationStatus::Outdated,
        ] {
            assert_eq!(effective_status(stored, None, &live, 9), stored);
        }
    }

    #[test]
    fn serialises_as_snake_case() {
        let encoded = serde_json::to_string(&SimulationStatus::NotSimulated).expect("encode");
        assert_eq!(encoded, "\"not_simulated\"");
        let decoded: SimulationStatus = serde_json::from_str("\"up_to_date\"").expect("decode");
        assert_eq!(decoded, SimulationStatus::UpToDate);
        assert_eq!(SimulationStatus::Loaded.to_string(), "loaded");
    }
}
