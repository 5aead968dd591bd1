//! ---
//! fsim_section: "01-core-functionality"
//! fsim_subsection: "module"
//! fsim_type: "source"
//! fsim_scope: "code"
//! fsim_description: "Simulation run lifecycle and orchestration."
//! fsim_version: "v0.1.0"
//! fsim_owner: "tbd"
//! ---
use std::sync::Arc;

use r_fsim_engine::{FlightData, WarningSet};

use crate::options::SimulationOptions;

/// Inputs frozen at the moment a result was committed.
#[derive(Debug, Clone, PartialEq)]
pub struct Provenance {
    pub options: SimulationOptions,
    pub motor_description: Option<String>,
    pub design_modification: u64,
}

/// Flight data together with the inputs that produced it.
///
/// Replaced as a whole; a run never holds half of a commit.
#[derive(Debug, Clone)]
pub struct CommittedResult {
    data: Arc<FlightData>,
    provenance: Option<Arc<Provenance>>,
}

impl CommittedResult {
    pub fn simulated(data: FlightData, provenance: Provenance) -> Self {
        Self {
            data: Arc::new(data),
            provenance: Some(Arc::new(provenance)),
        }
    }

    /// Imported or restored data without a known provenance.
    pub fn unverified(data: FlightData) -> Self {
        Self {
            data: Arc::new(data),
            provenance: None,
        }
    }

    pub fn data(&self) -> &Arc<FlightData> {
        &self.data
    }

    pub fn provenance(&self) -> Option<&Provenance> {
        self.provenance.as_deref()
    }

    pub fn warnings(&self) -> &WarningSet {
        &self.data.warnings
    }
}
