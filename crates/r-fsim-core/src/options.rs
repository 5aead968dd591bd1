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
use std::sync::Arc;

use parking_lot::Mutex;
use r_fsim_common::config::SimulationDefaults;
use r_fsim_common::limits::LaunchParameters;
use r_fsim_engine::{Design, IntegrationSettings, LaunchConditions, SimulationConditions, StrategySet};
use serde::{Deserialize, Serialize};

use crate::error::OptionsError;
use crate::listeners::{ChangeEvent, ChangeNotifier, ChangeSource, ListenerId, StateChangeListener};

/// Run parameters: motor selection, launch site and integration settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOptions {
    pub motor_configuration: Option<String>,
    pub launch: LaunchConditions,
    pub integration: IntegrationSettings,
    pub random_seed: u64,
}

impl SimulationOptions {
    /// Options for a fresh run of `design`.
    ///
    /// The motor configuration is the design's default. Without a fixed seed in
    /// `defaults`, a new random seed is drawn.
    pub fn for_design(design: &dyn Design, defaults: &SimulationDefaults) -> Self {
        Self {
            motor_configuration: design.default_motor_configuration(),
            launch: LaunchConditions {
                rod_length_m: defaults.launch_rod_length_m,
                rod_angle_rad: defaults.launch_rod_angle_deg.to_radians(),
                rod_direction_rad: defaults.launch_rod_direction_deg.to_radians(),
                wind_speed_average_ms: defaults.wind_speed_average_ms,
                wind_turbulence_intensity: defaults.wind_turbulence_intensity,
                launch_altitude_m: defaults.launch_altitude_m,
                launch_latitude_deg: defaults.launch_latitude_deg,
                use_isa: defaults.use_isa,
                launch_temperature_k: defaults.launch_temperature_k,
                launch_pressure_pa: defaults.launch_pressure_pa,
            },
            integration: IntegrationSettings {
                time_step_s: defaults.time_step.as_secs_f64(),
                max_angle_step_rad: defaults.max_angle_step_deg.to_radians(),
                calculate_extra: defaults.calculate_extra,
            },
            random_seed: defaults.random_seed.unwrap_or_else(rand::random),
        }
    }

    /// Overwrite every field with the values of `other`.
    pub fn copy_from(&mut self, other: &SimulationOptions) {
        self.motor_configuration = other.motor_configuration.clone();
        self.launch = other.launch.clone();
        self.integration = other.integration.clone();
        self.random_seed = other.random_seed;
    }

    /// Range check shared with the configured defaults, after converting
    /// angles back to degrees.
    pub fn validate(&self) -> Result<(), OptionsError> {
        let launch = &self.launch;
        LaunchParameters {
            rod_length_m: launch.rod_length_m,
            rod_angle_deg: launch.rod_angle_rad.to_degrees(),
            wind_speed_average_ms: launch.wind_speed_average_ms,
            wind_turbulence_intensity: launch.wind_turbulence_intensity,
            latitude_deg: launch.launch_latitude_deg,
            temperature_k: launch.launch_temperature_k,
            pressure_pa: launch.launch_pressure_pa,
            time_step_s: self.integration.time_step_s,
            max_angle_step_deg: self.integration.max_angle_step_rad.to_degrees(),
        }
        .check()
    }

    /// Engine input for one attempt; listeners are attached by the caller.
    pub fn to_conditions(
        &self,
        design: Arc<dyn Design>,
        strategies: StrategySet,
    ) -> SimulationConditions {
        SimulationConditions {
            design,
            motor_configuration: self.motor_configuration.clone(),
            launch: self.launch.clone(),
            integration: self.integration.clone(),
            random_seed: self.random_seed,
            strategies,
            listeners: Vec::new(),
        }
    }
}

struct OptionsCell {
    options: Mutex<SimulationOptions>,
    notifier: ChangeNotifier,
}

/// Live, shared handle to the options owned by a run.
///
/// Edits made through [`OptionsHandle::update`] notify subscribers when they
/// actually change a value; the owning run re-derives its status from them.
#[derive(Clone)]
pub struct OptionsHandle {
    cell: Arc<OptionsCell>,
}

impl OptionsHandle {
    pub fn new(options: SimulationOptions) -> Self {
        Self {
            cell: Arc::new(OptionsCell {
                options: Mutex::new(options),
                notifier: ChangeNotifier::new(),
            }),
        }
    }

    /// Clone of the current values.
    pub fn snapshot(&self) -> SimulationOptions {
        self.cell.options.lock().clone()
    }

    /// Run `read` against a snapshot. The lock is not held while it runs, so
    /// `read` may query the owning run.
    pub fn with<R>(&self, read: impl FnOnce(&SimulationOptions) -> R) -> R {
        read(&self.snapshot())
    }

    /// Edit a copy of the options and publish it.
    ///
    /// `edit` runs without the lock held and sees the values from before the
    /// call; concurrent edits resolve last writer wins. Subscribers are
    /// notified only if the published values differ from the current ones.
    pub fn update<R>(&self, edit: impl FnOnce(&mut SimulationOptions) -> R) -> R {
        let mut edited = self.snapshot();
        let result = edit(&mut edited);
        let changed = {
            let mut options = self.cell.options.lock();
            if *options == edited {
                false
            } else {
                *options = edited;
                true
            }
        };
        if changed {
            self.cell
                .notifier
                .notify(&ChangeEvent::new(ChangeSource::Options));
        }
        result
    }

    pub fn copy_from(&self, other: &SimulationOptions) {
        self.update(|options| options.copy_from(other));
    }

    pub fn matches(&self, other: &SimulationOptions) -> bool {
        *self.cell.options.lock() == *other
    }

    pub fn subscribe(&self, listener: Arc<dyn StateChangeListener>) -> ListenerId {
        self.cell.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.cell.notifier.unsubscribe(id)
    }

    /// Whether both handles refer to the same options.
    pub fn same_as(&self, other: &OptionsHandle) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl fmt::Debug for OptionsHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OptionsHandle").field(&self.snapshot()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use r_fsim_testharness::{default_strategies, TestDesign};

    use super::*;

    fn fixed_defaults() -> SimulationDefaults {
        SimulationDefaults {
            random_seed: Some(7),
            ..SimulationDefaults::default()
        }
    }

    #[test]
    fn fresh_options_follow_design_and_defaults() {
        let design = TestDesign::new("Alpha III");
        let defaults = SimulationDefaults {
            launch_rod_angle_deg: 5.0,
            ..fixed_defaults()
        };
        let options = SimulationOptions::for_design(&design, &defaults);
        assert_eq!(options.motor_configuration.as_deref(), Some("C6-5"));
        assert_eq!(options.random_seed, 7);
        assert!((options.launch.rod_angle_rad - 5f64.to_radians()).abs() < 1e-12);
        assert!((options.integration.time_step_s - 0.01).abs() < 1e-12);
        options.validate().expect("defaults are valid");
    }

    #[test]
    fn copy_from_makes_values_equal_but_independent() {
        let design = TestDesign::new("Alpha III");
        let mut source = SimulationOptions::for_design(&design, &fixed_defaults());
        source.launch.rod_length_m = 2.4;
        source.motor_configuration = Some("D12-3".into());

        let mut target = SimulationOptions::for_design(&TestDesign::new("Copy"), &SimulationDefaults::default());
        target.copy_from(&source);
        assert_eq!(target, source);

        target.launch.rod_length_m = 0.5;
        assert_eq!(source.launch.rod_length_m, 2.4);
    }

    #[test]
    fn validation_rejects_out_of_range_values() {
        let design = TestDesign::new("Alpha III");
        let base = SimulationOptions::for_design(&design, &fixed_defaults());

        let mut steep = base.clone();
        steep.launch.rod_angle_rad = 75f64.to_radians();
        assert!(matches!(steep.validate(), Err(OptionsError::RodAngle(_))));

        let mut frozen = base.clone();
        frozen.integration.time_step_s = 0.0;
        assert_eq!(frozen.validate(), Err(OptionsError::TimeStep(0.0)));

        let mut nan_rod = base;
        nan_rod.launch.rod_length_m = f64::NAN;
        assert!(matches!(nan_rod.validate(), Err(OptionsError::RodLength(_))));
    }

    #[test]
    fn configured_and_run_limits_agree() {
        let design = TestDesign::new("Alpha III");
        for angle_deg in [60.0, -60.0, 60.5, -75.0] {
            let defaults = SimulationDefaults {
                launch_rod_angle_deg: angle_deg,
                ..fixed_defaults()
            };
            let options = SimulationOptions::for_design(&design, &defaults);
            assert_eq!(
                defaults.validate().is_ok(),
                options.validate().is_ok(),
                "rod angle {angle_deg}°"
            );
        }

        let flat = SimulationDefaults {
            max_angle_step_deg: 0.0,
            ..fixed_defaults()
        };
        let options = SimulationOptions::for_design(&design, &flat);
        assert_eq!(options.validate(), Err(OptionsError::MaxAngleStep(0.0)));
        assert!(flat.validate().is_err());
    }

    #[test]
    fn edit_may_reenter_the_handle() {
        let design = TestDesign::new("Alpha III");
        let handle = OptionsHandle::new(SimulationOptions::for_design(&design, &fixed_defaults()));
        let seen = handle.update(|options| {
            options.random_seed = 11;
            handle.snapshot().random_seed
        });
        assert_eq!(seen, 7);
        assert_eq!(handle.with(|_| handle.snapshot().random_seed), 11);
    }

    #[test]
    fn conditions_carry_option_values() {
        let design: Arc<dyn Design> = TestDesign::shared("Alpha III");
        let options = SimulationOptions::for_design(design.as_ref(), &fixed_defaults());
        let conditions = options.to_conditions(design.clone(), default_strategies());
        assert_eq!(conditions.motor_configuration.as_deref(), Some("C6-5"));
        assert_eq!(conditions.random_seed, 7);
        assert_eq!(conditions.strategies.describe(), "rk4/barrowman/basic");
        assert!(conditions.listeners.is_empty());
    }

    #[test]
    fn handle_notifies_only_on_effective_change() {
        let design = TestDesign::new("Alpha III");
        let handle = OptionsHandle::new(SimulationOptions::for_design(&design, &fixed_defaults()));
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        handle.subscribe(Arc::new(move |event: &ChangeEvent| {
            assert_eq!(event.source, ChangeSource::Options);
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        handle.update(|options| options.launch.rod_length_m = 1.8);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        handle.update(|options| options.launch.rod_length_m = 1.8);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        let length = handle.with(|options| options.launch.rod_length_m);
        assert_eq!(length, 1.8);
    }

    #[test]
    fn cloned_handle_is_live_snapshot_is_not() {
        let design = TestDesign::new("Alpha III");
        let handle = OptionsHandle::new(SimulationOptions::for_design(&design, &fixed_defaults()));
        let alias = handle.clone();
        let snapshot = handle.snapshot();

        alias.update(|options| options.random_seed = 99);
        assert_eq!(handle.snapshot().random_seed, 99);
        assert_eq!(snapshot.random_seed, 7);
        assert!(handle.same_as(&alias));
        assert!(!handle.matches(&snapshot));
    }
}
