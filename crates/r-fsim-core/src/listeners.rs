//! ---
//! fsim_section: "01-core-functionality"
//! fsim_subsection: "module"
//! fsim_type: "source"
//! fsim_scope: "code"
//! fsim_description: "Simulation run lifecycle and orchestration."
//! fsim_version: "v0.1.0"
//! fsim_owner: "tbd"
//! ---
//! Change fan-out and plugin resolution.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use r_fsim_engine::SimulationListener;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::RunError;

/// Which object emitted a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeSource {
    Options,
    Simulation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub source: ChangeSource,
}

impl ChangeEvent {
    pub fn new(source: ChangeSource) -> Self {
        Self { source }
    }
}

/// Subscriber for "state changed" events.
pub trait StateChangeListener: Send + Sync {
    fn state_changed(&self, event: &ChangeEvent);
}

impl<F> StateChangeListener for F
where
    F: Fn(&ChangeEvent) + Send + Sync,
{
    fn state_changed(&self, event: &ChangeEvent) {
        self(event)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Fan-out list of [`StateChangeListener`]s.
///
/// `notify` dispatches over a copy of the subscriber list taken before the
/// first callback, so subscribers may (un)subscribe from inside a callback.
/// Changes made during a dispatch apply from the next event on.
#[derive(Default)]
pub struct ChangeNotifier {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<(ListenerId, Arc<dyn StateChangeListener>)>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: Arc<dyn StateChangeListener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.lock().push((id, listener));
        id
    }

    /// Returns `false` when the id was not subscribed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    pub fn notify(&self, event: &ChangeEvent) {
        let snapshot: Vec<Arc<dyn StateChangeListener>> = self
            .subscribers
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in snapshot {
            listener.state_changed(event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.lock().is_empty()
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginError {
    #[error("no plugin is registered under this identifier")]
    Unknown,
    #[error("plugin instantiation failed: {0}")]
    Instantiation(String),
}

/// Creates a fresh listener instance for one simulation attempt.
pub type PluginFactory =
    dyn Fn() -> Result<Box<dyn SimulationListener>, PluginError> + Send + Sync;

/// Identifier → factory table, populated at startup and shared by runs.
#[derive(Default, Clone)]
pub struct PluginRegistry {
    factories: IndexMap<String, Arc<PluginFactory>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `id`, replacing any previous registration.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Result<Box<dyn SimulationListener>, PluginError> + Send + Sync + 'static,
    {
        let id = id.into();
        if self.factories.insert(id.clone(), Arc::new(factory)).is_some() {
            warn!(plugin = %id, "plugin registration replaced");
        }
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Registered identifiers in registration order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub fn resolve(&self, id: &str) -> Result<Box<dyn SimulationListener>, PluginError> {
        let factory = self.factories.get(id).ok_or(PluginError::Unknown)?;
        factory()
    }

    /// Resolve every identifier in order.
    ///
    /// The first failure aborts the whole resolution and drops the listeners
    /// already created, so a failed attempt never runs a partial plugin set.
    pub fn resolve_all(&self, ids: &[String]) -> Result<Vec<Box<dyn SimulationListener>>, RunError> {
        let mut resolved = Vec::with_capacity(ids.len());
        for id in ids {
            match self.resolve(id) {
                Ok(listener) => resolved.push(listener),
                Err(source) => {
                    warn!(plugin = %id, error = %source, "plugin resolution failed");
                    return Err(RunError::ListenerResolution {
                        id: id.clone(),
                        source,
                    });
                }
            }
        }
        debug!(plugins = resolved.len(), "plugins resolved");
        Ok(resolved)
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("identifiers", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Ordered plugin identifiers owned by a run.
///
/// Cloning the handle shares the list; edits through any handle are live.
/// Use [`PluginIds::detached`] for an independent copy.
#[derive(Debug, Clone, Default)]
pub struct PluginIds {
    ids: Arc<Mutex<Vec<String>>>,
}

impl PluginIds {
    pub fn new(ids: Vec<String>) -> Self {
        Self {
            ids: Arc::new(Mutex::new(ids)),
        }
    }

    /// Independent deep copy of the current list.
    pub fn detached(&self) -> Self {
        Self::new(self.to_vec())
    }

    pub fn push(&self, id: impl Into<String>) {
        self.ids.lock().push(id.into());
    }

    /// Insert at `index`, clamped to the list length.
    pub fn insert(&self, index: usize, id: impl Into<String>) {
        let mut ids = self.ids.lock();
        let index = index.min(ids.len());
        ids.insert(index, id.into());
    }

    /// Remove the first occurrence of `id`.
    pub fn remove(&self, id: &str) -> bool {
        let mut ids = self.ids.lock();
        match ids.iter().position(|existing| existing == id) {
            Some(index) => {
                ids.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn replace(&self, ids: Vec<String>) {
        *self.ids.lock() = ids;
    }

    pub fn clear(&self) {
        self.ids.lock().clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.lock().iter().any(|existing| existing == id)
    }

    pub fn len(&self) -> usize {
        self.ids.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.lock().is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.ids.lock().clone()
    }

    /// Whether both handles refer to the same underlying list.
    pub fn shares_storage_with(&self, other: &PluginIds) -> bool {
        Arc::ptr_eq(&self.ids, &other.ids)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::OnceLock;

    use r_fsim_testharness::{CountingListener, ListenerLog};

    use super::*;

    fn registry(log: &ListenerLog) -> PluginRegistry {
        let mut registry = PluginRegistry::new();
        for id in ["apogee.alert", "telemetry.csv"] {
            let log = log.clone();
            registry.register(id, move || Ok(CountingListener::new(id, log.clone()).boxed()));
        }
        registry.register("broken", || {
            Err(PluginError::Instantiation("missing calibration table".into()))
        });
        registry
    }

    #[test]
    fn resolve_all_keeps_order_and_duplicates() {
        let log = ListenerLog::new();
        let registry = registry(&log);
        let ids = vec![
            "telemetry.csv".to_owned(),
            "apogee.alert".to_owned(),
            "telemetry.csv".to_owned(),
        ];
        let listeners = registry.resolve_all(&ids).expect("all resolve");
        let names: Vec<&str> = listeners.iter().map(|l| l.name()).collect();
        assert_eq!(names, ["telemetry.csv", "apogee.alert", "telemetry.csv"]);
    }

    #[test]
    fn unknown_identifier_names_the_offender() {
        let registry = registry(&ListenerLog::new());
        let ids = vec!["apogee.alert".to_owned(), "com.example.Missing".to_owned()];
        match registry.resolve_all(&ids) {
            Err(RunError::ListenerResolution { id, source }) => {
                assert_eq!(id, "com.example.Missing");
                assert_eq!(source, PluginError::Unknown);
            }
            other => panic!("unexpected resolution result: {other:?}"),
        }
    }

    #[test]
    fn instantiation_failure_is_reported() {
        let registry = registry(&ListenerLog::new());
        let err = registry
            .resolve_all(&["broken".to_owned()])
            .expect_err("factory fails");
        assert!(err.to_string().contains("broken"));
        assert!(err.to_string().contains("missing calibration table"));
    }

    #[test]
    fn registration_replaces_previous_factory() {
        let log = ListenerLog::new();
        let mut registry = registry(&log);
        let replacement_log = log.clone();
        registry.register("apogee.alert", move || {
            Ok(CountingListener::new("apogee.v2", replacement_log.clone()).boxed())
        });
        assert_eq!(registry.len(), 3);
        let listener = registry.resolve("apogee.alert").expect("resolves");
        assert_eq!(listener.name(), "apogee.v2");
        assert_eq!(
            registry.identifiers().collect::<Vec<_>>(),
            ["apogee.alert", "telemetry.csv", "broken"]
        );
    }

    #[test]
    fn notifier_reaches_every_subscriber_once() {
        let notifier = ChangeNotifier::new();
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let count = count.clone();
            notifier.subscribe(Arc::new(move |_: &ChangeEvent| {
                count.fetch_add(1, Ordering::SeqCst);
            }));
        }
        notifier.notify(&ChangeEvent::new(ChangeSource::Simulation));
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn self_removal_during_dispatch_skips_nobody() {
        let notifier = Arc::new(ChangeNotifier::new());
        let first = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(AtomicUsize::new(0));

        let own_id: Arc<OnceLock<ListenerId>> = Arc::new(OnceLock::new());
        let remover = {
            let notifier = notifier.clone();
            let own_id = own_id.clone();
            let first = first.clone();
            move |_: &ChangeEvent| {
                first.fetch_add(1, Ordering::SeqCst);
                if let Some(id) = own_id.get() {
                    assert!(notifier.unsubscribe(*id));
                }
            }
        };
        let id = notifier.subscribe(Arc::new(remover));
        own_id.set(id).expect("id set once");
        let counter = last.clone();
        notifier.subscribe(Arc::new(move |_: &ChangeEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        notifier.notify(&ChangeEvent::new(ChangeSource::Simulation));
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(last.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.len(), 1);

        notifier.notify(&ChangeEvent::new(ChangeSource::Simulation));
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(last.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn plugin_ids_share_until_detached() {
        let ids = PluginIds::new(vec!["a".into()]);
        let shared = ids.clone();
        shared.push("b");
        assert_eq!(ids.to_vec(), ["a", "b"]);
        assert!(ids.shares_storage_with(&shared));

        let detached = ids.detached();
        detached.push("c");
        assert_eq!(ids.len(), 2);
        assert!(!ids.shares_storage_with(&detached));

        ids.insert(10, "z");
        assert!(ids.remove("a"));
        assert!(!ids.remove("a"));
        assert_eq!(ids.to_vec(), ["b", "z"]);
    }
}
