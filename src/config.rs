//! The process-wide, runtime-mutable logging policy engine.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::level::Level;
use crate::policy::FormDataPolicy;
use crate::sink::{EventSink, TracingSink};
use crate::types::{RequestInfo, RequestPredicate};

/// One complete, immutable view of the logging configuration.
///
/// Snapshots are cheap to clone (the heavy parts are shared) and never
/// mutated in place: every [`RequestLogging`] operation builds a modified
/// copy and swaps it in atomically, so a reader holds either the old or the
/// new configuration in full, never a mix.
#[derive(Clone)]
pub struct PolicySnapshot {
    /// Whether request logging runs at all.
    pub enabled: bool,
    /// Severity of the per-request summary event for successful requests.
    pub request_level: Level,
    /// Requests matching this predicate produce no event.
    pub exclusion_filter: Option<RequestPredicate>,
    /// Active form-data capture policy.
    pub form_data: FormDataPolicy,
    /// Active emission target. Exactly one at a time.
    pub logger: Arc<dyn EventSink>,
}

impl Default for PolicySnapshot {
    fn default() -> Self {
        Self {
            enabled: true,
            request_level: Level::Information,
            exclusion_filter: None,
            form_data: FormDataPolicy::Disabled,
            logger: Arc::new(TracingSink),
        }
    }
}

impl fmt::Debug for PolicySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicySnapshot")
            .field("enabled", &self.enabled)
            .field("request_level", &self.request_level)
            .field("exclusion_filter", &self.exclusion_filter.is_some())
            .field("form_data", &self.form_data)
            .finish_non_exhaustive()
    }
}

/// Shared handle over the logging configuration, safe to mutate while
/// requests are in flight.
///
/// One instance is shared between the [`RequestLogLayer`](crate::RequestLogLayer)
/// and whatever operator code adjusts logging at runtime. Each mutation is a
/// total function over the whole configuration: it replaces the snapshot
/// atomically and is immediately visible to in-flight and subsequent
/// requests.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use turnstile::{FormDataPolicy, Level, RequestLogging};
///
/// let logging = Arc::new(RequestLogging::new());
/// logging.set_request_level(Level::Debug);
/// logging.set_form_data_policy(FormDataPolicy::only_on_error());
/// logging.set_exclusion_filter(|req| req.raw_url.starts_with("/health"));
///
/// // Back to built-in defaults.
/// logging.reset();
/// ```
#[derive(Debug, Default)]
pub struct RequestLogging {
    current: Mutex<Arc<PolicySnapshot>>,
}

impl RequestLogging {
    /// Creates an engine with the built-in defaults: enabled,
    /// `Information`-level summaries, no exclusion filter, form capture
    /// disabled, [`TracingSink`] as the emission target.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Arc<PolicySnapshot>> {
        // Held only to clone or swap the Arc; a poisoned guard still holds
        // a complete snapshot.
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the current configuration in full.
    pub fn snapshot(&self) -> Arc<PolicySnapshot> {
        self.lock().clone()
    }

    fn update(&self, mutate: impl FnOnce(&mut PolicySnapshot)) {
        let mut guard = self.lock();
        let mut next = PolicySnapshot::clone(&guard);
        mutate(&mut next);
        *guard = Arc::new(next);
    }

    /// Turns request logging on.
    pub fn enable(&self) {
        self.update(|config| config.enabled = true);
    }

    /// Turns request logging off. In-flight requests observe this at their
    /// end; new requests skip all instrumentation work.
    pub fn disable(&self) {
        self.update(|config| config.enabled = false);
    }

    /// Sets the severity of the per-request summary event. Failed requests
    /// (status ≥ 500 or a resolved error) are always logged at `Error`.
    pub fn set_request_level(&self, level: Level) {
        self.update(|config| config.request_level = level);
    }

    /// Excludes requests matching `predicate` from logging entirely.
    pub fn set_exclusion_filter<F>(&self, predicate: F)
    where
        F: Fn(&RequestInfo) -> bool + Send + Sync + 'static,
    {
        let predicate: RequestPredicate = Arc::new(predicate);
        self.update(|config| config.exclusion_filter = Some(predicate));
    }

    /// Removes the exclusion filter.
    pub fn clear_exclusion_filter(&self) {
        self.update(|config| config.exclusion_filter = None);
    }

    /// Replaces the form-data capture policy wholesale. Levels and
    /// blacklists from the previous policy are not carried over.
    pub fn set_form_data_policy(&self, policy: FormDataPolicy) {
        self.update(|config| config.form_data = policy);
    }

    /// Overrides the emission target. The default target stops receiving
    /// events; nothing is ever emitted to both.
    pub fn set_logger<S>(&self, sink: S)
    where
        S: EventSink + 'static,
    {
        let sink: Arc<dyn EventSink> = Arc::new(sink);
        self.update(|config| config.logger = sink);
    }

    /// Restores the default [`TracingSink`] emission target.
    pub fn reset_logger(&self) {
        self.update(|config| config.logger = Arc::new(TracingSink));
    }

    /// Restores every setting to the built-in defaults.
    pub fn reset(&self) {
        *self.lock() = Arc::new(PolicySnapshot::default());
    }
}
