//! Emission targets for request summary events.
//!
//! The middleware emits every event through exactly one [`EventSink`]: the
//! process default ([`TracingSink`]) or an override installed with
//! [`RequestLogging::set_logger`](crate::RequestLogging::set_logger). A sink
//! owns its own minimum-severity threshold; an event below it is silently
//! dropped by the sink, never by the middleware.

use tracing::Level as TracingLevel;

use crate::level::Level;
use crate::types::RequestSummary;

/// A structured-event emission target.
///
/// Implementations must be cheap to call on the request path: any blocking
/// I/O belongs behind the sink (buffering, channels, background writers),
/// not in front of it. Emission is fire-and-forget — the middleware never
/// observes a sink failure.
///
/// # Examples
///
/// A collecting sink with a runtime-adjustable threshold, as used by the
/// integration tests:
///
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use turnstile::{EventSink, Level, LevelSwitch, RequestSummary};
///
/// #[derive(Clone, Default)]
/// struct CollectingSink {
///     switch: LevelSwitch,
///     events: Arc<Mutex<Vec<RequestSummary>>>,
/// }
///
/// impl EventSink for CollectingSink {
///     fn enabled(&self, level: Level) -> bool {
///         level >= self.switch.minimum()
///     }
///
///     fn emit(&self, event: &RequestSummary) {
///         if self.enabled(event.level) {
///             self.events.lock().unwrap().push(event.clone());
///         }
///     }
/// }
/// ```
pub trait EventSink: Send + Sync {
    /// Whether an event at `level` would currently be accepted.
    ///
    /// Besides gating [`emit`](Self::emit), this drives the `Always` and
    /// `OnMatch` form-capture policies: their form data is attached only
    /// when the active sink is enabled at the policy's level, evaluated at
    /// emission time.
    fn enabled(&self, _level: Level) -> bool {
        true
    }

    /// Accepts one request summary. Must drop the event silently when it is
    /// below the sink's threshold.
    fn emit(&self, event: &RequestSummary);
}

/// The default sink: forwards each summary as a [`tracing`] event.
///
/// Severity maps onto `tracing`'s five levels (`Verbose` → `TRACE`,
/// `Information` → `INFO`, `Fatal` folds into `ERROR`), and the subscriber's
/// filter configuration acts as the sink threshold via
/// [`tracing::enabled!`]. The event carries the named fields `Method`,
/// `RawUrl`, `StatusCode` and `ElapsedMilliseconds`, plus `Error` and
/// `FormData` when present.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

macro_rules! forward_event {
    ($level:expr, $event:ident) => {
        tracing::event!(
            $level,
            Method = %$event.method,
            RawUrl = %$event.raw_url,
            StatusCode = $event.status_code,
            ElapsedMilliseconds = $event.elapsed_ms,
            Error = $event.error.as_ref().map(tracing::field::display),
            FormData = $event.form_data.as_ref().map(tracing::field::debug),
            "{}",
            $event.message()
        )
    };
}

impl EventSink for TracingSink {
    fn enabled(&self, level: Level) -> bool {
        // `enabled!` needs a const level, hence the dispatch.
        match level {
            Level::Verbose => tracing::enabled!(TracingLevel::TRACE),
            Level::Debug => tracing::enabled!(TracingLevel::DEBUG),
            Level::Information => tracing::enabled!(TracingLevel::INFO),
            Level::Warning => tracing::enabled!(TracingLevel::WARN),
            Level::Error | Level::Fatal => tracing::enabled!(TracingLevel::ERROR),
        }
    }

    fn emit(&self, event: &RequestSummary) {
        match event.level {
            Level::Verbose => forward_event!(TracingLevel::TRACE, event),
            Level::Debug => forward_event!(TracingLevel::DEBUG, event),
            Level::Information => forward_event!(TracingLevel::INFO, event),
            Level::Warning => forward_event!(TracingLevel::WARN, event),
            Level::Error | Level::Fatal => forward_event!(TracingLevel::ERROR, event),
        }
    }
}
