//! Data types for emitted request events.
//!
//! This module contains the structures that cross the crate's two external
//! seams: the read-only request view handed to user predicates, and the
//! summary event handed to the active [`EventSink`](crate::EventSink).

use std::sync::Arc;

use crate::errors::CapturedError;
use crate::level::Level;

/// Message template shared by every emitted request summary.
pub const MESSAGE_TEMPLATE: &str =
    "HTTP {Method} {RawUrl} responded {StatusCode} in {ElapsedMilliseconds}ms";

/// A predicate over a finalized request, used for exclusion filters and
/// form-capture matching. Must be cheap and side-effect free; it may run for
/// every request.
pub type RequestPredicate = Arc<dyn Fn(&RequestInfo) -> bool + Send + Sync>;

/// One submitted form field. Sequences of fields preserve submission order,
/// and a name submitted several times yields several entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    /// Field name as submitted.
    pub name: String,
    /// Field value, possibly replaced by the redaction mask.
    pub value: String,
}

impl FormField {
    /// Convenience constructor used pervasively in tests.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Read-only view of a completed request, exposed to user predicates.
///
/// This is deliberately a plain value type: predicates cannot reach back into
/// the live request or response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    /// HTTP method, e.g. `"GET"`.
    pub method: String,
    /// Raw URL as received, including the query string.
    pub raw_url: String,
    /// Final response status code.
    pub status_code: u16,
}

/// The structured event emitted once per logged request.
///
/// `form_data` is `None` both when capture was not decided and when the
/// submitted form was empty; an event never carries an empty form property.
#[derive(Debug, Clone)]
pub struct RequestSummary {
    /// Event severity: `Error` for failed requests, the configured request
    /// level otherwise.
    pub level: Level,
    /// HTTP method.
    pub method: String,
    /// Raw URL as received.
    pub raw_url: String,
    /// Final response status code.
    pub status_code: u16,
    /// Wall time between request begin and end, in milliseconds.
    pub elapsed_ms: u64,
    /// The error attributed to this request, if any was resolved.
    pub error: Option<CapturedError>,
    /// Captured (and possibly redacted) form fields, if inclusion was decided.
    pub form_data: Option<Vec<FormField>>,
}

impl RequestSummary {
    /// Renders [`MESSAGE_TEMPLATE`] with this event's field values.
    ///
    /// ```rust
    /// use turnstile::{Level, RequestSummary};
    ///
    /// let event = RequestSummary {
    ///     level: Level::Information,
    ///     method: "GET".into(),
    ///     raw_url: "/widgets?page=2".into(),
    ///     status_code: 200,
    ///     elapsed_ms: 4,
    ///     error: None,
    ///     form_data: None,
    /// };
    /// assert_eq!(event.message(), "HTTP GET /widgets?page=2 responded 200 in 4ms");
    /// ```
    pub fn message(&self) -> String {
        format!(
            "HTTP {} {} responded {} in {}ms",
            self.method, self.raw_url, self.status_code, self.elapsed_ms
        )
    }
}
