//! Form-data capture policy.
//!
//! A [`FormDataPolicy`] decides, per finished request, whether the form
//! snapshot taken at request begin makes it onto the emitted event, and with
//! which redaction. Capture ("read the body now") and inclusion ("attach it
//! to the event") are deliberately separate: the snapshot is taken eagerly
//! at begin because the body is not re-readable later, while the inclusion
//! decision runs at emission time against the configuration active *then*.

use std::fmt;
use std::sync::Arc;

use crate::level::Level;
use crate::redact::{redact_fields, DEFAULT_BLACKLIST};
use crate::sink::EventSink;
use crate::types::{FormField, RequestInfo, RequestPredicate};

fn default_blacklist() -> Arc<[String]> {
    DEFAULT_BLACKLIST
        .iter()
        .map(|word| (*word).to_owned())
        .collect()
}

/// When, and how, submitted form data is attached to request events.
///
/// Replaced wholesale via
/// [`RequestLogging::set_form_data_policy`](crate::RequestLogging::set_form_data_policy);
/// levels and blacklists are never merged across calls.
///
/// # Examples
///
/// ```rust
/// use turnstile::{FormDataPolicy, Level};
///
/// // Attach form data to every event emitted at Verbose or above,
/// // masking values whose names contain "token".
/// let policy = FormDataPolicy::always()
///     .at_level(Level::Verbose)
///     .with_blacklist(["token"]);
///
/// // Attach form data only when the request failed with a server error.
/// let on_error = FormDataPolicy::only_on_error();
/// ```
#[derive(Clone, Default)]
pub enum FormDataPolicy {
    /// Never capture form data. The middleware skips body buffering
    /// entirely.
    #[default]
    Disabled,
    /// Capture on every request; include whenever the active sink is
    /// enabled at `level` when the event is emitted.
    Always {
        /// Sink level gating inclusion, checked at emission time.
        level: Level,
        /// Apply the redactor before emission. Off means values are logged
        /// verbatim.
        redact: bool,
        /// Substring blacklist; replaces [`DEFAULT_BLACKLIST`].
        blacklist: Arc<[String]>,
    },
    /// Include form data only when the final status code is ≥ 500.
    OnlyOnError,
    /// Include form data when `predicate` matches the finalized request.
    /// The predicate is authoritative: its result is not further filtered
    /// by error status.
    OnMatch {
        /// Decides inclusion from the finalized request view.
        predicate: RequestPredicate,
        /// Sink level gating inclusion, checked at emission time.
        level: Level,
    },
}

impl FormDataPolicy {
    /// Capture on every request, at `Debug` level, with password redaction.
    pub fn always() -> Self {
        Self::Always {
            level: Level::Debug,
            redact: true,
            blacklist: default_blacklist(),
        }
    }

    /// Capture only for server-error responses.
    pub fn only_on_error() -> Self {
        Self::OnlyOnError
    }

    /// Capture when `predicate` matches the finalized request, at
    /// `Information` level.
    pub fn on_match<F>(predicate: F) -> Self
    where
        F: Fn(&RequestInfo) -> bool + Send + Sync + 'static,
    {
        Self::OnMatch {
            predicate: Arc::new(predicate),
            level: Level::Information,
        }
    }

    /// Sets the sink level gating inclusion. No effect on `Disabled` and
    /// `OnlyOnError`.
    pub fn at_level(self, level: Level) -> Self {
        match self {
            Self::Always {
                redact, blacklist, ..
            } => Self::Always {
                level,
                redact,
                blacklist,
            },
            Self::OnMatch { predicate, .. } => Self::OnMatch { predicate, level },
            other => other,
        }
    }

    /// Turns redaction off for an `Always` policy. Values are then emitted
    /// verbatim.
    pub fn without_redaction(self) -> Self {
        match self {
            Self::Always {
                level, blacklist, ..
            } => Self::Always {
                level,
                redact: false,
                blacklist,
            },
            other => other,
        }
    }

    /// Replaces the redaction blacklist of an `Always` policy.
    pub fn with_blacklist<I, S>(self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self {
            Self::Always { level, redact, .. } => Self::Always {
                level,
                redact,
                blacklist: words.into_iter().map(Into::into).collect(),
            },
            other => other,
        }
    }

    /// Whether the middleware must snapshot the form body at request begin.
    ///
    /// Everything except `Disabled` may need the data, and the body will be
    /// gone by the time the final decision can run.
    pub(crate) fn wants_capture(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// Applies the policy to a finished request, turning the begin-time
    /// snapshot into the fields to attach, if any.
    ///
    /// An empty snapshot never produces a property. Returns the redacted
    /// fields for inclusion, or `None` to attach nothing.
    pub(crate) fn apply(
        &self,
        info: &RequestInfo,
        sink: &dyn EventSink,
        snapshot: Vec<FormField>,
    ) -> Option<Vec<FormField>> {
        if snapshot.is_empty() {
            return None;
        }
        match self {
            Self::Disabled => None,
            Self::Always {
                level,
                redact,
                blacklist,
            } => {
                if !sink.enabled(*level) {
                    return None;
                }
                if *redact {
                    Some(redact_fields(snapshot, blacklist))
                } else {
                    Some(snapshot)
                }
            }
            Self::OnlyOnError => {
                if info.status_code < 500 {
                    return None;
                }
                Some(redact_fields(snapshot, DEFAULT_BLACKLIST))
            }
            Self::OnMatch { predicate, level } => {
                if !predicate(info) || !sink.enabled(*level) {
                    return None;
                }
                Some(redact_fields(snapshot, DEFAULT_BLACKLIST))
            }
        }
    }
}

impl fmt::Debug for FormDataPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("Disabled"),
            Self::Always {
                level,
                redact,
                blacklist,
            } => f
                .debug_struct("Always")
                .field("level", level)
                .field("redact", redact)
                .field("blacklist", blacklist)
                .finish(),
            Self::OnlyOnError => f.write_str("OnlyOnError"),
            Self::OnMatch { level, .. } => f
                .debug_struct("OnMatch")
                .field("level", level)
                .finish_non_exhaustive(),
        }
    }
}
