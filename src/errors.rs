//! Per-request error recording and end-of-request error resolution.

use std::error::Error;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A recorded application error, shared between the recording site and the
/// emitted event.
pub type CapturedError = Arc<dyn Error + Send + Sync + 'static>;

#[derive(Debug, Default)]
struct ErrorLog {
    history: Vec<CapturedError>,
    current: Option<CapturedError>,
}

/// Handle for recording application errors against the current request.
///
/// The middleware inserts one of these into the request extensions while
/// request logging is enabled; handlers pull it back out and record errors
/// they encounter. Clones share the same underlying log.
///
/// The log keeps two things: an append-only history of everything recorded,
/// and a "current error" pointer that [`clear`](Self::clear) resets without
/// touching the history. A handler that records an error, recovers, and
/// clears it can therefore still have the error attributed to the request if
/// the response ultimately comes back as a server error.
///
/// # Examples
///
/// ```rust
/// use axum::{routing::post, Extension, Router};
/// use turnstile::RequestErrors;
///
/// async fn checkout(errors: Option<Extension<RequestErrors>>) -> &'static str {
///     if let Some(Extension(errors)) = errors {
///         errors.record(std::io::Error::other("payment gateway unreachable"));
///     }
///     "retrying"
/// }
///
/// let app: Router = Router::new().route("/checkout", post(checkout));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestErrors {
    inner: Arc<Mutex<ErrorLog>>,
}

impl RequestErrors {
    /// Creates an empty error log.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ErrorLog> {
        // The lock is only held for field reads/writes, so a poisoned guard
        // still holds consistent data.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records an error: appends it to the history and makes it the current
    /// error.
    pub fn record<E>(&self, error: E)
    where
        E: Error + Send + Sync + 'static,
    {
        self.record_shared(Arc::new(error));
    }

    /// Records an already-shared error. Useful when the caller keeps a clone
    /// to compare against the emitted event.
    pub fn record_shared(&self, error: CapturedError) {
        let mut log = self.lock();
        log.history.push(error.clone());
        log.current = Some(error);
    }

    /// Clears the current-error pointer. The history is untouched.
    pub fn clear(&self) {
        self.lock().current = None;
    }

    /// Returns the current error, if one is set.
    pub fn last_error(&self) -> Option<CapturedError> {
        self.lock().current.clone()
    }

    /// Returns every error recorded so far, oldest first.
    pub fn all(&self) -> Vec<CapturedError> {
        self.lock().history.clone()
    }

    /// Resolves the error to attribute to a request that finished with
    /// `status_code`.
    ///
    /// The current error wins when set. When it was cleared but the request
    /// still failed with a server error (status ≥ 500), the last recorded
    /// error is attributed instead; clearing the pointer does not erase the
    /// history. Below 500 with no current error, there is nothing to
    /// attribute.
    pub(crate) fn resolve(&self, status_code: u16) -> Option<CapturedError> {
        let log = self.lock();
        log.current.clone().or_else(|| {
            if status_code >= 500 {
                log.history.last().cloned()
            } else {
                None
            }
        })
    }
}

impl fmt::Display for RequestErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let log = self.lock();
        write!(
            f,
            "{} recorded, current: {}",
            log.history.len(),
            log.current.as_ref().map_or("none".to_owned(), |e| e.to_string())
        )
    }
}
