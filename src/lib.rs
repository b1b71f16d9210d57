//! # Turnstile
//!
//! An Axum middleware that emits one structured summary event per HTTP
//! request — method, raw URL, status code and elapsed milliseconds — with
//! policy-driven capture of submitted form data and redaction of sensitive
//! fields.
//!
//! ## Features
//!
//! - **One event per request**: a single summary at request end, logged as
//!   `Error` for failed requests and at a configurable level otherwise
//! - **Runtime-adjustable policy**: enable/disable, severity, exclusion
//!   filters, form capture and the emission target can all change while
//!   requests are in flight, without tearing
//! - **Form-data capture with redaction**: urlencoded bodies are
//!   snapshotted eagerly, preserved for the inner service, and attached to
//!   events with sensitive values masked
//! - **Error attribution**: handlers record errors against the request;
//!   a server error is attributed to the last recorded error even when the
//!   current one was cleared
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::{routing::get, Router};
//! use tower::ServiceBuilder;
//! use turnstile::{FormDataPolicy, RequestLogLayer, RequestLogging};
//!
//! async fn hello() -> &'static str {
//!     "Hello, World!"
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     tracing_subscriber::fmt().init();
//!
//!     let logging = Arc::new(RequestLogging::new());
//!     logging.set_form_data_policy(FormDataPolicy::always());
//!     logging.set_exclusion_filter(|req| req.raw_url.starts_with("/health"));
//!
//!     let app = Router::new()
//!         .route("/hello", get(hello))
//!         .layer(ServiceBuilder::new().layer(RequestLogLayer::new(logging.clone())));
//!
//!     // `logging` stays available for runtime adjustments while serving.
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```
//!
//! ## Recording errors
//!
//! While logging is enabled, every request carries a [`RequestErrors`]
//! handle in its extensions. Handlers record errors they encounter; the
//! middleware resolves at request end which one, if any, to attach to the
//! emitted event:
//!
//! ```rust
//! use axum::{http::StatusCode, Extension};
//! use turnstile::RequestErrors;
//!
//! async fn flaky(errors: Option<Extension<RequestErrors>>) -> StatusCode {
//!     if let Some(Extension(errors)) = errors {
//!         errors.record(std::io::Error::other("upstream timed out"));
//!     }
//!     StatusCode::BAD_GATEWAY
//! }
//! ```
//!
//! ## Custom emission targets
//!
//! Events go through a single [`EventSink`] — [`TracingSink`] by default.
//! Install an override with [`RequestLogging::set_logger`] and restore the
//! default with [`RequestLogging::reset_logger`]; exactly one target is
//! active at a time.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::body::Body;
use axum::extract::Request;
use axum::response::Response;
use tower::{Layer, Service};
use tracing::debug;

pub mod config;
pub mod errors;
mod form;
pub mod level;
pub mod policy;
pub mod redact;
pub mod sink;
pub mod types;

pub use config::{PolicySnapshot, RequestLogging};
pub use errors::{CapturedError, RequestErrors};
pub use level::{Level, LevelSwitch};
pub use policy::FormDataPolicy;
pub use redact::{redact_fields, DEFAULT_BLACKLIST, MASK};
pub use sink::{EventSink, TracingSink};
pub use types::{FormField, RequestInfo, RequestPredicate, RequestSummary, MESSAGE_TEMPLATE};

/// Tower layer that instruments each request with summary logging.
///
/// This is the main entry point. It holds a shared [`RequestLogging`]
/// handle; the same handle can keep being used to adjust the policy while
/// the server runs.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use axum::{routing::get, Router};
/// use turnstile::{RequestLogLayer, RequestLogging};
///
/// # async fn hello() -> &'static str { "Hello" }
/// let logging = Arc::new(RequestLogging::new());
/// let app: Router = Router::new()
///     .route("/hello", get(hello))
///     .layer(RequestLogLayer::new(logging));
/// ```
#[derive(Clone)]
pub struct RequestLogLayer {
    logging: Arc<RequestLogging>,
}

impl RequestLogLayer {
    /// Creates a layer backed by the given policy engine.
    pub fn new(logging: Arc<RequestLogging>) -> Self {
        Self { logging }
    }
}

impl<S> Layer<S> for RequestLogLayer {
    type Service = RequestLogService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLogService {
            inner,
            logging: self.logging.clone(),
        }
    }
}

/// Tower service produced by [`RequestLogLayer`].
///
/// Wraps the inner service and drives the request lifecycle: start the
/// timer and snapshot the form body at begin, resolve status and error at
/// end, apply the active policy, and emit at most one event. Inner-service
/// errors pass through untouched and produce no event.
#[derive(Clone)]
pub struct RequestLogService<S> {
    inner: S,
    logging: Arc<RequestLogging>,
}

impl<S> Service<Request> for RequestLogService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future =
        Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request) -> Self::Future {
        let logging = self.logging.clone();

        // Take the ready service and leave the clone behind, so the future
        // is not tied to `self`.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let begin = logging.snapshot();
            if !begin.enabled {
                // Disabled short-circuits before any timer or body work.
                return inner.call(request).await;
            }

            let start = Instant::now();
            let method = request.method().to_string();
            let raw_url = request.uri().to_string();
            debug!(method = %method, raw_url = %raw_url, "request instrumentation started");

            let errors = RequestErrors::new();
            request.extensions_mut().insert(errors.clone());

            // The body is gone once the inner service reads it, so a policy
            // that may need form data must snapshot it now.
            let mut form_snapshot: Vec<FormField> = Vec::new();
            if begin.form_data.wants_capture() && form::is_form_request(&request) {
                let body = std::mem::replace(request.body_mut(), Body::empty());
                let (restored, fields) = form::snapshot_form(body).await;
                *request.body_mut() = restored;
                debug!(fields = fields.len(), "form body snapshotted");
                form_snapshot = fields;
            }

            let response = inner.call(request).await?;

            // Emission decisions run against the configuration active now,
            // not the one seen at begin.
            let end = logging.snapshot();
            let status_code = response.status().as_u16();
            let info = RequestInfo {
                method,
                raw_url,
                status_code,
            };

            if let Some(filter) = &end.exclusion_filter {
                if filter(&info) {
                    return Ok(response);
                }
            }
            if !end.enabled {
                return Ok(response);
            }

            let elapsed_ms = start.elapsed().as_millis() as u64;
            let error = errors.resolve(status_code);
            let level = if status_code >= 500 || error.is_some() {
                Level::Error
            } else {
                end.request_level
            };
            let form_data = end.form_data.apply(&info, end.logger.as_ref(), form_snapshot);

            let event = RequestSummary {
                level,
                method: info.method,
                raw_url: info.raw_url,
                status_code,
                elapsed_ms,
                error,
                form_data,
            };
            // The sink applies its own threshold and failures stay on its
            // side of the seam.
            end.logger.emit(&event);

            Ok(response)
        })
    }
}
