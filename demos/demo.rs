use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Form, Json, Router,
};
use serde::Deserialize;
use std::{io, sync::Arc, time::Duration};
use tokio::{net::TcpListener, time::sleep};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, Level as TracingLevel};
use turnstile::{FormDataPolicy, Level, RequestErrors, RequestLogLayer, RequestLogging};

#[derive(Debug, Deserialize)]
struct LoginForm {
    username: String,
    #[allow(dead_code)]
    password: String,
}

// Demo server handlers

async fn hello_handler() -> impl IntoResponse {
    sleep(Duration::from_millis(100)).await; // Simulate some work
    "Hello, World!"
}

async fn login_handler(Form(login): Form<LoginForm>) -> impl IntoResponse {
    sleep(Duration::from_millis(50)).await;
    format!("Welcome, {}!", login.username)
}

async fn fail_handler(errors: Option<Extension<RequestErrors>>) -> impl IntoResponse {
    if let Some(Extension(errors)) = errors {
        errors.record(io::Error::other("demo failure: upstream unreachable"));
    }
    StatusCode::BAD_GATEWAY
}

async fn health_handler() -> impl IntoResponse {
    "ok"
}

// Admin handlers showing runtime reconfiguration

async fn disable_handler(State(logging): State<Arc<RequestLogging>>) -> impl IntoResponse {
    logging.disable();
    "request logging disabled"
}

async fn enable_handler(State(logging): State<Arc<RequestLogging>>) -> impl IntoResponse {
    logging.enable();
    "request logging enabled"
}

async fn verbose_handler(State(logging): State<Arc<RequestLogging>>) -> impl IntoResponse {
    logging.set_request_level(Level::Debug);
    "request summaries now at Debug"
}

async fn config_handler(State(logging): State<Arc<RequestLogging>>) -> impl IntoResponse {
    let config = logging.snapshot();
    Json(serde_json::json!({
        "enabled": config.enabled,
        "request_level": config.request_level.to_string(),
        "form_data": format!("{:?}", config.form_data),
    }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(TracingLevel::DEBUG)
        .init();

    info!("Starting request logging demo server");

    let logging = Arc::new(RequestLogging::new());
    logging.set_form_data_policy(FormDataPolicy::always().at_level(Level::Information));
    logging.set_exclusion_filter(|req| req.raw_url.starts_with("/health"));

    let app = Router::new()
        .route("/hello", get(hello_handler))
        .route("/login", post(login_handler))
        .route("/fail", get(fail_handler))
        .route("/health", get(health_handler))
        .route("/admin/disable", post(disable_handler))
        .route("/admin/enable", post(enable_handler))
        .route("/admin/verbose", post(verbose_handler))
        .route("/admin/config", get(config_handler))
        .with_state(logging.clone())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestLogLayer::new(logging)),
        );

    info!("Demo server endpoints:");
    info!("  GET  /hello          - Simple greeting");
    info!("  POST /login          - Form submission (password is redacted in the log)");
    info!("  GET  /fail           - Failing request with a recorded error");
    info!("  GET  /health         - Excluded from request logging");
    info!("  POST /admin/disable  - Turn request logging off at runtime");
    info!("  POST /admin/enable   - Turn it back on");
    info!("  POST /admin/verbose  - Log summaries at Debug");
    info!("  GET  /admin/config   - Show the active configuration");
    info!("");
    info!("Try these commands:");
    info!("  curl http://localhost:3000/hello");
    info!("  curl -X POST -d 'username=amy&password=hunter2' http://localhost:3000/login");
    info!("  curl http://localhost:3000/fail");
    info!("  curl -X POST http://localhost:3000/admin/disable");

    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    info!("Demo server listening on http://localhost:3000");

    axum::serve(listener, app).await?;

    Ok(())
}
