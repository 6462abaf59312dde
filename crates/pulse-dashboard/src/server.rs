//! HTTP server implementation using axum.

use crate::config::DashboardConfig;
use crate::state::DashboardContext;
use crate::types::{HealthResponse, PingResponse, StatusResponse};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use prometheus::{Encoder, TextEncoder};
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Create the axum router.
pub fn create_router(context: DashboardContext) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/status", get(get_status))
        .route("/health", get(get_health))
        .route("/healthz", get(get_healthz))
        .route("/ping", get(get_ping))
        .route("/metrics", get(get_metrics))
        .with_state(context)
}

/// Serve the index HTML page.
async fn serve_index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

/// Full status document.
async fn get_status(State(context): State<DashboardContext>) -> Json<StatusResponse> {
    Json(context.collect_status())
}

/// Health by connected flag: 200 when any connection streams, 503
/// otherwise.
async fn get_health(State(context): State<DashboardContext>) -> impl IntoResponse {
    let connected = context.status.streaming_count() > 0;
    let (code, status) = if connected {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };
    (code, Json(HealthResponse { status, connected }))
}

/// Liveness probe.
async fn get_healthz() -> &'static str {
    "OK"
}

async fn get_ping() -> Json<PingResponse> {
    Json(PingResponse {
        message: "pong",
        timestamp: Utc::now(),
    })
}

/// Prometheus exposition.
async fn get_metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&families, &mut buffer) {
        warn!(%e, "Failed to encode metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, String::new()).into_response();
    }
    (
        [(axum::http::header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response()
}

/// Run the dashboard HTTP server until cancelled.
pub async fn run_server(
    context: DashboardContext,
    config: DashboardConfig,
    shutdown: CancellationToken,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(context);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(port = config.port, "Starting dashboard server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    info!("Dashboard server stopped");
    Ok(())
}
