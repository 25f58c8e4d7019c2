//! Health and metrics HTTP surface.
//!
//! - `GET /health` returns the dispatch counters as JSON
//! - `GET /metrics` returns the Prometheus text exposition

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use mb_03_reply_dispatch::{DispatchStats, HealthSnapshot};
use reply_telemetry::{encode_metrics, metrics_content_type};
use tokio::sync::watch;
use tracing::info;

#[derive(Clone)]
struct HealthState {
    stats: Arc<DispatchStats>,
    chain: Arc<str>,
}

/// Build the router.
pub fn router(stats: Arc<DispatchStats>, chain: &str) -> Router {
    let state = HealthState {
        stats,
        chain: Arc::from(chain),
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Serve `router` on `addr` until `shutdown` turns true or its sender drops.
pub async fn serve(
    addr: SocketAddr,
    router: Router,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "[runtime] Health server listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await
}

async fn health_check(State(state): State<HealthState>) -> Json<HealthSnapshot> {
    Json(state.stats.snapshot(&state.chain))
}

async fn metrics() -> Response {
    match encode_metrics() {
        Ok(body) => ([(header::CONTENT_TYPE, metrics_content_type())], body).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
