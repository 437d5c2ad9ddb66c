use std::net::SocketAddr;

use anyhow::Context;
use axum::{Json, Router, routing::get};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
    })
}

/// Liveness routes for the hosting platform.
pub fn router() -> Router {
    Router::new()
        .route("/", get(|| async { "matchscout is running" }))
        .route("/healthz", get(health_check))
        .layer(TraceLayer::new_for_http())
}

/// Claim the liveness port.
pub async fn bind(addr: SocketAddr) -> anyhow::Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind liveness server to {addr}"))?;
    info!("Liveness server listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Serve [`router`] on `listener` until `shutdown` is cancelled.
pub async fn serve(listener: TcpListener, shutdown: CancellationToken) -> anyhow::Result<()> {
    axum::serve(listener, router())
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    Ok(())
}
