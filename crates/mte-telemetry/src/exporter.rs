//! Prometheus text exposition over HTTP.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use prometheus::{Encoder, TextEncoder};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::TelemetryResult;

/// Create the exporter router.
pub fn create_router() -> Router {
    Router::new().route("/metrics", get(serve_metrics))
}

async fn serve_metrics() -> Response {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }
    (
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response()
}

/// Serve `/metrics` on an already-bound listener until `shutdown` fires.
pub async fn serve_exporter(
    listener: TcpListener,
    shutdown: CancellationToken,
) -> TelemetryResult<()> {
    axum::serve(listener, create_router())
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    Ok(())
}

/// Bind `0.0.0.0:port` and serve `/metrics` until `shutdown` fires.
pub async fn run_exporter(port: u16, shutdown: CancellationToken) -> TelemetryResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(port, "Starting metrics exporter");
    serve_exporter(listener, shutdown).await
}
