// Path: crates/telemetry/src/http.rs
//! Serves `/metrics`, `/healthz` and `/readyz` for the mining process.
//!
//! `/readyz` reports 503 until [`set_ready`] is called, which the CLI does once
//! setup validation has passed and the mining loop is about to start.

use axum::{
    body::Bytes,
    error_handling::HandleErrorLayer,
    http::{header::CONTENT_TYPE, HeaderName, StatusCode},
    routing::get,
    Router,
};
use prometheus::{Encoder, TextEncoder};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::{net::SocketAddr, time::Duration};
use tower::{BoxError, ServiceBuilder};
use tower_http::trace::TraceLayer;

static READY: AtomicBool = AtomicBool::new(false);

/// Marks the miner as ready (or not) for `/readyz`.
pub fn set_ready(ready: bool) {
    READY.store(ready, Ordering::SeqCst);
}

async fn metrics_handler() -> ([(HeaderName, String); 1], Bytes) {
    let encoder = TextEncoder::new();
    let mut buf = Vec::with_capacity(1 << 14);
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buf) {
        tracing::error!(target: "telemetry", error = %e, "Failed to encode prometheus metrics");
    }
    (
        [(CONTENT_TYPE, encoder.format_type().to_string())],
        buf.into(),
    )
}

async fn healthz_handler() -> &'static str {
    "OK"
}

async fn readyz_handler() -> (StatusCode, &'static str) {
    if READY.load(Ordering::SeqCst) {
        (StatusCode::OK, "mining")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not mining")
    }
}

async fn handle_service_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "Request timed out".to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unhandled internal error: {}", err),
        )
    }
}

fn router() -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz_handler))
        .route("/readyz", get(readyz_handler))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_service_error))
                .layer(TraceLayer::new_for_http())
                .load_shed()
                .concurrency_limit(8)
                .timeout(Duration::from_secs(2)),
        )
}

/// Serves the endpoints on `addr` until `shutdown` resolves.
pub async fn run_server<F>(addr: SocketAddr, shutdown: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(target: "telemetry", error = %e, %addr, "Failed to bind metrics server");
            return;
        }
    };
    tracing::info!(target: "telemetry", %addr, "metrics server listening");

    let served = axum::serve(listener, router().into_make_service())
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!(target: "telemetry", "metrics server shutting down");
        })
        .await;
    if let Err(e) = served {
        tracing::error!(target: "telemetry", error = %e, "metrics server error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn status_of(path: &str) -> StatusCode {
        router()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_endpoints_and_readiness() {
        assert_eq!(status_of("/healthz").await, StatusCode::OK);
        assert_eq!(status_of("/metrics").await, StatusCode::OK);
        assert_eq!(status_of("/nope").await, StatusCode::NOT_FOUND);

        set_ready(false);
        assert_eq!(status_of("/readyz").await, StatusCode::SERVICE_UNAVAILABLE);
        set_ready(true);
        assert_eq!(status_of("/readyz").await, StatusCode::OK);
        set_ready(false);
    }
}
