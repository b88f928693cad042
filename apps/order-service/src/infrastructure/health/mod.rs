//! Health Check and Metrics Endpoint
//!
//! HTTP endpoint for health checks and Prometheus metrics. Used by
//! container orchestrators, load balancers, and monitoring systems.
//!
//! # Endpoints
//!
//! - `GET /health` - Returns JSON health status
//! - `GET /healthz` - Kubernetes liveness check (simple OK)
//! - `GET /readyz` - Kubernetes readiness check (fails once shutdown starts)
//! - `GET /metrics` - Prometheus metrics in text format

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Instant;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::domain::order::OrderRepository;
use crate::infrastructure::metrics::get_metrics_handle;

// =============================================================================
// Health Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: HealthStatus,
    /// Service version.
    pub version: String,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
    /// Current time.
    pub current_time: DateTime<Utc>,
    /// Number of stored orders.
    pub orders: usize,
    /// Open status streams.
    pub stream_subscribers: i32,
}

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Serving requests.
    Healthy,
    /// Shutdown in progress.
    Draining,
}

// =============================================================================
// Health Server State
// =============================================================================

/// Shared state for the health server.
pub struct HealthServerState {
    version: String,
    started_at: Instant,
    orders: Arc<dyn OrderRepository>,
    subscribers: Arc<AtomicI32>,
    shutdown: CancellationToken,
}

impl HealthServerState {
    /// Create new health server state.
    #[must_use]
    pub fn new(
        version: String,
        orders: Arc<dyn OrderRepository>,
        subscribers: Arc<AtomicI32>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            version,
            started_at: Instant::now(),
            orders,
            subscribers,
            shutdown,
        }
    }

    fn status(&self) -> HealthStatus {
        if self.shutdown.is_cancelled() {
            HealthStatus::Draining
        } else {
            HealthStatus::Healthy
        }
    }
}

// =============================================================================
// Health Server
// =============================================================================

/// Health check HTTP server.
pub struct HealthServer {
    addr: SocketAddr,
    state: Arc<HealthServerState>,
    cancel: CancellationToken,
}

impl HealthServer {
    /// Create a new health server.
    #[must_use]
    pub const fn new(
        addr: SocketAddr,
        state: Arc<HealthServerState>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            addr,
            state,
            cancel,
        }
    }

    /// Bind the configured address and serve until cancelled.
    pub async fn run(self) -> Result<(), HealthServerError> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| HealthServerError::BindFailed(self.addr, e.to_string()))?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until cancelled.
    pub async fn serve(self, listener: TcpListener) -> Result<(), HealthServerError> {
        let local_addr = listener.local_addr().unwrap_or(self.addr);
        tracing::info!(addr = %local_addr, "Health server listening");

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| HealthServerError::ServerFailed(e.to_string()))?;

        tracing::info!("Health server stopped");
        Ok(())
    }
}

fn router(state: Arc<HealthServerState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/healthz", get(liveness_handler))
        .route("/readyz", get(readiness_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

// =============================================================================
// HTTP Handlers
// =============================================================================

async fn health_handler(State(state): State<Arc<HealthServerState>>) -> impl IntoResponse {
    let response = build_health_response(&state);
    let status_code = match response.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Draining => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(response))
}

async fn liveness_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn readiness_handler(State(state): State<Arc<HealthServerState>>) -> impl IntoResponse {
    match state.status() {
        HealthStatus::Healthy => (StatusCode::OK, "READY"),
        HealthStatus::Draining => (StatusCode::SERVICE_UNAVAILABLE, "NOT READY"),
    }
}

async fn metrics_handler() -> impl IntoResponse {
    get_metrics_handle().map_or_else(
        || {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain")],
                "Metrics not initialized".to_string(),
            )
        },
        |handle| {
            let body = handle.render();
            (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                body,
            )
        },
    )
}

fn build_health_response(state: &HealthServerState) -> HealthResponse {
    HealthResponse {
        status: state.status(),
        version: state.version.clone(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        current_time: Utc::now(),
        orders: state.orders.len(),
        stream_subscribers: state.subscribers.load(Ordering::Relaxed),
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Health server errors.
#[derive(Debug, thiserror::Error)]
pub enum HealthServerError {
    /// Failed to bind the listen address.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(SocketAddr, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    use super::*;
    use crate::domain::order::{NewOrder, OrderType};
    use crate::domain::shared::{MarketId, UserId};
    use crate::infrastructure::persistence::InMemoryOrderStore;

    fn state_with_orders(count: usize, shutdown: CancellationToken) -> HealthServerState {
        let store = InMemoryOrderStore::new();
        for _ in 0..count {
            let order = NewOrder::new(
                UserId::generate(),
                MarketId::parse("m1").unwrap(),
                OrderType::Market,
                Decimal::ZERO,
                Decimal::ONE,
            )
            .unwrap();
            store.create(order).unwrap();
        }
        HealthServerState::new(
            "1.2.3".to_string(),
            Arc::new(store),
            Arc::new(AtomicI32::new(2)),
            shutdown,
        )
    }

    async fn get(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request =
            format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[test]
    fn health_status_serialization() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Healthy).unwrap(),
            "\"healthy\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Draining).unwrap(),
            "\"draining\""
        );
    }

    #[test]
    fn response_reports_store_and_subscribers() {
        let state = state_with_orders(3, CancellationToken::new());
        let response = build_health_response(&state);

        assert_eq!(response.status, HealthStatus::Healthy);
        assert_eq!(response.version, "1.2.3");
        assert_eq!(response.orders, 3);
        assert_eq!(response.stream_subscribers, 2);
    }

    #[test]
    fn cancelled_token_means_draining() {
        let shutdown = CancellationToken::new();
        let state = state_with_orders(0, shutdown.clone());
        shutdown.cancel();

        assert_eq!(build_health_response(&state).status, HealthStatus::Draining);
    }

    #[tokio::test]
    async fn serves_health_routes_until_cancelled() {
        let cancel = CancellationToken::new();
        let state = Arc::new(state_with_orders(1, CancellationToken::new()));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = HealthServer::new(addr, state, cancel.clone());
        let handle = tokio::spawn(server.serve(listener));

        let liveness = get(addr, "/healthz").await;
        assert!(liveness.starts_with("HTTP/1.1 200"));
        assert!(liveness.ends_with("OK"));

        let readiness = get(addr, "/readyz").await;
        assert!(readiness.ends_with("READY"));

        let health = get(addr, "/health").await;
        assert!(health.contains("\"orders\":1"));
        assert!(health.contains("\"status\":\"healthy\""));

        cancel.cancel();
        handle.await.unwrap().unwrap();
    }
}
