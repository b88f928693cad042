//! Order Service Binary
//!
//! Starts the order intake gRPC server and its health endpoint.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin order-service
//! ```
//!
//! # Environment Variables
//!
//! - `ORDER_SERVICE_GRPC_ADDR`: gRPC listen address (default: 0.0.0.0:50051)
//! - `ORDER_SERVICE_HTTP_ADDR`: health/metrics listen address (default: 0.0.0.0:2113)
//! - `SPOT_INSTRUMENT_ADDR`: market directory endpoint (default: <http://localhost:50052>)
//! - `MARKET_DIRECTORY_TIMEOUT_MS`: directory lookup timeout (default: 5000)
//! - `REDIS_ADDR`: market cache URL, or `memory` (default: redis://localhost:6379)
//! - `MARKET_CACHE_TTL_SECS`: market cache TTL (default: 60)
//! - `ORDER_STREAM_POLL_INTERVAL_MS`: status stream tick (default: 5000)
//! - `OTEL_ENABLED`: Enable OpenTelemetry (default: true)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4317>)
//! - `OTEL_SERVICE_NAME`: Service name (default: order-service)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use order_service::infrastructure::telemetry;
use order_service::{
    CacheTarget, GrpcMarketDirectory, HealthServer, HealthServerState, InMemoryMarketCache,
    InMemoryOrderStore, MarketCacheBackend, MarketCacheGateway, OrderOrchestrator,
    OrderServiceAdapter, RedisMarketCache, ServiceConfig, StatusStreamLoop, init_metrics,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_dotenv();

    // Initialize telemetry (OpenTelemetry + tracing)
    let _telemetry_guard = telemetry::init()?;

    tracing::info!("Starting Order Service");

    // Initialize Prometheus metrics
    if let Err(e) = init_metrics() {
        tracing::warn!(error = %e, "Prometheus recorder unavailable, metrics disabled");
    }

    let config = ServiceConfig::from_env()?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    let store = Arc::new(InMemoryOrderStore::new());

    let cache = match &config.cache.target {
        CacheTarget::Redis(addr) => {
            MarketCacheBackend::Redis(RedisMarketCache::connect(addr).await?)
        }
        CacheTarget::InMemory => MarketCacheBackend::InMemory(InMemoryMarketCache::new()),
    };
    tracing::info!(backend = cache.name(), "Market cache ready");

    let directory = GrpcMarketDirectory::connect_lazy(&config.directory.endpoint)?;

    let gateway = MarketCacheGateway::new(Arc::new(directory), Arc::new(cache))
        .with_ttl(config.cache.ttl)
        .with_lookup_timeout(config.directory.lookup_timeout);
    let orchestrator = Arc::new(OrderOrchestrator::new(Arc::clone(&store), gateway));
    let stream_loop = Arc::new(StatusStreamLoop::new(
        Arc::clone(&store),
        config.stream.poll_interval,
    ));
    let adapter = OrderServiceAdapter::new(orchestrator, stream_loop, shutdown_token.clone());

    // Spawn health server
    let health_state = Arc::new(HealthServerState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        store,
        adapter.subscriber_counter(),
        shutdown_token.clone(),
    ));
    let health_server = HealthServer::new(
        config.server.http_addr,
        health_state,
        shutdown_token.clone(),
    );
    tokio::spawn(async move {
        if let Err(e) = health_server.run().await {
            tracing::error!(error = %e, "Health server error");
        }
    });

    tokio::spawn(await_shutdown(shutdown_token.clone()));

    let grpc_addr = config.server.grpc_addr;
    tracing::info!(addr = %grpc_addr, "gRPC server listening");
    Server::builder()
        .add_service(adapter.into_service())
        .serve_with_shutdown(grpc_addr, shutdown_token.cancelled_owned())
        .await?;

    tracing::info!("Order service stopped");
    Ok(())
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Log the parsed configuration.
fn log_config(config: &ServiceConfig) {
    let cache = match &config.cache.target {
        CacheTarget::Redis(addr) => addr.as_str(),
        CacheTarget::InMemory => "memory",
    };
    tracing::info!(
        grpc_addr = %config.server.grpc_addr,
        http_addr = %config.server.http_addr,
        directory = %config.directory.endpoint,
        cache,
        "Configuration loaded"
    );
    tracing::debug!(
        lookup_timeout_ms = config.directory.lookup_timeout.as_millis(),
        cache_ttl_secs = config.cache.ttl.as_secs(),
        poll_interval_ms = config.stream.poll_interval.as_millis(),
        "Tuning"
    );
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();
    tracing::info!("Graceful shutdown started");
}
