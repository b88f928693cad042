#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::too_many_lines,
        clippy::significant_drop_tightening,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Order Service - Order Intake Microservice
//!
//! A gRPC service that accepts orders, validates the target market
//! against the spot instrument directory (through a cache-aside
//! gateway), keeps orders in memory, and streams status changes to
//! subscribers.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Order aggregate, identifiers, market listing
//!   - `order`: Order, status machine values, repository trait
//!   - `market`: User roles and market listings
//!   - `shared`: Typed identifiers
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: Market directory and market cache interfaces
//!   - `services`: Order orchestrator, market cache gateway, status stream loop
//!   - `dto`: Data transfer objects
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `grpc`: `orders.v1.OrderService` server adapter
//!   - `market_directory`: `spot_instrument.v1` client
//!   - `cache`: Redis and in-memory market caches
//!   - `persistence`: In-memory order store
//!   - `config`, `health`, `metrics`, `telemetry`
//!
//! # Request Flow
//!
//! ```text
//! CreateOrder ──► Orchestrator ──► MarketCacheGateway ──► cache ──► (miss) directory
//!                      │
//!                      └──► OrderRepository ◄── StatusStreamLoop ──► StreamOrderUpdates
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core business logic with no transport dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

/// Service-wide error type and gRPC status mapping.
pub mod error;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::market::{Market, MarketListing, UserRole};
pub use domain::order::{NewOrder, Order, OrderRepository, OrderStatus, OrderType, StoreError};
pub use domain::shared::{MarketId, OrderId, UserId};

// Application services
pub use application::services::{MarketCacheGateway, OrderOrchestrator, StatusStreamLoop};

// Errors
pub use error::{ErrorCode, OrderServiceError};

// Infrastructure config
pub use infrastructure::config::{CacheTarget, ConfigError, ServiceConfig};

// Health server
pub use infrastructure::health::{HealthServer, HealthServerError, HealthServerState};

// gRPC (for integration tests)
pub use infrastructure::grpc::{OrderServiceAdapter, proto};

// Adapters
pub use infrastructure::cache::{InMemoryMarketCache, MarketCacheBackend, RedisMarketCache};
pub use infrastructure::market_directory::GrpcMarketDirectory;
pub use infrastructure::persistence::InMemoryOrderStore;

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
