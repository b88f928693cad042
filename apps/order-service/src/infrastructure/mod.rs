//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application and domain layers, plus the process plumbing
//! around them.

/// Market listing cache adapters (Redis, in-memory).
pub mod cache;

/// Configuration loaded from the environment.
pub mod config;

/// gRPC server adapter, interceptor and protobuf conversions.
pub mod grpc;

/// Health check HTTP endpoint.
pub mod health;

/// Remote market directory client.
pub mod market_directory;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Order storage adapters.
pub mod persistence;

/// OpenTelemetry tracing integration.
pub mod telemetry;
