//! Domain Layer - Orders, markets and identifiers.
//!
//! Pure types with no knowledge of gRPC, caches or the runtime. The
//! order repository trait lives here so that the store's contract is
//! owned by the domain rather than by its in-memory adapter.

/// Shared value objects (strongly-typed identifiers).
pub mod shared;

/// Order aggregate, lifecycle status and repository contract.
pub mod order;

/// Markets as published by the spot instrument directory.
pub mod market;
