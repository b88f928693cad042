//! Application Ports (Driven)
//!
//! Interfaces for the external systems the service depends on. The
//! infrastructure layer provides the implementations.

mod market_cache_port;
mod market_directory_port;

pub use market_cache_port::{MarketCacheError, MarketCachePort};
pub use market_directory_port::{MarketDirectoryError, MarketDirectoryPort};
