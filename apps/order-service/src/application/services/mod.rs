//! Application Services

mod market_gateway;
mod order_orchestrator;
mod status_stream;

pub use market_gateway::{DEFAULT_LOOKUP_TIMEOUT, DEFAULT_MARKET_CACHE_TTL, MarketCacheGateway};
pub use order_orchestrator::OrderOrchestrator;
pub use status_stream::{DEFAULT_POLL_INTERVAL, StatusStreamItem, StatusStreamLoop};
