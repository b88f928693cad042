//! Market listing cache adapters.
//!
//! [`RedisMarketCache`] is used in production. [`InMemoryMarketCache`]
//! backs tests and single-process deployments (`REDIS_ADDR=memory`).
//! [`MarketCacheBackend`] lets the binary pick one at startup.

mod in_memory;
mod redis_cache;

use std::time::Duration;

use async_trait::async_trait;

pub use self::in_memory::InMemoryMarketCache;
pub use self::redis_cache::RedisMarketCache;
use crate::application::ports::{MarketCacheError, MarketCachePort};

/// Cache adapter selected from configuration.
#[derive(Debug)]
pub enum MarketCacheBackend {
    /// Shared Redis instance.
    Redis(RedisMarketCache),
    /// Process-local TTL map.
    InMemory(InMemoryMarketCache),
}

impl MarketCacheBackend {
    /// Short backend name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Redis(_) => "redis",
            Self::InMemory(_) => "memory",
        }
    }
}

#[async_trait]
impl MarketCachePort for MarketCacheBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, MarketCacheError> {
        match self {
            Self::Redis(cache) => cache.get(key).await,
            Self::InMemory(cache) => cache.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), MarketCacheError> {
        match self {
            Self::Redis(cache) => cache.set(key, value, ttl).await,
            Self::InMemory(cache) => cache.set(key, value, ttl).await,
        }
    }
}
