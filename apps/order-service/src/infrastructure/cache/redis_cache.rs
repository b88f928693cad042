//! Redis-backed market cache.
//!
//! Values are written with `SET key value EX ttl`, so expiry is enforced
//! by the server.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::info;

use crate::application::ports::{MarketCacheError, MarketCachePort};
use crate::infrastructure::metrics::{CacheLookup, record_cache_lookup};

/// Redis implementation of [`MarketCachePort`].
///
/// The connection manager reconnects transparently; clones share the
/// same underlying multiplexed connection.
#[derive(Clone)]
pub struct RedisMarketCache {
    connection: ConnectionManager,
    addr: String,
}

impl RedisMarketCache {
    /// Connect to `addr` (a `redis://` URL).
    pub async fn connect(addr: &str) -> Result<Self, MarketCacheError> {
        let client = redis::Client::open(addr).map_err(unavailable)?;
        let connection = ConnectionManager::new(client).await.map_err(unavailable)?;
        info!(%addr, "Connected to Redis market cache");
        Ok(Self {
            connection,
            addr: addr.to_string(),
        })
    }
}

impl fmt::Debug for RedisMarketCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisMarketCache")
            .field("addr", &self.addr)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MarketCachePort for RedisMarketCache {
    async fn get(&self, key: &str) -> Result<Option<String>, MarketCacheError> {
        let mut connection = self.connection.clone();
        let result: Result<Option<String>, _> = connection.get(key).await;
        match result {
            Ok(Some(value)) => {
                record_cache_lookup(CacheLookup::Hit);
                Ok(Some(value))
            }
            Ok(None) => {
                record_cache_lookup(CacheLookup::Miss);
                Ok(None)
            }
            Err(e) => {
                record_cache_lookup(CacheLookup::Error);
                Err(unavailable(e))
            }
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), MarketCacheError> {
        let mut connection = self.connection.clone();
        // EX 0 is rejected by the server.
        let seconds = ttl.as_secs().max(1);
        connection
            .set_ex::<_, _, ()>(key, value, seconds)
            .await
            .map_err(unavailable)
    }
}

fn unavailable(err: redis::RedisError) -> MarketCacheError {
    MarketCacheError::Unavailable {
        message: err.to_string(),
    }
}
