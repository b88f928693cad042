//! Process-local market cache with per-entry expiry.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::application::ports::{MarketCacheError, MarketCachePort};
use crate::infrastructure::metrics::{CacheLookup, record_cache_lookup};

#[derive(Debug, Clone)]
struct CachedValue {
    value: String,
    expires_at: Instant,
}

/// In-memory implementation of [`MarketCachePort`].
///
/// Expired entries are dropped lazily on read.
#[derive(Debug, Default)]
pub struct InMemoryMarketCache {
    entries: Mutex<HashMap<String, CachedValue>>,
}

impl InMemoryMarketCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, including ones that have expired but not been read.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True if no entries are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[async_trait]
impl MarketCachePort for InMemoryMarketCache {
    async fn get(&self, key: &str) -> Result<Option<String>, MarketCacheError> {
        let mut entries = self.entries.lock();
        let value = match entries.get(key) {
            Some(cached) if cached.expires_at > Instant::now() => Some(cached.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        };
        drop(entries);

        record_cache_lookup(if value.is_some() {
            CacheLookup::Hit
        } else {
            CacheLookup::Miss
        });
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), MarketCacheError> {
        let expires_at = Instant::now() + ttl;
        self.entries
            .lock()
            .insert(key.to_string(), CachedValue { value, expires_at });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn miss_on_empty() {
        let cache = InMemoryMarketCache::new();
        assert_eq!(cache.get("markets:RETAIL").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_then_get() {
        let cache = InMemoryMarketCache::new();
        cache
            .set("markets:RETAIL", "[]".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.get("markets:RETAIL").await.unwrap().as_deref(), Some("[]"));
        assert_eq!(cache.get("markets:ADMIN").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = InMemoryMarketCache::new();
        cache
            .set("markets:RETAIL", "[]".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(cache.get("markets:RETAIL").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get("markets:RETAIL").await.unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn set_overwrites() {
        let cache = InMemoryMarketCache::new();
        let ttl = Duration::from_secs(60);
        cache.set("k", "a".to_string(), ttl).await.unwrap();
        cache.set("k", "b".to_string(), ttl).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("b"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn zero_ttl_is_immediately_stale() {
        let cache = InMemoryMarketCache::new();
        tokio_test::block_on(async {
            tokio_test::assert_ok!(cache.set("k", "v".to_string(), Duration::ZERO).await);
            assert_eq!(tokio_test::assert_ok!(cache.get("k").await), None);
        });
    }
}
