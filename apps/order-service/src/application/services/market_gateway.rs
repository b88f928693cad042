//! Market Cache Gateway
//!
//! Cache-aside lookup of the market listing for a role. The cache read
//! and write are independent best-effort steps; only the remote lookup
//! can fail the call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::application::ports::{MarketCachePort, MarketDirectoryError, MarketDirectoryPort};
use crate::domain::market::{MarketListing, UserRole};
use crate::error::OrderServiceError;

/// Default cache entry lifetime.
pub const DEFAULT_MARKET_CACHE_TTL: Duration = Duration::from_secs(60);

/// Default bound on a single remote lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Cache-aside wrapper around the market directory.
pub struct MarketCacheGateway<D, C>
where
    D: MarketDirectoryPort,
    C: MarketCachePort,
{
    directory: Arc<D>,
    cache: Arc<C>,
    ttl: Duration,
    lookup_timeout: Duration,
}

impl<D, C> MarketCacheGateway<D, C>
where
    D: MarketDirectoryPort,
    C: MarketCachePort,
{
    /// Create a gateway with the default TTL and lookup timeout.
    pub fn new(directory: Arc<D>, cache: Arc<C>) -> Self {
        Self {
            directory,
            cache,
            ttl: DEFAULT_MARKET_CACHE_TTL,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    /// Override the cache entry lifetime.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Override the remote lookup timeout.
    #[must_use]
    pub const fn with_lookup_timeout(mut self, lookup_timeout: Duration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self
    }

    /// Markets visible to `role`, from the cache when possible.
    ///
    /// # Errors
    ///
    /// [`OrderServiceError::UpstreamUnavailable`] if the cache cannot
    /// answer and the directory lookup fails or times out, and
    /// [`OrderServiceError::Cancelled`] if `cancel` fires first.
    pub async fn markets_for(
        &self,
        role: UserRole,
        cancel: &CancellationToken,
    ) -> Result<MarketListing, OrderServiceError> {
        let key = role.cache_key();

        match until_cancelled(cancel, self.cache.get(&key)).await? {
            Ok(Some(blob)) => match serde_json::from_str::<MarketListing>(&blob) {
                Ok(listing) => {
                    debug!(%role, markets = listing.len(), "Market listing served from cache");
                    return Ok(listing);
                }
                Err(e) => warn!(%key, error = %e, "Discarding undecodable cached market listing"),
            },
            Ok(None) => debug!(%role, "Market listing cache miss"),
            Err(e) => warn!(%key, error = %e, "Market cache read failed"),
        }

        let listing = until_cancelled(cancel, self.fetch(role)).await??;
        self.store(&key, &listing, cancel).await?;
        Ok(listing)
    }

    async fn fetch(&self, role: UserRole) -> Result<MarketListing, MarketDirectoryError> {
        let listing = tokio::time::timeout(self.lookup_timeout, self.directory.view_markets(role))
            .await
            .map_err(|_| MarketDirectoryError::Timeout {
                timeout_ms: u64::try_from(self.lookup_timeout.as_millis()).unwrap_or(u64::MAX),
            })?
            .inspect_err(|e| warn!(%role, error = %e, "Market directory lookup failed"))?;

        debug!(%role, markets = listing.len(), "Market listing fetched from directory");
        Ok(listing)
    }

    async fn store(
        &self,
        key: &str,
        listing: &MarketListing,
        cancel: &CancellationToken,
    ) -> Result<(), OrderServiceError> {
        let blob = match serde_json::to_string(listing) {
            Ok(blob) => blob,
            Err(e) => {
                warn!(%key, error = %e, "Failed to encode market listing for cache");
                return Ok(());
            }
        };

        if let Err(e) = until_cancelled(cancel, self.cache.set(key, blob, self.ttl)).await? {
            warn!(%key, error = %e, "Market cache write failed");
        }
        Ok(())
    }
}

async fn until_cancelled<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<F::Output, OrderServiceError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(OrderServiceError::Cancelled),
        out = fut => Ok(out),
    }
}
