//! Market Cache Port (Driven Port)
//!
//! String key/value store with per-entry expiry, used to hold serialized
//! market listings.

use std::time::Duration;

use async_trait::async_trait;

/// Cache error. Never fatal to a lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketCacheError {
    /// The cache backend could not serve the request.
    #[error("market cache unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// A value could not be encoded or decoded.
    #[error("market cache codec error: {message}")]
    Codec {
        /// Error details.
        message: String,
    },
}

/// Port for the market listing cache.
#[async_trait]
pub trait MarketCachePort: Send + Sync {
    /// Read a value. `Ok(None)` on miss or expiry.
    async fn get(&self, key: &str) -> Result<Option<String>, MarketCacheError>;

    /// Write a value that expires after `ttl`.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), MarketCacheError>;
}
