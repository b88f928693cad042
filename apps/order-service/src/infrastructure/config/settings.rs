//! Service Configuration Settings
//!
//! Configuration types for the order service, loaded from environment
//! variables. Numeric values that fail to parse fall back to their
//! defaults; listen addresses must parse or startup fails.

use std::net::SocketAddr;
use std::time::Duration;

/// Value of `REDIS_ADDR` that selects the in-process cache.
const IN_MEMORY_CACHE: &str = "memory";

/// Network listener configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// gRPC listen address.
    pub grpc_addr: SocketAddr,
    /// Health and metrics HTTP listen address.
    pub http_addr: SocketAddr,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            grpc_addr: SocketAddr::from(([0, 0, 0, 0], 50051)),
            http_addr: SocketAddr::from(([0, 0, 0, 0], 2113)),
        }
    }
}

/// Remote market directory configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketDirectorySettings {
    /// Spot instrument service endpoint.
    pub endpoint: String,
    /// Deadline for a single `ViewMarkets` call.
    pub lookup_timeout: Duration,
}

impl Default for MarketDirectorySettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:50052".to_string(),
            lookup_timeout: Duration::from_millis(5000),
        }
    }
}

/// Where market listings are cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheTarget {
    /// Redis server at the given URL.
    Redis(String),
    /// Process-local map.
    InMemory,
}

impl CacheTarget {
    /// Parse a `REDIS_ADDR` value.
    #[must_use]
    pub fn from_addr(addr: &str) -> Self {
        let addr = addr.trim();
        if addr.eq_ignore_ascii_case(IN_MEMORY_CACHE) {
            Self::InMemory
        } else {
            Self::Redis(addr.to_string())
        }
    }
}

/// Market listing cache configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    /// Backing store.
    pub target: CacheTarget,
    /// Entry time-to-live.
    pub ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            target: CacheTarget::Redis("redis://localhost:6379".to_string()),
            ttl: Duration::from_secs(60),
        }
    }
}

/// Status streaming configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSettings {
    /// Interval between change scans.
    pub poll_interval: Duration,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(5000),
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Listener settings.
    pub server: ServerSettings,
    /// Market directory settings.
    pub directory: MarketDirectorySettings,
    /// Cache settings.
    pub cache: CacheSettings,
    /// Streaming settings.
    pub stream: StreamSettings,
}

impl ServiceConfig {
    /// Load configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `ORDER_SERVICE_GRPC_ADDR`: gRPC listen address (default: 0.0.0.0:50051)
    /// - `ORDER_SERVICE_HTTP_ADDR`: health listen address (default: 0.0.0.0:2113)
    /// - `SPOT_INSTRUMENT_ADDR`: market directory endpoint (default: <http://localhost:50052>)
    /// - `MARKET_DIRECTORY_TIMEOUT_MS`: directory lookup timeout (default: 5000)
    /// - `REDIS_ADDR`: cache URL, or `memory` (default: redis://localhost:6379)
    /// - `MARKET_CACHE_TTL_SECS`: cache entry TTL (default: 60)
    /// - `ORDER_STREAM_POLL_INTERVAL_MS`: stream tick (default: 5000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let server = ServerSettings {
            grpc_addr: parse_addr(
                &lookup,
                "ORDER_SERVICE_GRPC_ADDR",
                defaults.server.grpc_addr,
            )?,
            http_addr: parse_addr(
                &lookup,
                "ORDER_SERVICE_HTTP_ADDR",
                defaults.server.http_addr,
            )?,
        };

        let endpoint = non_empty(&lookup, "SPOT_INSTRUMENT_ADDR")
            .unwrap_or(defaults.directory.endpoint);
        let directory = MarketDirectorySettings {
            endpoint,
            lookup_timeout: parse_duration_millis(
                &lookup,
                "MARKET_DIRECTORY_TIMEOUT_MS",
                defaults.directory.lookup_timeout,
            ),
        };

        let cache = CacheSettings {
            target: non_empty(&lookup, "REDIS_ADDR")
                .map_or(defaults.cache.target, |addr| CacheTarget::from_addr(&addr)),
            ttl: parse_duration_secs(&lookup, "MARKET_CACHE_TTL_SECS", defaults.cache.ttl),
        };

        let stream = StreamSettings {
            poll_interval: parse_duration_millis(
                &lookup,
                "ORDER_STREAM_POLL_INTERVAL_MS",
                defaults.stream.poll_interval,
            ),
        };

        Ok(Self {
            server,
            directory,
            cache,
            stream,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A listen address failed to parse.
    #[error("invalid socket address in {key}: {value}")]
    InvalidAddress {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
    },
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn parse_addr<F>(
    lookup: &F,
    key: &'static str,
    default: SocketAddr,
) -> Result<SocketAddr, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidAddress { key, value })
    })
}

// Zero durations would spin the stream loop and expire cache entries on
// write, so they count as invalid.
fn parse_duration_secs<F>(lookup: &F, key: &str, default: Duration) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .map_or(default, Duration::from_secs)
}

fn parse_duration_millis<F>(lookup: &F, key: &str, default: Duration) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .map_or(default, Duration::from_millis)
}
