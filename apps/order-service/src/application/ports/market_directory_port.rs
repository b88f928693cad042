//! Market Directory Port (Driven Port)
//!
//! Remote lookup of the markets visible to a role.

use async_trait::async_trait;

use crate::domain::market::{MarketListing, UserRole};

/// Market directory error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketDirectoryError {
    /// The directory could not be reached or returned an error status.
    #[error("market directory unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// The lookup did not finish within the configured timeout.
    #[error("market directory timed out after {timeout_ms} ms")]
    Timeout {
        /// Configured timeout.
        timeout_ms: u64,
    },

    /// The directory answered with data that cannot be mapped to markets.
    #[error("invalid market directory response: {message}")]
    InvalidResponse {
        /// Error details.
        message: String,
    },
}

/// Port for the remote market directory.
#[async_trait]
pub trait MarketDirectoryPort: Send + Sync {
    /// Markets visible to `role`, in directory order.
    async fn view_markets(&self, role: UserRole) -> Result<MarketListing, MarketDirectoryError>;
}
