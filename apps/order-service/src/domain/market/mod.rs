//! Market Context
//!
//! Markets are owned by the spot instrument directory. The listing a
//! caller sees depends on their role, and an order may only target a
//! market that is enabled and not deleted.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::shared::MarketId;

/// Role of the caller, used to scope market visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Individual trader.
    Retail,
    /// Professional trader.
    Professional,
    /// Institutional desk.
    Institutional,
    /// Operator with full visibility.
    Admin,
}

impl UserRole {
    /// Canonical upper-case name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Retail => "RETAIL",
            Self::Professional => "PROFESSIONAL",
            Self::Institutional => "INSTITUTIONAL",
            Self::Admin => "ADMIN",
        }
    }

    /// Cache key under which this role's market listing is stored.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!("markets:{}", self.as_str())
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A market as published by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    /// Market identifier.
    pub id: MarketId,
    /// Display name.
    pub name: String,
    /// Whether the market accepts orders.
    pub enabled: bool,
    /// Deletion time, if the market has been removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Market {
    /// True if orders may be placed on this market.
    #[must_use]
    pub const fn is_tradable(&self) -> bool {
        self.enabled && self.deleted_at.is_none()
    }
}

/// The set of markets visible to one role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketListing {
    markets: Vec<Market>,
}

impl MarketListing {
    /// Wrap a list of markets, preserving order.
    #[must_use]
    pub const fn new(markets: Vec<Market>) -> Self {
        Self { markets }
    }

    /// First market with the given identifier.
    ///
    /// Duplicates are not merged; only the first occurrence is considered.
    #[must_use]
    pub fn find(&self, market_id: &MarketId) -> Option<&Market> {
        self.markets.iter().find(|market| &market.id == market_id)
    }

    /// True if the first market with this id is tradable.
    #[must_use]
    pub fn is_tradable(&self, market_id: &MarketId) -> bool {
        self.find(market_id).is_some_and(Market::is_tradable)
    }

    /// All markets in listing order.
    #[must_use]
    pub fn markets(&self) -> &[Market] {
        &self.markets
    }

    /// Number of markets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markets.len()
    }

    /// True if the listing is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}
