//! Shared Domain Types
//!
//! Identifiers used across the order and market contexts.

mod identifiers;

pub use identifiers::{MarketId, OrderId, ParseIdError, UserId};
