//! Strongly-typed identifiers for domain entities.
//!
//! Orders and users are keyed by UUIDs. Market identifiers are opaque
//! strings owned by the spot instrument directory, so they are only
//! required to be non-empty.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error returned when a textual identifier cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: {value:?}")]
pub struct ParseIdError {
    /// Which identifier failed (`order_id`, `user_id`, `market_id`).
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

macro_rules! define_uuid_id {
    ($name:ident, $kind:literal, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wrap an existing UUID.
            #[must_use]
            pub const fn new(value: Uuid) -> Self {
                Self(value)
            }

            /// Generate a new unique identifier using UUID v4.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse the canonical textual form.
            pub fn parse(value: &str) -> Result<Self, ParseIdError> {
                Uuid::parse_str(value).map(Self).map_err(|_| ParseIdError {
                    kind: $kind,
                    value: value.to_string(),
                })
            }

            /// Get the inner UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

define_uuid_id!(OrderId, "order_id", "Unique identifier for an order.");
define_uuid_id!(UserId, "user_id", "Identifier of the user placing orders.");

/// Identifier of a market published by the spot instrument directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketId(String);

impl MarketId {
    /// Parse a market identifier, rejecting empty or blank input.
    pub fn parse(value: &str) -> Result<Self, ParseIdError> {
        if value.trim().is_empty() {
            return Err(ParseIdError {
                kind: "market_id",
                value: value.to_string(),
            });
        }
        Ok(Self(value.to_string()))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MarketId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for MarketId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn order_id_parse_and_display() {
        let raw = "6f1c2a7e-9a55-4a8e-8f7b-2f1f4d3c2b10";
        let id = OrderId::parse(raw).unwrap();
        assert_eq!(id.to_string(), raw);
    }

    #[test]
    fn order_id_rejects_garbage() {
        let err = OrderId::parse("not-a-uuid").unwrap_err();
        assert_eq!(err.kind, "order_id");
        assert_eq!(err.value, "not-a-uuid");
    }

    #[test]
    fn user_id_rejects_empty() {
        let err = UserId::parse("").unwrap_err();
        assert_eq!(err.kind, "user_id");
    }

    #[test]
    fn user_id_from_str() {
        let id: UserId = "00000000-0000-4000-8000-000000000001".parse().unwrap();
        assert_eq!(id.to_string(), "00000000-0000-4000-8000-000000000001");
    }

    #[test]
    fn market_id_accepts_opaque_strings() {
        let id = MarketId::parse("m1").unwrap();
        assert_eq!(id.as_str(), "m1");
        assert_eq!(format!("{id}"), "m1");
    }

    #[test]
    fn market_id_rejects_blank() {
        assert!(MarketId::parse("").is_err());
        assert!(MarketId::parse("   ").is_err());
    }

    #[test]
    fn serde_is_transparent() {
        let id = MarketId::parse("m2").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"m2\"");

        let order_id = OrderId::generate();
        let json = serde_json::to_string(&order_id).unwrap();
        let parsed: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, order_id);
    }

    proptest! {
        #[test]
        fn generated_order_ids_are_distinct(count in 2usize..256) {
            let ids: std::collections::HashSet<_> =
                (0..count).map(|_| OrderId::generate()).collect();
            prop_assert_eq!(ids.len(), count);
        }

        #[test]
        fn order_id_display_parses_back(bytes in any::<u128>()) {
            let id = OrderId::new(Uuid::from_u128(bytes));
            prop_assert_eq!(OrderId::parse(&id.to_string()).unwrap(), id);
        }
    }
}
