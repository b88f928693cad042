//! Order aggregate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::OrderValidationError;
use super::value_objects::{OrderStatus, OrderType};
use crate::domain::shared::{MarketId, OrderId, UserId};

/// A validated order request that has not been assigned an identifier yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    user_id: UserId,
    market_id: MarketId,
    order_type: OrderType,
    price: Decimal,
    quantity: Decimal,
}

impl NewOrder {
    /// Build a new order, checking price and quantity.
    pub fn new(
        user_id: UserId,
        market_id: MarketId,
        order_type: OrderType,
        price: Decimal,
        quantity: Decimal,
    ) -> Result<Self, OrderValidationError> {
        if price < Decimal::ZERO {
            return Err(OrderValidationError::NegativePrice(price.to_string()));
        }
        if quantity <= Decimal::ZERO {
            return Err(OrderValidationError::NonPositiveQuantity(
                quantity.to_string(),
            ));
        }
        Ok(Self {
            user_id,
            market_id,
            order_type,
            price,
            quantity,
        })
    }

    /// Owner of the order.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Target market.
    #[must_use]
    pub const fn market_id(&self) -> &MarketId {
        &self.market_id
    }
}

/// An order held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    market_id: MarketId,
    order_type: OrderType,
    price: Decimal,
    quantity: Decimal,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Materialize a new order under the given identifier with status `CREATED`.
    #[must_use]
    pub fn create(id: OrderId, new_order: NewOrder) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id: new_order.user_id,
            market_id: new_order.market_id,
            order_type: new_order.order_type,
            price: new_order.price,
            quantity: new_order.quantity,
            status: OrderStatus::Created,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the status and bump `updated_at`.
    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Order identifier.
    #[must_use]
    pub const fn id(&self) -> &OrderId {
        &self.id
    }

    /// Owner of the order.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Target market.
    #[must_use]
    pub const fn market_id(&self) -> &MarketId {
        &self.market_id
    }

    /// Order type.
    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        self.order_type
    }

    /// Limit price (ignored by market orders).
    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    /// Requested quantity.
    #[must_use]
    pub const fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Creation time.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the last status change.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
