//! Order DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order::{Order, OrderStatus, OrderType};
use crate::domain::shared::OrderId;

/// DTO for creating an order. Identifiers are still unparsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderDto {
    /// Owning user (UUID text).
    pub user_id: String,
    /// Target market.
    pub market_id: String,
    /// Order type.
    pub order_type: OrderType,
    /// Price.
    pub price: Decimal,
    /// Quantity.
    pub quantity: Decimal,
}

/// Result of a successful creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedOrderDto {
    /// Assigned identifier.
    pub order_id: OrderId,
    /// Initial status, always `CREATED`.
    pub status: OrderStatus,
}

/// A status change observed by the streaming loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusEvent {
    /// Changed order.
    pub order_id: OrderId,
    /// Status at capture time.
    pub status: OrderStatus,
    /// When the status was last set.
    pub updated_at: DateTime<Utc>,
}

impl From<&Order> for OrderStatusEvent {
    fn from(order: &Order) -> Self {
        Self {
            order_id: *order.id(),
            status: order.status(),
            updated_at: order.updated_at(),
        }
    }
}
