//! Order store and validation errors.

use thiserror::Error;

use crate::domain::shared::OrderId;

/// Errors raised by an [`super::OrderRepository`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No order with this identifier exists.
    #[error("order {order_id} not found")]
    NotFound {
        /// Requested order.
        order_id: OrderId,
    },

    /// The order exists but belongs to another user.
    #[error("order {order_id} does not belong to the requesting user")]
    Forbidden {
        /// Requested order.
        order_id: OrderId,
    },

    /// A freshly generated identifier collided with a stored order.
    #[error("order {order_id} already exists")]
    AlreadyExists {
        /// Colliding identifier.
        order_id: OrderId,
    },
}

/// Errors raised while building a [`super::NewOrder`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderValidationError {
    /// Price must not be negative.
    #[error("price must be non-negative, got {0}")]
    NegativePrice(String),

    /// Quantity must be strictly positive.
    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(String),
}

impl OrderValidationError {
    /// Name of the request field that failed validation.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::NegativePrice(_) => "price",
            Self::NonPositiveQuantity(_) => "quantity",
        }
    }
}
