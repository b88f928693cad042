//! Transport-neutral request and event shapes.

mod order_dto;

pub use order_dto::{CreateOrderDto, CreatedOrderDto, OrderStatusEvent};
