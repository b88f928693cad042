//! Order Context
//!
//! An order is created against an enabled market, starts in
//! [`OrderStatus::Created`], and can be moved to any status afterwards.
//! The store keeps a per-order snapshot so change detection can tell
//! which orders moved since they were last observed.

mod aggregate;
mod errors;
mod repository;
mod value_objects;

pub use aggregate::{NewOrder, Order};
pub use errors::{OrderValidationError, StoreError};
pub use repository::{OrderRepository, StatusSnapshot};
pub use value_objects::{OrderStatus, OrderType};
