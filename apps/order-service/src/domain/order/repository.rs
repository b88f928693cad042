//! Order Repository Trait
//!
//! Persistence abstraction for orders plus the snapshot bookkeeping used
//! by change detection. Implemented by adapters in the infrastructure
//! layer.
//!
//! Every method is a single atomic step with respect to concurrent
//! callers. Implementations hold no lock across an `.await`, so the
//! trait is synchronous.

use std::collections::HashMap;

use super::aggregate::{NewOrder, Order};
use super::errors::StoreError;
use super::value_objects::OrderStatus;
use crate::domain::shared::{OrderId, UserId};

/// Last status observed per order by a single observer.
pub type StatusSnapshot = HashMap<OrderId, OrderStatus>;

/// Repository trait for order storage and change tracking.
///
/// The snapshot operations (`has_changed`, `capture_snapshot`,
/// `capture_all_snapshots`) act on one map owned by the store. Observers
/// that must not interfere with each other keep their own
/// [`StatusSnapshot`] and use [`Self::status_snapshot`] and
/// [`Self::changes_since`] instead.
pub trait OrderRepository: Send + Sync {
    /// Insert an order under a freshly generated identifier with status
    /// `CREATED`. Fails with [`StoreError::AlreadyExists`] if the
    /// identifier collides, in which case the store is left unchanged.
    fn create(&self, order: NewOrder) -> Result<(OrderId, OrderStatus), StoreError>;

    /// Status of an order owned by `user_id`.
    fn status_for(&self, user_id: &UserId, order_id: &OrderId) -> Result<OrderStatus, StoreError>;

    /// Copy of a single order, if present.
    fn get(&self, order_id: &OrderId) -> Option<Order>;

    /// Consistent copy of every stored order. Later mutations of the
    /// store do not affect the returned map.
    fn list(&self) -> HashMap<OrderId, Order>;

    /// Overwrite the status of an existing order.
    fn update_status(&self, order_id: &OrderId, status: OrderStatus) -> Result<(), StoreError>;

    /// True if the order is absent from the snapshot map or its
    /// snapshot status differs from the live status. Unknown ids report
    /// false.
    fn has_changed(&self, order_id: &OrderId) -> bool;

    /// Record the live state of one order as its snapshot and return
    /// the captured copy. Unknown ids are ignored.
    fn capture_snapshot(&self, order_id: &OrderId) -> Option<Order>;

    /// Replace the snapshot map with a copy of every stored order.
    fn capture_all_snapshots(&self);

    /// Status of every stored order, taken in one step.
    fn status_snapshot(&self) -> StatusSnapshot;

    /// Orders whose status differs from `seen`, or that `seen` does not
    /// know yet, in ascending id order. `seen` is advanced to the
    /// returned statuses in the same step.
    fn changes_since(&self, seen: &mut StatusSnapshot) -> Vec<Order>;

    /// Number of stored orders.
    fn len(&self) -> usize;

    /// True if no orders are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
