//! In-memory order store.
//!
//! Orders and their snapshots live behind a single lock so that
//! change detection always compares a snapshot against the record it
//! was taken from.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;

use crate::domain::order::{
    NewOrder, Order, OrderRepository, OrderStatus, StatusSnapshot, StoreError,
};
use crate::domain::shared::{OrderId, UserId};

type IdGenerator = Box<dyn Fn() -> OrderId + Send + Sync>;

#[derive(Default)]
struct StoreState {
    orders: HashMap<OrderId, Order>,
    snapshots: HashMap<OrderId, Order>,
}

/// In-memory implementation of [`OrderRepository`].
///
/// Contents are lost on restart.
pub struct InMemoryOrderStore {
    state: RwLock<StoreState>,
    next_id: IdGenerator,
}

impl InMemoryOrderStore {
    /// Create an empty store that assigns UUID v4 identifiers.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id_generator(OrderId::generate)
    }

    /// Create an empty store with a custom identifier source.
    #[must_use]
    pub fn with_id_generator(next_id: impl Fn() -> OrderId + Send + Sync + 'static) -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            next_id: Box::new(next_id),
        }
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InMemoryOrderStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("InMemoryOrderStore")
            .field("orders", &state.orders.len())
            .field("snapshots", &state.snapshots.len())
            .finish_non_exhaustive()
    }
}

impl OrderRepository for InMemoryOrderStore {
    fn create(&self, order: NewOrder) -> Result<(OrderId, OrderStatus), StoreError> {
        let order_id = (self.next_id)();
        let mut state = self.state.write();
        if state.orders.contains_key(&order_id) {
            return Err(StoreError::AlreadyExists { order_id });
        }
        let order = Order::create(order_id, order);
        let status = order.status();
        state.orders.insert(order_id, order);
        Ok((order_id, status))
    }

    fn status_for(&self, user_id: &UserId, order_id: &OrderId) -> Result<OrderStatus, StoreError> {
        let state = self.state.read();
        let order = state
            .orders
            .get(order_id)
            .ok_or(StoreError::NotFound { order_id: *order_id })?;
        if order.user_id() != user_id {
            return Err(StoreError::Forbidden { order_id: *order_id });
        }
        Ok(order.status())
    }

    fn get(&self, order_id: &OrderId) -> Option<Order> {
        self.state.read().orders.get(order_id).cloned()
    }

    fn list(&self) -> HashMap<OrderId, Order> {
        self.state.read().orders.clone()
    }

    fn update_status(&self, order_id: &OrderId, status: OrderStatus) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let order = state
            .orders
            .get_mut(order_id)
            .ok_or(StoreError::NotFound { order_id: *order_id })?;
        order.set_status(status);
        Ok(())
    }

    fn has_changed(&self, order_id: &OrderId) -> bool {
        let state = self.state.read();
        state.orders.get(order_id).is_some_and(|live| {
            state
                .snapshots
                .get(order_id)
                .is_none_or(|snapshot| snapshot.status() != live.status())
        })
    }

    fn capture_snapshot(&self, order_id: &OrderId) -> Option<Order> {
        let mut state = self.state.write();
        let live = state.orders.get(order_id).cloned()?;
        state.snapshots.insert(*order_id, live.clone());
        Some(live)
    }

    fn capture_all_snapshots(&self) {
        let mut state = self.state.write();
        state.snapshots = state.orders.clone();
    }

    fn status_snapshot(&self) -> StatusSnapshot {
        self.state
            .read()
            .orders
            .iter()
            .map(|(id, order)| (*id, order.status()))
            .collect()
    }

    fn changes_since(&self, seen: &mut StatusSnapshot) -> Vec<Order> {
        let state = self.state.read();
        let mut changed: Vec<Order> = state
            .orders
            .iter()
            .filter(|(id, order)| seen.get(*id) != Some(&order.status()))
            .map(|(_, order)| order.clone())
            .collect();
        drop(state);

        changed.sort_unstable_by_key(|order| *order.id());
        for order in &changed {
            seen.insert(*order.id(), order.status());
        }
        changed
    }

    fn len(&self) -> usize {
        self.state.read().orders.len()
    }
}
