//! Order Orchestrator
//!
//! Turns creation requests into validated, stored orders and answers
//! status queries and updates.

use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::market_gateway::MarketCacheGateway;
use crate::application::dto::{CreateOrderDto, CreatedOrderDto};
use crate::application::ports::{MarketCachePort, MarketDirectoryPort};
use crate::domain::market::UserRole;
use crate::domain::order::{NewOrder, Order, OrderRepository, OrderStatus};
use crate::domain::shared::{MarketId, OrderId, UserId};
use crate::error::OrderServiceError;

/// Application service for the order lifecycle.
pub struct OrderOrchestrator<R, D, C>
where
    R: OrderRepository,
    D: MarketDirectoryPort,
    C: MarketCachePort,
{
    store: Arc<R>,
    markets: MarketCacheGateway<D, C>,
}

impl<R, D, C> OrderOrchestrator<R, D, C>
where
    R: OrderRepository,
    D: MarketDirectoryPort,
    C: MarketCachePort,
{
    /// Create a new orchestrator.
    pub const fn new(store: Arc<R>, markets: MarketCacheGateway<D, C>) -> Self {
        Self { store, markets }
    }

    /// Validate the market for `role` and store a new order.
    ///
    /// The store is only touched once the market has been found in the
    /// caller's listing. Duplicate listing entries are resolved by
    /// taking the first one.
    pub async fn create_order(
        &self,
        role: UserRole,
        request: CreateOrderDto,
        cancel: &CancellationToken,
    ) -> Result<CreatedOrderDto, OrderServiceError> {
        let listing = self.markets.markets_for(role, cancel).await?;

        let user_id = UserId::parse(&request.user_id)?;
        let market_id = MarketId::parse(&request.market_id)?;
        let new_order = NewOrder::new(
            user_id,
            market_id.clone(),
            request.order_type,
            request.price,
            request.quantity,
        )?;

        if !listing.is_tradable(&market_id) {
            info!(%role, %market_id, "Rejected order for unknown market");
            return Err(OrderServiceError::MarketNotFound {
                market_id: market_id.to_string(),
            });
        }

        let (order_id, status) = self.store.create(new_order)?;
        info!(%order_id, %user_id, %market_id, order_type = %request.order_type, "Order created");

        Ok(CreatedOrderDto { order_id, status })
    }

    /// Status of an order owned by `user_id`.
    pub fn get_order_status(
        &self,
        user_id: &str,
        order_id: &str,
    ) -> Result<OrderStatus, OrderServiceError> {
        let user_id = UserId::parse(user_id)?;
        let order_id = OrderId::parse(order_id)?;
        Ok(self.store.status_for(&user_id, &order_id)?)
    }

    /// Overwrite the status of an order. No ownership check.
    pub fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<OrderStatus, OrderServiceError> {
        let order_id = OrderId::parse(order_id)?;
        self.store.update_status(&order_id, status)?;
        debug!(%order_id, %status, "Order status updated");
        Ok(status)
    }

    /// Copy of every stored order.
    #[must_use]
    pub fn list_orders(&self) -> HashMap<OrderId, Order> {
        self.store.list()
    }
}
