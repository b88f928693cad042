//! Status Streaming Loop
//!
//! Baseline: record the status of every stored order so that existing
//! orders are not reported. Polling: on every tick, emit one event per
//! order whose status differs from the recorded one (or that was not
//! recorded yet), advancing the record as it goes.
//!
//! Every run keeps its own [`StatusSnapshot`], so subscribers never
//! consume each other's changes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::application::dto::OrderStatusEvent;
use crate::domain::order::{OrderRepository, StatusSnapshot};
use crate::error::OrderServiceError;

/// Default polling interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Item delivered to a subscriber.
pub type StatusStreamItem = Result<OrderStatusEvent, OrderServiceError>;

/// Periodic change detector over an [`OrderRepository`].
pub struct StatusStreamLoop<R: OrderRepository> {
    store: Arc<R>,
    poll_interval: Duration,
}

impl<R: OrderRepository> StatusStreamLoop<R> {
    /// Create a loop polling every `poll_interval`.
    pub const fn new(store: Arc<R>, poll_interval: Duration) -> Self {
        Self {
            store,
            poll_interval,
        }
    }

    /// Configured tick length.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Collect one event per order that changed since `seen`, in
    /// ascending id order, and advance `seen`.
    #[must_use]
    pub fn poll_changes(&self, seen: &mut StatusSnapshot) -> Vec<OrderStatusEvent> {
        self.store
            .changes_since(seen)
            .iter()
            .map(OrderStatusEvent::from)
            .collect()
    }

    /// Run until `cancel` fires or the subscriber goes away.
    ///
    /// On cancellation a final `Err(Cancelled)` is offered to the
    /// subscriber and returned. A closed channel ends the loop with `Ok`.
    pub async fn run(
        &self,
        updates: mpsc::Sender<StatusStreamItem>,
        cancel: CancellationToken,
    ) -> Result<(), OrderServiceError> {
        let mut seen = self.store.status_snapshot();
        debug!(orders = seen.len(), "Status stream baseline captured");

        let mut ticker =
            tokio::time::interval_at(Instant::now() + self.poll_interval, self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Self::cancelled(&updates),
                () = updates.closed() => {
                    debug!("Status stream subscriber disconnected");
                    return Ok(());
                }
                _ = ticker.tick() => {}
            }

            let events = self.poll_changes(&mut seen);
            trace!(changed = events.len(), "Status stream tick");

            for event in events {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return Self::cancelled(&updates),
                    sent = updates.send(Ok(event)) => {
                        if sent.is_err() {
                            debug!("Status stream subscriber disconnected");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    fn cancelled(updates: &mpsc::Sender<StatusStreamItem>) -> Result<(), OrderServiceError> {
        debug!("Status stream cancelled");
        match updates.try_send(Err(OrderServiceError::Cancelled)) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(_)) => {
                debug!("Status stream buffer full, final cancellation not delivered");
            }
        }
        Err(OrderServiceError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::order::{NewOrder, OrderStatus, OrderType};
    use crate::domain::shared::{MarketId, OrderId, UserId};
    use crate::infrastructure::persistence::InMemoryOrderStore;

    const TICK: Duration = Duration::from_secs(5);

    fn create(store: &InMemoryOrderStore) -> OrderId {
        let order = NewOrder::new(
            UserId::generate(),
            MarketId::parse("m1").unwrap(),
            OrderType::Market,
            Decimal::ZERO,
            Decimal::ONE,
        )
        .unwrap();
        store.create(order).unwrap().0
    }

    fn spawn_loop(
        store: &Arc<InMemoryOrderStore>,
    ) -> (
        mpsc::Receiver<StatusStreamItem>,
        CancellationToken,
        tokio::task::JoinHandle<Result<(), OrderServiceError>>,
    ) {
        let stream_loop = StatusStreamLoop::new(Arc::clone(store), TICK);
        let (tx, rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move { stream_loop.run(tx, token).await });
        (rx, cancel, handle)
    }

    async fn rx_next(rx: &mut mpsc::Receiver<StatusStreamItem>) -> OrderStatusEvent {
        rx.recv().await.unwrap().unwrap()
    }

    #[test]
    fn poll_changes_reports_every_changed_order_sorted() {
        let store = Arc::new(InMemoryOrderStore::new());
        let stream_loop = StatusStreamLoop::new(Arc::clone(&store), TICK);
        let mut ids: Vec<_> = (0..4).map(|_| create(&store)).collect();
        ids.sort_unstable();

        let mut seen = StatusSnapshot::new();
        let events = stream_loop.poll_changes(&mut seen);

        assert_eq!(events.iter().map(|e| e.order_id).collect::<Vec<_>>(), ids);
        assert!(stream_loop.poll_changes(&mut seen).is_empty());
    }

    #[test]
    fn poll_changes_after_baseline_only_reports_updates() {
        let store = Arc::new(InMemoryOrderStore::new());
        let stream_loop = StatusStreamLoop::new(Arc::clone(&store), TICK);
        let first = create(&store);
        let second = create(&store);
        let mut seen = store.status_snapshot();

        store.update_status(&second, OrderStatus::Filled).unwrap();
        store.update_status(&first, OrderStatus::Created).unwrap();
        let events = stream_loop.poll_changes(&mut seen);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].order_id, second);
        assert_eq!(events[0].status, OrderStatus::Filled);
    }

    #[tokio::test(start_paused = true)]
    async fn pre_existing_orders_are_not_reported() {
        let store = Arc::new(InMemoryOrderStore::new());
        create(&store);
        let (mut rx, cancel, handle) = spawn_loop(&store);

        tokio::time::sleep(TICK * 3).await;
        assert!(rx.try_recv().is_err());

        cancel.cancel();
        assert_eq!(handle.await.unwrap(), Err(OrderServiceError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn emits_one_event_per_change_and_keeps_running() {
        let store = Arc::new(InMemoryOrderStore::new());
        let a = create(&store);
        let b = create(&store);
        let (mut rx, cancel, handle) = spawn_loop(&store);
        tokio::time::sleep(Duration::from_millis(1)).await;

        store.update_status(&a, OrderStatus::Processing).unwrap();
        store.update_status(&b, OrderStatus::Rejected).unwrap();
        let mut seen = vec![
            rx.recv().await.unwrap().unwrap(),
            rx.recv().await.unwrap().unwrap(),
        ];
        seen.sort_by_key(|e| e.order_id);
        let mut expected = vec![(a, OrderStatus::Processing), (b, OrderStatus::Rejected)];
        expected.sort_by_key(|(id, _)| *id);
        assert_eq!(
            seen.iter().map(|e| (e.order_id, e.status)).collect::<Vec<_>>(),
            expected
        );

        store.update_status(&a, OrderStatus::Filled).unwrap();
        let next = rx.recv().await.unwrap().unwrap();
        assert_eq!((next.order_id, next.status), (a, OrderStatus::Filled));

        let c = create(&store);
        let created = rx.recv().await.unwrap().unwrap();
        assert_eq!((created.order_id, created.status), (c, OrderStatus::Created));

        cancel.cancel();
        assert_eq!(rx.recv().await.unwrap(), Err(OrderServiceError::Cancelled));
        assert_eq!(handle.await.unwrap(), Err(OrderServiceError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn same_status_update_is_not_reported() {
        let store = Arc::new(InMemoryOrderStore::new());
        let a = create(&store);
        let (mut rx, cancel, handle) = spawn_loop(&store);
        tokio::time::sleep(Duration::from_millis(1)).await;

        store.update_status(&a, OrderStatus::Created).unwrap();
        tokio::time::sleep(TICK * 2).await;
        assert!(rx.try_recv().is_err());

        store.update_status(&a, OrderStatus::Cancelled).unwrap();
        let next = rx.recv().await.unwrap().unwrap();
        assert_eq!((next.order_id, next.status), (a, OrderStatus::Cancelled));

        cancel.cancel();
        assert_eq!(handle.await.unwrap(), Err(OrderServiceError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn late_subscriber_does_not_hide_changes_from_earlier_one() {
        let store = Arc::new(InMemoryOrderStore::new());
        let (mut first_rx, first_cancel, first_handle) = spawn_loop(&store);
        tokio::time::sleep(Duration::from_millis(1)).await;

        let created = create(&store);
        let (mut second_rx, second_cancel, second_handle) = spawn_loop(&store);
        tokio::time::sleep(Duration::from_millis(1)).await;

        let event = rx_next(&mut first_rx).await;
        assert_eq!((event.order_id, event.status), (created, OrderStatus::Created));

        store.update_status(&created, OrderStatus::Filled).unwrap();
        let first = rx_next(&mut first_rx).await;
        let second = rx_next(&mut second_rx).await;
        assert_eq!((first.order_id, first.status), (created, OrderStatus::Filled));
        assert_eq!((second.order_id, second.status), (created, OrderStatus::Filled));

        first_cancel.cancel();
        second_cancel.cancel();
        assert_eq!(first_handle.await.unwrap(), Err(OrderServiceError::Cancelled));
        assert_eq!(second_handle.await.unwrap(), Err(OrderServiceError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn full_buffer_still_ends_with_cancelled() {
        let store = Arc::new(InMemoryOrderStore::new());
        let stream_loop = StatusStreamLoop::new(Arc::clone(&store), TICK);
        let (tx, mut rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move { stream_loop.run(tx, token).await });
        tokio::time::sleep(Duration::from_millis(1)).await;

        create(&store);
        create(&store);
        tokio::time::sleep(TICK + Duration::from_millis(1)).await;

        cancel.cancel();
        assert_eq!(handle.await.unwrap(), Err(OrderServiceError::Cancelled));
        assert!(rx.recv().await.unwrap().is_ok());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_subscriber_ends_quietly() {
        let store = Arc::new(InMemoryOrderStore::new());
        let (rx, _cancel, handle) = spawn_loop(&store);

        drop(rx);

        assert_eq!(handle.await.unwrap(), Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_before_first_tick() {
        let store = Arc::new(InMemoryOrderStore::new());
        let (_rx, cancel, handle) = spawn_loop(&store);

        cancel.cancel();

        assert_eq!(handle.await.unwrap(), Err(OrderServiceError::Cancelled));
    }
}
