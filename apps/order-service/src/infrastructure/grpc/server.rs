//! gRPC Order Service Implementation
//!
//! Implements `orders.v1.OrderService` on top of the application
//! services. Every call is tagged with its request id, recorded in
//! metrics, and given a child of the process shutdown token.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Instant;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tonic::service::interceptor::InterceptedService;
use tonic::{Request, Response, Status};
use tracing::{Instrument, debug, error, info, info_span, warn};

use super::converters::{
    create_order_from_proto, order_status_from_proto, order_status_to_proto, status_event_to_proto,
    user_role_from_proto,
};
use super::interceptor::{REQUEST_ID_HEADER, RequestId, request_id_interceptor};
use super::proto::orders::v1::order_service_server::{OrderService, OrderServiceServer};
use super::proto::orders::v1::{
    CreateOrderRequest, CreateOrderResponse, GetOrderStatusRequest, GetOrderStatusResponse,
    OrderStatusUpdate, StreamOrderUpdatesRequest, UpdateOrderStatusRequest,
    UpdateOrderStatusResponse,
};
use crate::application::ports::{MarketCachePort, MarketDirectoryPort};
use crate::application::services::{OrderOrchestrator, StatusStreamLoop};
use crate::domain::order::OrderRepository;
use crate::error::{ErrorCode, OrderServiceError};
use crate::infrastructure::metrics;

// =============================================================================
// Type Aliases
// =============================================================================

type RpcResult<T> = Result<Response<T>, Status>;
type BoxedStream<T> = Pin<Box<dyn Stream<Item = Result<T, Status>> + Send>>;
type Interceptor = fn(Request<()>) -> Result<Request<()>, Status>;

/// Buffered events per stream subscriber.
const STREAM_BUFFER: usize = 256;

// =============================================================================
// Adapter
// =============================================================================

/// gRPC adapter for the order service.
pub struct OrderServiceAdapter<R, D, C>
where
    R: OrderRepository,
    D: MarketDirectoryPort,
    C: MarketCachePort,
{
    orchestrator: Arc<OrderOrchestrator<R, D, C>>,
    stream_loop: Arc<StatusStreamLoop<R>>,
    shutdown: CancellationToken,
    subscribers: Arc<AtomicI32>,
}

impl<R, D, C> OrderServiceAdapter<R, D, C>
where
    R: OrderRepository + 'static,
    D: MarketDirectoryPort + 'static,
    C: MarketCachePort + 'static,
{
    /// Create a new adapter. Cancelling `shutdown` cancels in-flight
    /// lookups and ends every open stream.
    pub fn new(
        orchestrator: Arc<OrderOrchestrator<R, D, C>>,
        stream_loop: Arc<StatusStreamLoop<R>>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            orchestrator,
            stream_loop,
            shutdown,
            subscribers: Arc::new(AtomicI32::new(0)),
        }
    }

    /// Wrap the adapter in the generated server with the request-id
    /// interceptor installed.
    pub fn into_service(self) -> InterceptedService<OrderServiceServer<Self>, Interceptor> {
        OrderServiceServer::with_interceptor(self, request_id_interceptor as Interceptor)
    }

    /// Number of open status streams.
    #[must_use]
    pub fn subscriber_count(&self) -> i32 {
        self.subscribers.load(Ordering::Relaxed)
    }

    /// Shared subscriber counter, readable after the adapter is moved
    /// into the server.
    #[must_use]
    pub fn subscriber_counter(&self) -> Arc<AtomicI32> {
        Arc::clone(&self.subscribers)
    }
}

#[tonic::async_trait]
impl<R, D, C> OrderService for OrderServiceAdapter<R, D, C>
where
    R: OrderRepository + 'static,
    D: MarketDirectoryPort + 'static,
    C: MarketCachePort + 'static,
{
    async fn create_order(
        &self,
        request: Request<CreateOrderRequest>,
    ) -> RpcResult<CreateOrderResponse> {
        let call = Call::start("CreateOrder", &request);
        call.recover(self.handle_create_order(&call, request)).await
    }

    async fn get_order_status(
        &self,
        request: Request<GetOrderStatusRequest>,
    ) -> RpcResult<GetOrderStatusResponse> {
        let call = Call::start("GetOrderStatus", &request);
        call.recover(async { self.handle_get_order_status(&call, request) })
            .await
    }

    async fn update_order_status(
        &self,
        request: Request<UpdateOrderStatusRequest>,
    ) -> RpcResult<UpdateOrderStatusResponse> {
        let call = Call::start("UpdateOrderStatus", &request);
        call.recover(async { self.handle_update_order_status(&call, request) })
            .await
    }

    type StreamOrderUpdatesStream = BoxedStream<OrderStatusUpdate>;

    async fn stream_order_updates(
        &self,
        request: Request<StreamOrderUpdatesRequest>,
    ) -> RpcResult<Self::StreamOrderUpdatesStream> {
        let call = Call::start("StreamOrderUpdates", &request);
        call.recover(async { self.handle_stream_order_updates(&call, request) })
            .await
    }
}

impl<R, D, C> OrderServiceAdapter<R, D, C>
where
    R: OrderRepository + 'static,
    D: MarketDirectoryPort + 'static,
    C: MarketCachePort + 'static,
{
    async fn handle_create_order(
        &self,
        call: &Call,
        request: Request<CreateOrderRequest>,
    ) -> RpcResult<CreateOrderResponse> {
        let span = info_span!("create_order", request_id = %call.request_id);

        let result = async {
            let (role, dto) = create_order_from_proto(request.into_inner())?;
            let cancel = self.shutdown.child_token();
            self.orchestrator.create_order(role, dto, &cancel).await
        }
        .instrument(span)
        .await;

        match &result {
            Ok(_) => metrics::record_order_created(),
            Err(e) => metrics::record_order_rejected(e.code().reason()),
        }

        let result = result.map(|created| CreateOrderResponse {
            order_id: created.order_id.to_string(),
            status: order_status_to_proto(created.status).into(),
        });
        call.finish(result)
    }

    fn handle_get_order_status(
        &self,
        call: &Call,
        request: Request<GetOrderStatusRequest>,
    ) -> RpcResult<GetOrderStatusResponse> {
        let req = request.into_inner();

        let result =
            info_span!("get_order_status", request_id = %call.request_id, order_id = %req.order_id)
                .in_scope(|| self.orchestrator.get_order_status(&req.user_id, &req.order_id));

        let result = result.map(|status| GetOrderStatusResponse {
            status: order_status_to_proto(status).into(),
        });
        call.finish(result)
    }

    fn handle_update_order_status(
        &self,
        call: &Call,
        request: Request<UpdateOrderStatusRequest>,
    ) -> RpcResult<UpdateOrderStatusResponse> {
        let req = request.into_inner();

        let result = info_span!(
            "update_order_status",
            request_id = %call.request_id,
            order_id = %req.order_id
        )
        .in_scope(|| {
            let status = order_status_from_proto(req.status)?;
            self.orchestrator.update_order_status(&req.order_id, status)
        });

        if result.is_ok() {
            metrics::record_status_update();
        }

        let result = result.map(|status| UpdateOrderStatusResponse {
            status: order_status_to_proto(status).into(),
        });
        call.finish(result)
    }

    fn handle_stream_order_updates(
        &self,
        call: &Call,
        request: Request<StreamOrderUpdatesRequest>,
    ) -> RpcResult<BoxedStream<OrderStatusUpdate>> {
        let role = match user_role_from_proto(request.into_inner().user_role) {
            Ok(role) => role,
            Err(e) => return call.finish(Err(e)),
        };

        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let stream_loop = Arc::clone(&self.stream_loop);
        let cancel = self.shutdown.child_token();
        let subscribers = Arc::clone(&self.subscribers);
        let active = subscribers.fetch_add(1, Ordering::Relaxed) + 1;
        metrics::set_stream_subscribers(f64::from(active));

        let span = info_span!("stream_order_updates", request_id = %call.request_id, %role);
        tokio::spawn(
            async move {
                let interval_ms =
                    u64::try_from(stream_loop.poll_interval().as_millis()).unwrap_or(u64::MAX);
                info!(interval_ms, "Status stream opened");
                let outcome = stream_loop.run(tx, cancel).await;
                let remaining = subscribers.fetch_sub(1, Ordering::Relaxed) - 1;
                metrics::set_stream_subscribers(f64::from(remaining));
                info!(cancelled = outcome.is_err(), "Status stream closed");
            }
            .instrument(span),
        );

        let stream = ReceiverStream::new(rx).map(|item| match item {
            Ok(event) => {
                metrics::record_stream_event();
                Ok(status_event_to_proto(&event))
            }
            Err(e) => Err(e.to_status()),
        });

        let stream: BoxedStream<OrderStatusUpdate> = Box::pin(stream);
        call.finish(Ok(stream))
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Per-call bookkeeping shared by every handler.
struct Call {
    method: &'static str,
    started: Instant,
    request_id: RequestId,
}

impl Call {
    fn start<T>(method: &'static str, request: &Request<T>) -> Self {
        Self {
            method,
            started: Instant::now(),
            request_id: RequestId::from_request(request),
        }
    }

    /// Log, record and convert the outcome of a call.
    fn finish<T>(&self, result: Result<T, OrderServiceError>) -> RpcResult<T> {
        let outcome = result.map_err(|e| {
            log_failure(self.method, &self.request_id, &e);
            e.to_status()
        });

        let code = outcome.as_ref().map_or_else(Status::code, |_| tonic::Code::Ok);
        metrics::record_request(self.method, code, self.started.elapsed());

        outcome.map(|body| {
            let mut response = Response::new(body);
            if let Ok(value) = self.request_id.as_str().parse() {
                response.metadata_mut().insert(REQUEST_ID_HEADER, value);
            }
            response
        })
    }

    /// Drive a handler, turning a panic into `INTERNAL`.
    async fn recover<T, F>(&self, handler: F) -> RpcResult<T>
    where
        F: Future<Output = RpcResult<T>>,
    {
        match AssertUnwindSafe(handler).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(payload) => self.finish(Err(OrderServiceError::Internal {
                message: panic_message(payload.as_ref()),
            })),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "handler panicked".to_string())
}

fn log_failure(method: &'static str, request_id: &RequestId, err: &OrderServiceError) {
    let code = err.code();
    match code {
        ErrorCode::MarketNotFound => {
            info!(method, %request_id, %code, error = %err, "Request rejected");
        }
        ErrorCode::AlreadyExists | ErrorCode::Internal => {
            error!(method, %request_id, %code, error = %err, "Request failed");
        }
        ErrorCode::UpstreamUnavailable | ErrorCode::CacheUnavailable => {
            warn!(method, %request_id, %code, error = %err, "Request failed");
        }
        ErrorCode::InvalidIdentifier
        | ErrorCode::InvalidArgument
        | ErrorCode::OrderNotFound
        | ErrorCode::Forbidden
        | ErrorCode::Cancelled => {
            debug!(method, %request_id, %code, error = %err, "Request rejected");
        }
    }
}
