//! Order Service Integration Tests
//!
//! Runs the order service and a stub spot instrument directory on
//! ephemeral ports and drives them through generated gRPC clients.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::transport::{Channel, Server};
use tonic::{Code, Request, Response, Status};
use tonic_types::StatusExt;

use order_service::proto::orders::v1::order_service_client::OrderServiceClient;
use order_service::proto::orders::v1::{
    CreateOrderRequest, GetOrderStatusRequest, OrderStatus, OrderType, StreamOrderUpdatesRequest,
    UpdateOrderStatusRequest,
};
use order_service::proto::spot_instrument::v1::spot_instrument_service_server::{
    SpotInstrumentService, SpotInstrumentServiceServer,
};
use order_service::proto::spot_instrument::v1::{
    Market, UserRole, ViewMarketsRequest, ViewMarketsResponse,
};
use order_service::{
    GrpcMarketDirectory, InMemoryMarketCache, InMemoryOrderStore, MarketCacheGateway,
    OrderOrchestrator, OrderServiceAdapter, StatusStreamLoop,
};

const USER: &str = "6f1c1a52-3a51-4d63-9d4c-52b1e5f3c6a1";
const OTHER_USER: &str = "0b8e2c77-1d2f-4a9b-8f0e-3c4d5e6f7a8b";

// =============================================================================
// Stub directory
// =============================================================================

/// Retail callers see `m1`; every other role also sees `m2`.
#[derive(Default)]
struct StubDirectory {
    calls: Arc<AtomicUsize>,
}

#[tonic::async_trait]
impl SpotInstrumentService for StubDirectory {
    async fn view_markets(
        &self,
        request: Request<ViewMarketsRequest>,
    ) -> Result<Response<ViewMarketsResponse>, Status> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut markets = vec![Market {
            id: "m1".to_string(),
            name: "BTC-USD".to_string(),
        }];
        if request.into_inner().user_role != UserRole::Retail as i32 {
            markets.push(Market {
                id: "m2".to_string(),
                name: "ETH-USD".to_string(),
            });
        }
        Ok(Response::new(ViewMarketsResponse { markets }))
    }
}

// =============================================================================
// Harness
// =============================================================================

struct Harness {
    client: OrderServiceClient<Channel>,
    directory_calls: Arc<AtomicUsize>,
    shutdown: CancellationToken,
}

async fn spawn_directory() -> (String, Arc<AtomicUsize>) {
    let directory = StubDirectory::default();
    let calls = Arc::clone(&directory.calls);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        Server::builder()
            .add_service(SpotInstrumentServiceServer::new(directory))
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    (format!("http://{addr}"), calls)
}

async fn setup() -> Harness {
    let (directory_addr, directory_calls) = spawn_directory().await;

    let store = Arc::new(InMemoryOrderStore::new());
    let directory = GrpcMarketDirectory::connect_lazy(&directory_addr).unwrap();
    let gateway = MarketCacheGateway::new(Arc::new(directory), Arc::new(InMemoryMarketCache::new()))
        .with_ttl(Duration::from_secs(60))
        .with_lookup_timeout(Duration::from_secs(2));
    let orchestrator = Arc::new(OrderOrchestrator::new(Arc::clone(&store), gateway));
    let stream_loop = Arc::new(StatusStreamLoop::new(store, Duration::from_millis(20)));
    let shutdown = CancellationToken::new();
    let adapter = OrderServiceAdapter::new(orchestrator, stream_loop, shutdown.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        Server::builder()
            .add_service(adapter.into_service())
            .serve_with_incoming_shutdown(
                TcpListenerStream::new(listener),
                server_shutdown.cancelled_owned(),
            )
            .await
            .unwrap();
    });

    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = OrderServiceClient::connect(format!("http://{addr}"))
        .await
        .unwrap();

    Harness {
        client,
        directory_calls,
        shutdown,
    }
}

fn create_request(market_id: &str, role: UserRole) -> CreateOrderRequest {
    CreateOrderRequest {
        user_id: USER.to_string(),
        market_id: market_id.to_string(),
        order_type: OrderType::Limit.into(),
        price: 100.25,
        quantity: 3.0,
        user_role: role.into(),
    }
}

fn error_reason(status: &Status) -> String {
    status
        .get_error_details()
        .error_info()
        .map(|info| info.reason.clone())
        .unwrap_or_default()
}

// =============================================================================
// Unary RPCs
// =============================================================================

#[tokio::test]
async fn create_then_query_round_trip() {
    let mut harness = setup().await;

    let created = harness
        .client
        .create_order(create_request("m1", UserRole::Retail))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(created.status, OrderStatus::Created as i32);
    assert!(uuid::Uuid::parse_str(&created.order_id).is_ok());

    let status = harness
        .client
        .get_order_status(GetOrderStatusRequest {
            order_id: created.order_id.clone(),
            user_id: USER.to_string(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(status.status, OrderStatus::Created as i32);

    harness.shutdown.cancel();
}

#[tokio::test]
async fn other_users_are_forbidden() {
    let mut harness = setup().await;

    let created = harness
        .client
        .create_order(create_request("m1", UserRole::Retail))
        .await
        .unwrap()
        .into_inner();

    let status = harness
        .client
        .get_order_status(GetOrderStatusRequest {
            order_id: created.order_id,
            user_id: OTHER_USER.to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::PermissionDenied);
    assert_eq!(error_reason(&status), "FORBIDDEN");

    harness.shutdown.cancel();
}

#[tokio::test]
async fn unknown_market_is_not_found() {
    let mut harness = setup().await;

    let status = harness
        .client
        .create_order(create_request("m9", UserRole::Admin))
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::NotFound);
    assert_eq!(error_reason(&status), "MARKET_NOT_FOUND");

    harness.shutdown.cancel();
}

#[tokio::test]
async fn listing_depends_on_role() {
    let mut harness = setup().await;

    let retail = harness
        .client
        .create_order(create_request("m2", UserRole::Retail))
        .await
        .unwrap_err();
    assert_eq!(retail.code(), Code::NotFound);

    let institutional = harness
        .client
        .create_order(create_request("m2", UserRole::Institutional))
        .await;
    assert!(institutional.is_ok());

    harness.shutdown.cancel();
}

#[tokio::test]
async fn listing_is_cached_per_role() {
    let mut harness = setup().await;

    for _ in 0..3 {
        harness
            .client
            .create_order(create_request("m1", UserRole::Professional))
            .await
            .unwrap();
    }

    assert_eq!(harness.directory_calls.load(Ordering::SeqCst), 1);

    harness.shutdown.cancel();
}

#[tokio::test]
async fn malformed_user_id_is_invalid_argument() {
    let mut harness = setup().await;

    let mut request = create_request("m1", UserRole::Retail);
    request.user_id = "not-a-uuid".to_string();
    let status = harness.client.create_order(request).await.unwrap_err();

    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(error_reason(&status), "INVALID_IDENTIFIER");
    assert!(status.get_error_details().bad_request().is_some());

    harness.shutdown.cancel();
}

#[tokio::test]
async fn update_of_unknown_order_is_not_found() {
    let mut harness = setup().await;

    let status = harness
        .client
        .update_order_status(UpdateOrderStatusRequest {
            order_id: uuid::Uuid::new_v4().to_string(),
            status: OrderStatus::Filled.into(),
        })
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::NotFound);
    assert_eq!(error_reason(&status), "ORDER_NOT_FOUND");

    harness.shutdown.cancel();
}

#[tokio::test]
async fn request_id_is_echoed() {
    let mut harness = setup().await;

    let mut request = Request::new(create_request("m1", UserRole::Retail));
    request
        .metadata_mut()
        .insert("x-request-id", "trace-123".parse().unwrap());
    let response = harness.client.create_order(request).await.unwrap();

    assert_eq!(
        response.metadata().get("x-request-id").unwrap(),
        "trace-123"
    );

    harness.shutdown.cancel();
}

// =============================================================================
// Streaming
// =============================================================================

#[tokio::test]
async fn stream_reports_creation_and_updates() {
    let mut harness = setup().await;

    let mut stream = harness
        .client
        .stream_order_updates(StreamOrderUpdatesRequest {
            user_role: UserRole::Retail.into(),
        })
        .await
        .unwrap()
        .into_inner();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let created = harness
        .client
        .create_order(create_request("m1", UserRole::Retail))
        .await
        .unwrap()
        .into_inner();

    let first = timeout(Duration::from_secs(2), stream.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(first.order_id, created.order_id);
    assert_eq!(first.status, OrderStatus::Created as i32);
    assert!(first.updated_at.is_some());

    harness
        .client
        .update_order_status(UpdateOrderStatusRequest {
            order_id: created.order_id.clone(),
            status: OrderStatus::Filled.into(),
        })
        .await
        .unwrap();

    let second = timeout(Duration::from_secs(2), stream.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(second.order_id, created.order_id);
    assert_eq!(second.status, OrderStatus::Filled as i32);

    harness.shutdown.cancel();
}

#[tokio::test]
async fn stream_skips_orders_created_before_subscribing() {
    let mut harness = setup().await;

    let before = harness
        .client
        .create_order(create_request("m1", UserRole::Retail))
        .await
        .unwrap()
        .into_inner();

    let mut stream = harness
        .client
        .stream_order_updates(StreamOrderUpdatesRequest {
            user_role: UserRole::Retail.into(),
        })
        .await
        .unwrap()
        .into_inner();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let after = harness
        .client
        .create_order(create_request("m1", UserRole::Retail))
        .await
        .unwrap()
        .into_inner();

    let event = timeout(Duration::from_secs(2), stream.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(event.order_id, after.order_id);
    assert_ne!(event.order_id, before.order_id);

    harness.shutdown.cancel();
}

#[tokio::test]
async fn stream_ends_with_cancelled_on_shutdown() {
    let mut harness = setup().await;

    let mut stream = harness
        .client
        .stream_order_updates(StreamOrderUpdatesRequest {
            user_role: UserRole::Admin.into(),
        })
        .await
        .unwrap()
        .into_inner();

    tokio::time::sleep(Duration::from_millis(50)).await;
    harness.shutdown.cancel();

    let status = timeout(Duration::from_secs(2), stream.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap_err();
    assert_eq!(status.code(), Code::Cancelled);
}

#[tokio::test]
async fn stream_rejects_unspecified_role() {
    let mut harness = setup().await;

    let status = harness
        .client
        .stream_order_updates(StreamOrderUpdatesRequest {
            user_role: UserRole::Unspecified.into(),
        })
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::InvalidArgument);

    harness.shutdown.cancel();
}
