//! gRPC Transport
//!
//! Inbound `orders.v1.OrderService` adapter, the request-id interceptor,
//! and protobuf conversions shared with the outbound market directory
//! client.

pub mod converters;
pub mod interceptor;
pub mod server;

// Allow clippy warnings and missing docs in generated code
#[allow(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
pub mod proto {
    pub mod orders {
        pub mod v1 {
            include!("../../../../../packages/schema-gen/rust/orders/v1/orders.v1.rs");
        }
    }

    pub mod spot_instrument {
        pub mod v1 {
            include!(
                "../../../../../packages/schema-gen/rust/spot_instrument/v1/spot_instrument.v1.rs"
            );
        }
    }
}

pub use interceptor::{REQUEST_ID_HEADER, RequestId, request_id_interceptor};
pub use server::OrderServiceAdapter;
