//! Market directory adapters.

mod grpc_client;

pub use grpc_client::GrpcMarketDirectory;
