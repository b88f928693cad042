//! gRPC client for `spot_instrument.v1.SpotInstrumentService`.

use async_trait::async_trait;
use tonic::transport::{Channel, Endpoint};
use tracing::debug;

use crate::application::ports::{MarketDirectoryError, MarketDirectoryPort};
use crate::domain::market::{MarketListing, UserRole};
use crate::infrastructure::grpc::converters::{market_listing_from_proto, user_role_to_proto};
use crate::infrastructure::grpc::proto::spot_instrument::v1::ViewMarketsRequest;
use crate::infrastructure::grpc::proto::spot_instrument::v1::spot_instrument_service_client::SpotInstrumentServiceClient;
use crate::infrastructure::metrics;

/// Market directory reached over gRPC.
#[derive(Debug, Clone)]
pub struct GrpcMarketDirectory {
    client: SpotInstrumentServiceClient<Channel>,
}

impl GrpcMarketDirectory {
    /// Wrap an existing channel.
    #[must_use]
    pub fn new(channel: Channel) -> Self {
        Self {
            client: SpotInstrumentServiceClient::new(channel),
        }
    }

    /// Build a client whose connection is established on first use.
    pub fn connect_lazy(endpoint: &str) -> Result<Self, MarketDirectoryError> {
        let channel = Endpoint::from_shared(endpoint.to_string())
            .map_err(|e| MarketDirectoryError::Unavailable {
                message: format!("invalid endpoint {endpoint}: {e}"),
            })?
            .connect_lazy();
        Ok(Self::new(channel))
    }
}

#[async_trait]
impl MarketDirectoryPort for GrpcMarketDirectory {
    async fn view_markets(&self, role: UserRole) -> Result<MarketListing, MarketDirectoryError> {
        let mut client = self.client.clone();
        let request = ViewMarketsRequest {
            user_role: user_role_to_proto(role).into(),
        };

        let response = client.view_markets(request).await.map_err(|status| {
            metrics::record_directory_failure();
            MarketDirectoryError::Unavailable {
                message: format!("{:?}: {}", status.code(), status.message()),
            }
        })?;

        let listing = market_listing_from_proto(response.into_inner())
            .inspect_err(|_| metrics::record_directory_failure())?;
        debug!(%role, markets = listing.len(), "Market directory responded");
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_endpoint() {
        let err = GrpcMarketDirectory::connect_lazy("not a uri").unwrap_err();
        assert!(matches!(err, MarketDirectoryError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn unreachable_directory_is_unavailable() {
        let directory = GrpcMarketDirectory::connect_lazy("http://127.0.0.1:1").unwrap();

        let err = directory.view_markets(UserRole::Retail).await.unwrap_err();

        assert!(matches!(err, MarketDirectoryError::Unavailable { .. }));
    }
}
