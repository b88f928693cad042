//! Protobuf <-> domain conversions.

use chrono::{DateTime, Utc};
use prost_types::Timestamp;
use rust_decimal::Decimal;

use super::proto::orders::v1 as orders_proto;
use super::proto::spot_instrument::v1 as spot_proto;
use crate::application::dto::{CreateOrderDto, OrderStatusEvent};
use crate::application::ports::MarketDirectoryError;
use crate::domain::market::{Market, MarketListing, UserRole};
use crate::domain::order::{OrderStatus, OrderType};
use crate::domain::shared::MarketId;
use crate::error::OrderServiceError;

// =============================================================================
// Enums
// =============================================================================

/// Decode a wire role. `UNSPECIFIED` and unknown values are rejected.
pub fn user_role_from_proto(value: i32) -> Result<UserRole, OrderServiceError> {
    match spot_proto::UserRole::try_from(value) {
        Ok(spot_proto::UserRole::Retail) => Ok(UserRole::Retail),
        Ok(spot_proto::UserRole::Professional) => Ok(UserRole::Professional),
        Ok(spot_proto::UserRole::Institutional) => Ok(UserRole::Institutional),
        Ok(spot_proto::UserRole::Admin) => Ok(UserRole::Admin),
        Ok(spot_proto::UserRole::Unspecified) => Err(OrderServiceError::invalid_argument(
            "user_role",
            "user role must be specified",
        )),
        Err(_) => Err(OrderServiceError::invalid_argument(
            "user_role",
            format!("unknown user role {value}"),
        )),
    }
}

/// Encode a role for the market directory.
#[must_use]
pub const fn user_role_to_proto(role: UserRole) -> spot_proto::UserRole {
    match role {
        UserRole::Retail => spot_proto::UserRole::Retail,
        UserRole::Professional => spot_proto::UserRole::Professional,
        UserRole::Institutional => spot_proto::UserRole::Institutional,
        UserRole::Admin => spot_proto::UserRole::Admin,
    }
}

/// Decode a wire order type. `UNSPECIFIED` and unknown values are rejected.
pub fn order_type_from_proto(value: i32) -> Result<OrderType, OrderServiceError> {
    match orders_proto::OrderType::try_from(value) {
        Ok(orders_proto::OrderType::Market) => Ok(OrderType::Market),
        Ok(orders_proto::OrderType::Limit) => Ok(OrderType::Limit),
        Ok(orders_proto::OrderType::Unspecified) => Err(OrderServiceError::invalid_argument(
            "order_type",
            "order type must be specified",
        )),
        Err(_) => Err(OrderServiceError::invalid_argument(
            "order_type",
            format!("unknown order type {value}"),
        )),
    }
}

/// Decode a wire order status.
pub fn order_status_from_proto(value: i32) -> Result<OrderStatus, OrderServiceError> {
    match orders_proto::OrderStatus::try_from(value) {
        Ok(orders_proto::OrderStatus::Created) => Ok(OrderStatus::Created),
        Ok(orders_proto::OrderStatus::Processing) => Ok(OrderStatus::Processing),
        Ok(orders_proto::OrderStatus::Filled) => Ok(OrderStatus::Filled),
        Ok(orders_proto::OrderStatus::Cancelled) => Ok(OrderStatus::Cancelled),
        Ok(orders_proto::OrderStatus::Rejected) => Ok(OrderStatus::Rejected),
        Err(_) => Err(OrderServiceError::invalid_argument(
            "status",
            format!("unknown order status {value}"),
        )),
    }
}

/// Encode an order status.
#[must_use]
pub const fn order_status_to_proto(status: OrderStatus) -> orders_proto::OrderStatus {
    match status {
        OrderStatus::Created => orders_proto::OrderStatus::Created,
        OrderStatus::Processing => orders_proto::OrderStatus::Processing,
        OrderStatus::Filled => orders_proto::OrderStatus::Filled,
        OrderStatus::Cancelled => orders_proto::OrderStatus::Cancelled,
        OrderStatus::Rejected => orders_proto::OrderStatus::Rejected,
    }
}

// =============================================================================
// Messages
// =============================================================================

fn decimal_from_f64(field: &'static str, value: f64) -> Result<Decimal, OrderServiceError> {
    Decimal::try_from(value).map_err(|_| {
        OrderServiceError::invalid_argument(field, format!("{value} is not a finite decimal"))
    })
}

/// Decode a create request into its role and DTO.
pub fn create_order_from_proto(
    request: orders_proto::CreateOrderRequest,
) -> Result<(UserRole, CreateOrderDto), OrderServiceError> {
    let role = user_role_from_proto(request.user_role)?;
    let dto = CreateOrderDto {
        user_id: request.user_id,
        market_id: request.market_id,
        order_type: order_type_from_proto(request.order_type)?,
        price: decimal_from_f64("price", request.price)?,
        quantity: decimal_from_f64("quantity", request.quantity)?,
    };
    Ok((role, dto))
}

/// Convert a chrono time to a protobuf timestamp.
#[must_use]
pub fn datetime_to_timestamp(dt: DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: dt.timestamp(),
        nanos: i32::try_from(dt.timestamp_subsec_nanos()).unwrap_or(i32::MAX),
    }
}

/// Encode a status event for the stream.
#[must_use]
pub fn status_event_to_proto(event: &OrderStatusEvent) -> orders_proto::OrderStatusUpdate {
    orders_proto::OrderStatusUpdate {
        order_id: event.order_id.to_string(),
        status: order_status_to_proto(event.status).into(),
        updated_at: Some(datetime_to_timestamp(event.updated_at)),
    }
}

/// Rebuild a market listing from a directory response.
///
/// Directory markets carry no state flags, so every market is enabled
/// and not deleted.
pub fn market_listing_from_proto(
    response: spot_proto::ViewMarketsResponse,
) -> Result<MarketListing, MarketDirectoryError> {
    response
        .markets
        .into_iter()
        .map(|market| {
            let id = MarketId::parse(&market.id).map_err(|e| MarketDirectoryError::InvalidResponse {
                message: e.to_string(),
            })?;
            Ok(Market {
                id,
                name: market.name,
                enabled: true,
                deleted_at: None,
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(MarketListing::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(1, UserRole::Retail)]
    #[test_case(2, UserRole::Professional)]
    #[test_case(3, UserRole::Institutional)]
    #[test_case(4, UserRole::Admin)]
    fn decodes_roles(value: i32, expected: UserRole) {
        assert_eq!(user_role_from_proto(value).unwrap(), expected);
        assert_eq!(user_role_to_proto(expected) as i32, value);
    }

    #[test_case(0 ; "unspecified")]
    #[test_case(99 ; "unknown")]
    fn rejects_bad_roles(value: i32) {
        assert!(matches!(
            user_role_from_proto(value),
            Err(OrderServiceError::InvalidArgument { field: "user_role", .. })
        ));
    }

    #[test]
    fn order_status_zero_is_created() {
        assert_eq!(order_status_from_proto(0).unwrap(), OrderStatus::Created);
        assert_eq!(order_status_to_proto(OrderStatus::Rejected) as i32, 4);
        assert!(order_status_from_proto(17).is_err());
    }

    #[test]
    fn create_request_keeps_price_and_quantity() {
        let (role, dto) = create_order_from_proto(orders_proto::CreateOrderRequest {
            user_id: "u".to_string(),
            market_id: "m1".to_string(),
            order_type: orders_proto::OrderType::Limit.into(),
            price: 10.5,
            quantity: 2.0,
            user_role: spot_proto::UserRole::Retail.into(),
        })
        .unwrap();

        assert_eq!(role, UserRole::Retail);
        assert_eq!(dto.order_type, OrderType::Limit);
        assert_eq!(dto.price, Decimal::new(105, 1));
        assert_eq!(dto.quantity, Decimal::new(2, 0));
    }

    #[test]
    fn create_request_rejects_nan_price() {
        let err = create_order_from_proto(orders_proto::CreateOrderRequest {
            user_id: "u".to_string(),
            market_id: "m1".to_string(),
            order_type: orders_proto::OrderType::Market.into(),
            price: f64::NAN,
            quantity: 1.0,
            user_role: spot_proto::UserRole::Retail.into(),
        })
        .unwrap_err();

        assert!(matches!(err, OrderServiceError::InvalidArgument { field: "price", .. }));
    }

    #[test]
    fn listing_from_directory_response() {
        let listing = market_listing_from_proto(spot_proto::ViewMarketsResponse {
            markets: vec![
                spot_proto::Market {
                    id: "m1".to_string(),
                    name: "BTC-USD".to_string(),
                },
                spot_proto::Market {
                    id: "m2".to_string(),
                    name: "ETH-USD".to_string(),
                },
            ],
        })
        .unwrap();

        assert_eq!(listing.len(), 2);
        assert!(listing.markets().iter().all(Market::is_tradable));
    }

    #[test]
    fn listing_rejects_blank_market_id() {
        let err = market_listing_from_proto(spot_proto::ViewMarketsResponse {
            markets: vec![spot_proto::Market {
                id: String::new(),
                name: "ghost".to_string(),
            }],
        })
        .unwrap_err();

        assert!(matches!(err, MarketDirectoryError::InvalidResponse { .. }));
    }

    #[test]
    fn timestamp_conversion() {
        let dt = DateTime::from_timestamp(1_700_000_000, 250).unwrap();
        let ts = datetime_to_timestamp(dt);
        assert_eq!(ts.seconds, 1_700_000_000);
        assert_eq!(ts.nanos, 250);
    }
}
