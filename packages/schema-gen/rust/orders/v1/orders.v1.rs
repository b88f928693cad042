// @generated
// This file is @generated by prost-build.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateOrderRequest {
    #[prost(string, tag="1")]
    pub user_id: ::prost::alloc::string::String,
    #[prost(string, tag="2")]
    pub market_id: ::prost::alloc::string::String,
    #[prost(enumeration="OrderType", tag="3")]
    pub order_type: i32,
    #[prost(double, tag="4")]
    pub price: f64,
    #[prost(double, tag="5")]
    pub quantity: f64,
    #[prost(enumeration="super::super::spot_instrument::v1::UserRole", tag="6")]
    pub user_role: i32,
}
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct CreateOrderResponse {
    #[prost(string, tag="1")]
    pub order_id: ::prost::alloc::string::String,
    #[prost(enumeration="OrderStatus", tag="2")]
    pub status: i32,
}
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct GetOrderStatusRequest {
    #[prost(string, tag="1")]
    pub order_id: ::prost::alloc::string::String,
    #[prost(string, tag="2")]
    pub user_id: ::prost::alloc::string::String,
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct GetOrderStatusResponse {
    #[prost(enumeration="OrderStatus", tag="1")]
    pub status: i32,
}
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct UpdateOrderStatusRequest {
    #[prost(string, tag="1")]
    pub order_id: ::prost::alloc::string::String,
    #[prost(enumeration="OrderStatus", tag="2")]
    pub status: i32,
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct UpdateOrderStatusResponse {
    #[prost(enumeration="OrderStatus", tag="1")]
    pub status: i32,
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct StreamOrderUpdatesRequest {
    #[prost(enumeration="super::super::spot_instrument::v1::UserRole", tag="1")]
    pub user_role: i32,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OrderStatusUpdate {
    #[prost(string, tag="1")]
    pub order_id: ::prost::alloc::string::String,
    #[prost(enumeration="OrderStatus", tag="2")]
    pub status: i32,
    #[prost(message, optional, tag="3")]
    pub updated_at: ::core::option::Option<::prost_types::Timestamp>,
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum OrderType {
    Unspecified = 0,
    Market = 1,
    Limit = 2,
}
impl OrderType {
    /// String value of the enum field names used in the ProtoBuf definition.
    ///
    /// The values are not transformed in any way and thus are considered stable
    /// (if the ProtoBuf definition does not change) and safe for programmatic use.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Self::Unspecified => "ORDER_TYPE_UNSPECIFIED",
            Self::Market => "ORDER_TYPE_MARKET",
            Self::Limit => "ORDER_TYPE_LIMIT",
        }
    }
    /// Creates an enum from field names used in the ProtoBuf definition.
    pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
        match value {
            "ORDER_TYPE_UNSPECIFIED" => Some(Self::Unspecified),
            "ORDER_TYPE_MARKET" => Some(Self::Market),
            "ORDER_TYPE_LIMIT" => Some(Self::Limit),
            _ => None,
        }
    }
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum OrderStatus {
    Created = 0,
    Processing = 1,
    Filled = 2,
    Cancelled = 3,
    Rejected = 4,
}
impl OrderStatus {
    /// String value of the enum field names used in the ProtoBuf definition.
    ///
    /// The values are not transformed in any way and thus are considered stable
    /// (if the ProtoBuf definition does not change) and safe for programmatic use.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Self::Created => "ORDER_STATUS_CREATED",
            Self::Processing => "ORDER_STATUS_PROCESSING",
            Self::Filled => "ORDER_STATUS_FILLED",
            Self::Cancelled => "ORDER_STATUS_CANCELLED",
            Self::Rejected => "ORDER_STATUS_REJECTED",
        }
    }
    /// Creates an enum from field names used in the ProtoBuf definition.
    pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
        match value {
            "ORDER_STATUS_CREATED" => Some(Self::Created),
            "ORDER_STATUS_PROCESSING" => Some(Self::Processing),
            "ORDER_STATUS_FILLED" => Some(Self::Filled),
            "ORDER_STATUS_CANCELLED" => Some(Self::Cancelled),
            "ORDER_STATUS_REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }
}
include!("orders.v1.tonic.rs");
// @@protoc_insertion_point(module)
