// @generated
// This file is @generated by prost-build.
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct ViewMarketsRequest {
    #[prost(enumeration="UserRole", tag="1")]
    pub user_role: i32,
}
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct Market {
    #[prost(string, tag="1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, tag="2")]
    pub name: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct ViewMarketsResponse {
    #[prost(message, repeated, tag="1")]
    pub markets: ::prost::alloc::vec::Vec<Market>,
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum UserRole {
    Unspecified = 0,
    Retail = 1,
    Professional = 2,
    Institutional = 3,
    Admin = 4,
}
impl UserRole {
    /// String value of the enum field names used in the ProtoBuf definition.
    ///
    /// The values are not transformed in any way and thus are considered stable
    /// (if the ProtoBuf definition does not change) and safe for programmatic use.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Self::Unspecified => "USER_ROLE_UNSPECIFIED",
            Self::Retail => "USER_ROLE_RETAIL",
            Self::Professional => "USER_ROLE_PROFESSIONAL",
            Self::Institutional => "USER_ROLE_INSTITUTIONAL",
            Self::Admin => "USER_ROLE_ADMIN",
        }
    }
    /// Creates an enum from field names used in the ProtoBuf definition.
    pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
        match value {
            "USER_ROLE_UNSPECIFIED" => Some(Self::Unspecified),
            "USER_ROLE_RETAIL" => Some(Self::Retail),
            "USER_ROLE_PROFESSIONAL" => Some(Self::Professional),
            "USER_ROLE_INSTITUTIONAL" => Some(Self::Institutional),
            "USER_ROLE_ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }
}
include!("spot_instrument.v1.tonic.rs");
// @@protoc_insertion_point(module)
