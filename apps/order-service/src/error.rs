//! Rich error handling for the order service.
//!
//! Every failure an RPC can report is an [`OrderServiceError`]. At the
//! gRPC boundary it is converted into a `tonic::Status` carrying an
//! `ErrorInfo` detail (and a `BadRequest` detail for validation errors)
//! via `tonic-types`.
//!
//! # gRPC Status Codes
//!
//! | Code | Usage |
//! |------|-------|
//! | `INVALID_ARGUMENT` (3) | Malformed identifier, price, quantity or enum |
//! | `NOT_FOUND` (5) | Unknown order, or market absent from the listing |
//! | `PERMISSION_DENIED` (7) | Order owned by another user |
//! | `CANCELLED` (1) | Caller or server cancelled the operation |
//! | `UNAVAILABLE` (14) | Market directory unreachable or timed out |
//! | `INTERNAL` (13) | Order identifier collision, handler panic |

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tonic::Code;
use tonic_types::{ErrorDetails, StatusExt};

use crate::application::ports::{MarketCacheError, MarketDirectoryError};
use crate::domain::order::{OrderValidationError, StoreError};
use crate::domain::shared::{OrderId, ParseIdError};

/// Domain for order service errors.
pub const ERROR_DOMAIN: &str = "orders.service";

/// Stable error codes reported in `ErrorInfo.reason`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed identifier.
    InvalidIdentifier,
    /// Invalid price, quantity or enum value.
    InvalidArgument,
    /// Market not present in the caller's listing.
    MarketNotFound,
    /// Order not found.
    OrderNotFound,
    /// Order owned by another user.
    Forbidden,
    /// Generated order identifier collided.
    AlreadyExists,
    /// Market directory unreachable.
    UpstreamUnavailable,
    /// Market cache unreachable.
    CacheUnavailable,
    /// Operation cancelled.
    Cancelled,
    /// Unexpected failure inside a handler.
    Internal,
}

impl ErrorCode {
    /// Get the gRPC status code for this error.
    #[must_use]
    pub const fn grpc_code(&self) -> Code {
        match self {
            Self::InvalidIdentifier | Self::InvalidArgument => Code::InvalidArgument,
            Self::MarketNotFound | Self::OrderNotFound => Code::NotFound,
            Self::Forbidden => Code::PermissionDenied,
            Self::AlreadyExists | Self::CacheUnavailable | Self::Internal => Code::Internal,
            Self::UpstreamUnavailable => Code::Unavailable,
            Self::Cancelled => Code::Cancelled,
        }
    }

    /// Get the error reason string (for gRPC `ErrorInfo`).
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier => "INVALID_IDENTIFIER",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::MarketNotFound => "MARKET_NOT_FOUND",
            Self::OrderNotFound => "ORDER_NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            Self::CacheUnavailable => "CACHE_UNAVAILABLE",
            Self::Cancelled => "CANCELLED",
            Self::Internal => "INTERNAL",
        }
    }

    const fn is_validation(self) -> bool {
        matches!(self, Self::InvalidIdentifier | Self::InvalidArgument)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

/// Errors surfaced by the order service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderServiceError {
    /// An identifier in the request could not be parsed.
    #[error(transparent)]
    InvalidIdentifier(#[from] ParseIdError),

    /// A request field holds an unacceptable value.
    #[error("invalid {field}: {message}")]
    InvalidArgument {
        /// Offending request field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// The requested market is not in the caller's listing.
    #[error("market {market_id} not found")]
    MarketNotFound {
        /// Requested market.
        market_id: String,
    },

    /// No order with this identifier exists.
    #[error("order {order_id} not found")]
    NotFound {
        /// Requested order.
        order_id: OrderId,
    },

    /// The order belongs to another user.
    #[error("order {order_id} does not belong to the requesting user")]
    Forbidden {
        /// Requested order.
        order_id: OrderId,
    },

    /// The store generated an identifier that already exists.
    #[error("order {order_id} already exists")]
    AlreadyExists {
        /// Colliding identifier.
        order_id: OrderId,
    },

    /// The market directory could not answer.
    #[error(transparent)]
    UpstreamUnavailable(#[from] MarketDirectoryError),

    /// The market cache could not answer. Logged, never returned by the gateway.
    #[error(transparent)]
    CacheUnavailable(#[from] MarketCacheError),

    /// The operation was cancelled before it completed.
    #[error("operation cancelled")]
    Cancelled,

    /// A handler failed unexpectedly.
    #[error("internal error: {message}")]
    Internal {
        /// Failure description.
        message: String,
    },
}

impl OrderServiceError {
    /// Build an invalid-argument error for `field`.
    #[must_use]
    pub fn invalid_argument(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            message: message.into(),
        }
    }

    /// Get the error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidIdentifier(_) => ErrorCode::InvalidIdentifier,
            Self::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Self::MarketNotFound { .. } => ErrorCode::MarketNotFound,
            Self::NotFound { .. } => ErrorCode::OrderNotFound,
            Self::Forbidden { .. } => ErrorCode::Forbidden,
            Self::AlreadyExists { .. } => ErrorCode::AlreadyExists,
            Self::UpstreamUnavailable(_) => ErrorCode::UpstreamUnavailable,
            Self::CacheUnavailable(_) => ErrorCode::CacheUnavailable,
            Self::Cancelled => ErrorCode::Cancelled,
            Self::Internal { .. } => ErrorCode::Internal,
        }
    }

    fn context(&self) -> HashMap<String, String> {
        let mut metadata = HashMap::new();
        match self {
            Self::InvalidIdentifier(err) => {
                metadata.insert("field".to_string(), err.kind.to_string());
            }
            Self::InvalidArgument { field, .. } => {
                metadata.insert("field".to_string(), (*field).to_string());
            }
            Self::MarketNotFound { market_id } => {
                metadata.insert("market_id".to_string(), market_id.clone());
            }
            Self::NotFound { order_id }
            | Self::Forbidden { order_id }
            | Self::AlreadyExists { order_id } => {
                metadata.insert("order_id".to_string(), order_id.to_string());
            }
            Self::UpstreamUnavailable(_)
            | Self::CacheUnavailable(_)
            | Self::Cancelled
            | Self::Internal { .. } => {}
        }
        metadata
    }

    /// Convert to a tonic Status with rich error details.
    #[must_use]
    pub fn to_status(&self) -> tonic::Status {
        let code = self.code();
        let message = self.to_string();
        let mut details = ErrorDetails::new();
        details.set_error_info(code.reason(), ERROR_DOMAIN, self.context());

        if code.is_validation() {
            let field = match self {
                Self::InvalidIdentifier(err) => err.kind,
                Self::InvalidArgument { field, .. } => *field,
                _ => "request",
            };
            details.add_bad_request_violation(field, &message);
        }

        tonic::Status::with_error_details(code.grpc_code(), &message, details)
    }
}

impl From<StoreError> for OrderServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { order_id } => Self::NotFound { order_id },
            StoreError::Forbidden { order_id } => Self::Forbidden { order_id },
            StoreError::AlreadyExists { order_id } => Self::AlreadyExists { order_id },
        }
    }
}

impl From<OrderValidationError> for OrderServiceError {
    fn from(err: OrderValidationError) -> Self {
        Self::invalid_argument(err.field(), err.to_string())
    }
}

impl From<OrderServiceError> for tonic::Status {
    fn from(err: OrderServiceError) -> Self {
        err.to_status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(ErrorCode::InvalidIdentifier, Code::InvalidArgument)]
    #[test_case(ErrorCode::InvalidArgument, Code::InvalidArgument)]
    #[test_case(ErrorCode::MarketNotFound, Code::NotFound)]
    #[test_case(ErrorCode::OrderNotFound, Code::NotFound)]
    #[test_case(ErrorCode::Forbidden, Code::PermissionDenied)]
    #[test_case(ErrorCode::AlreadyExists, Code::Internal)]
    #[test_case(ErrorCode::UpstreamUnavailable, Code::Unavailable)]
    #[test_case(ErrorCode::Cancelled, Code::Cancelled)]
    #[test_case(ErrorCode::Internal, Code::Internal)]
    fn error_code_grpc_mapping(code: ErrorCode, expected: Code) {
        assert_eq!(code.grpc_code(), expected);
    }

    #[test]
    fn store_errors_keep_their_meaning() {
        let order_id = OrderId::generate();
        assert_eq!(
            OrderServiceError::from(StoreError::Forbidden { order_id }).code(),
            ErrorCode::Forbidden
        );
        assert_eq!(
            OrderServiceError::from(StoreError::NotFound { order_id }).code(),
            ErrorCode::OrderNotFound
        );
    }

    #[test]
    fn market_not_found_status_carries_error_info() {
        let status = OrderServiceError::MarketNotFound {
            market_id: "m9".to_string(),
        }
        .to_status();

        assert_eq!(status.code(), Code::NotFound);
        assert!(status.message().contains("m9"));

        let details = status.get_error_details();
        let info = details.error_info().unwrap();
        assert_eq!(info.reason, "MARKET_NOT_FOUND");
        assert_eq!(info.domain, ERROR_DOMAIN);
        assert_eq!(info.metadata.get("market_id").map(String::as_str), Some("m9"));
    }

    #[test]
    fn invalid_identifier_status_has_bad_request() {
        let err = OrderServiceError::from(ParseIdError {
            kind: "user_id",
            value: "nope".to_string(),
        });
        let status = err.to_status();

        assert_eq!(status.code(), Code::InvalidArgument);
        let details = status.get_error_details();
        let bad_request = details.bad_request().unwrap();
        assert_eq!(bad_request.field_violations[0].field, "user_id");
    }

    #[test]
    fn validation_error_becomes_invalid_argument() {
        let err = OrderServiceError::from(OrderValidationError::NonPositiveQuantity("0".into()));
        assert_eq!(
            err,
            OrderServiceError::InvalidArgument {
                field: "quantity",
                message: "quantity must be positive, got 0".to_string(),
            }
        );
    }

    #[test]
    fn upstream_failure_is_unavailable() {
        let status: tonic::Status = OrderServiceError::from(MarketDirectoryError::Timeout {
            timeout_ms: 5000,
        })
        .into();
        assert_eq!(status.code(), Code::Unavailable);
    }
}
