//! Request-id interceptor.
//!
//! Every inbound call gets a request id: the caller's `x-request-id`
//! header when present and printable, otherwise a fresh UUID v4. The id
//! is stored in the request extensions for handler spans and echoed
//! back in response metadata by the adapter.

use std::fmt;

use tonic::{Request, Status};

/// Metadata key carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id attached to every inbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    /// Wrap an existing id.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generate a fresh id.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Request id attached to `request`, or a fresh one if the
    /// interceptor did not run.
    pub fn from_request<T>(request: &Request<T>) -> Self {
        request
            .extensions()
            .get::<Self>()
            .cloned()
            .unwrap_or_else(Self::generate)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tonic interceptor that attaches a [`RequestId`] to the request.
#[allow(clippy::unnecessary_wraps)]
pub fn request_id_interceptor(mut request: Request<()>) -> Result<Request<()>, Status> {
    let request_id = request
        .metadata()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map_or_else(RequestId::generate, RequestId::new);

    request.extensions_mut().insert(request_id);
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuses_incoming_header() {
        let mut request = Request::new(());
        request
            .metadata_mut()
            .insert(REQUEST_ID_HEADER, "req-42".parse().unwrap());

        let request = request_id_interceptor(request).unwrap();

        assert_eq!(RequestId::from_request(&request).as_str(), "req-42");
    }

    #[test]
    fn generates_when_missing() {
        let request = request_id_interceptor(Request::new(())).unwrap();
        let id = RequestId::from_request(&request);

        assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn blank_header_is_replaced() {
        let mut request = Request::new(());
        request
            .metadata_mut()
            .insert(REQUEST_ID_HEADER, "  ".parse().unwrap());

        let request = request_id_interceptor(request).unwrap();

        assert!(uuid::Uuid::parse_str(RequestId::from_request(&request).as_str()).is_ok());
    }
}
