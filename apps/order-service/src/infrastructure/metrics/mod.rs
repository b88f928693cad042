//! Prometheus Metrics Module
//!
//! Exposes service metrics in Prometheus format.
//!
//! # Metrics Categories
//!
//! - **Requests**: RPC counts and latency by method and status code
//! - **Orders**: created, rejected and status updates
//! - **Markets**: cache hits and misses, directory failures
//! - **Streaming**: active subscribers and delivered events
//!
//! # Integration
//!
//! Metrics are exposed at `/metrics` on the health server port.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// Calling this more than once returns the handle installed first.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();
    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(
        "order_service_requests_total",
        "Total gRPC requests by method and status code"
    );
    describe_histogram!(
        "order_service_request_duration_seconds",
        "gRPC request handling latency"
    );

    describe_counter!("order_service_orders_created_total", "Total orders created");
    describe_counter!(
        "order_service_orders_rejected_total",
        "Total order creations rejected, by reason"
    );
    describe_counter!(
        "order_service_status_updates_total",
        "Total order status updates applied"
    );

    describe_counter!(
        "order_service_market_cache_lookups_total",
        "Market listing cache lookups by result (hit, miss, error)"
    );
    describe_counter!(
        "order_service_market_directory_failures_total",
        "Failed market directory lookups"
    );

    describe_gauge!(
        "order_service_stream_subscribers",
        "Number of active status stream subscribers"
    );
    describe_counter!(
        "order_service_stream_events_total",
        "Total status events delivered to subscribers"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Outcome of a market cache read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookup {
    /// Value found.
    Hit,
    /// Key absent or expired.
    Miss,
    /// Backend failed.
    Error,
}

impl CacheLookup {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Error => "error",
        }
    }
}

/// Record a finished RPC.
pub fn record_request(method: &'static str, code: tonic::Code, duration: Duration) {
    counter!(
        "order_service_requests_total",
        "method" => method,
        "code" => format!("{code:?}")
    )
    .increment(1);
    histogram!(
        "order_service_request_duration_seconds",
        "method" => method
    )
    .record(duration.as_secs_f64());
}

/// Record a created order.
pub fn record_order_created() {
    counter!("order_service_orders_created_total").increment(1);
}

/// Record a rejected order creation.
pub fn record_order_rejected(reason: &'static str) {
    counter!("order_service_orders_rejected_total", "reason" => reason).increment(1);
}

/// Record an applied status update.
pub fn record_status_update() {
    counter!("order_service_status_updates_total").increment(1);
}

/// Record a market cache read.
pub fn record_cache_lookup(result: CacheLookup) {
    counter!(
        "order_service_market_cache_lookups_total",
        "result" => result.as_str()
    )
    .increment(1);
}

/// Record a failed market directory lookup.
pub fn record_directory_failure() {
    counter!("order_service_market_directory_failures_total").increment(1);
}

/// Adjust the active subscriber gauge.
pub fn set_stream_subscribers(count: f64) {
    gauge!("order_service_stream_subscribers").set(count);
}

/// Record a delivered status event.
pub fn record_stream_event() {
    counter!("order_service_stream_events_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_lookup_as_str() {
        assert_eq!(CacheLookup::Hit.as_str(), "hit");
        assert_eq!(CacheLookup::Miss.as_str(), "miss");
        assert_eq!(CacheLookup::Error.as_str(), "error");
    }

    #[test]
    fn recording_without_recorder_is_noop() {
        record_order_created();
        record_cache_lookup(CacheLookup::Miss);
        record_request("CreateOrder", tonic::Code::Ok, Duration::from_millis(3));
    }
}
