//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_requests_total` (counter): requests by method, status
//! - `gate_request_duration_seconds` (histogram): latency distribution
//! - `gate_rate_limited_total` (counter): rejections by collection, operation
//! - `gate_fields_excluded_total` (counter): filtered list responses by collection

use std::net::SocketAddr;
use std::time::Instant;

use ::metrics::Label;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::security::rate_limit::Operation;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let labels = vec![
        Label::new("method", method.to_string()),
        Label::new("status", status.to_string()),
    ];
    ::metrics::counter!("gate_requests_total", labels.clone()).increment(1);
    ::metrics::histogram!("gate_request_duration_seconds", labels)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited(collection: &str, operation: Operation) {
    ::metrics::counter!(
        "gate_rate_limited_total",
        "collection" => collection.to_string(),
        "operation" => operation.as_str()
    )
    .increment(1);
}

pub fn record_fields_excluded(collection: &str) {
    ::metrics::counter!("gate_fields_excluded_total", "collection" => collection.to_string())
        .increment(1);
}
