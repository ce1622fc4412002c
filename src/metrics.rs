//! Operational metrics with Prometheus.
//!
//! HTTP traffic plus the export pipeline, which is the one expensive code
//! path in this service. No user identifiers in labels to keep cardinality
//! bounded.

use lazy_static::lazy_static;
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

lazy_static! {
    /// Global metrics registry
    pub static ref METRICS_REGISTRY: Registry = Registry::new();

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "riise_http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["method", "endpoint", "status"]
    ).unwrap();

    /// Total HTTP requests
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("riise_http_requests_total", "Total HTTP requests"),
        &["method", "endpoint", "status"]
    ).unwrap();

    /// PDF export operations by report kind and outcome
    pub static ref EXPORT_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("riise_export_total", "Total report export operations"),
        &["kind", "result"]
    ).unwrap();

    /// End-to-end export duration (aggregate + charts + compose)
    pub static ref EXPORT_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "riise_export_duration_seconds",
            "Report export duration in seconds"
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0])
    ).unwrap();
}

/// Register all metrics with the global registry. Call once at startup.
pub fn register_metrics() -> Result<(), prometheus::Error> {
    METRICS_REGISTRY.register(Box::new(HTTP_REQUEST_DURATION.clone()))?;
    METRICS_REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    METRICS_REGISTRY.register(Box::new(EXPORT_TOTAL.clone()))?;
    METRICS_REGISTRY.register(Box::new(EXPORT_DURATION.clone()))?;
    Ok(())
}

/// Render the registry in Prometheus text exposition format.
pub fn gather() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if encoder
        .encode(&METRICS_REGISTRY.gather(), &mut buffer)
        .is_err()
    {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
