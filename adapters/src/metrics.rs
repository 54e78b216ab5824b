//! Partner call metrics

use prometheus::{register_counter_vec, register_histogram_vec, CounterVec, HistogramVec};

lazy_static::lazy_static! {
    /// Partner calls by operation and outcome
    pub static ref PARTNER_REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "partner_requests_total",
        "Total partner API requests",
        &["operation", "status"]
    )
    .unwrap();

    /// Partner call latency by operation
    pub static ref PARTNER_REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "partner_request_duration_seconds",
        "Partner API request duration",
        &["operation"]
    )
    .unwrap();
}

/// Record one finished partner call
pub fn observe(operation: &str, outcome: &str, seconds: f64) {
    PARTNER_REQUESTS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
    PARTNER_REQUEST_DURATION
        .with_label_values(&[operation])
        .observe(seconds);
}
