//! Transport metrics.
//!
//! # Metrics
//! - `cpi_http_attempts_total` (counter): requests sent to the remote API, by transport
//! - `cpi_http_retries_total` (counter): retries scheduled, by transport and reason
//! - `cpi_http_retries_exhausted_total` (counter): requests that ran out of retries
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! embedding process installs a recorder.

pub fn record_attempt(transport: &str) {
    metrics::counter!("cpi_http_attempts_total", "transport" => transport.to_string())
        .increment(1);
}

pub fn record_retry(transport: &str, reason: String) {
    metrics::counter!(
        "cpi_http_retries_total",
        "transport" => transport.to_string(),
        "reason" => reason
    )
    .increment(1);
}

pub fn record_exhausted(transport: &str) {
    metrics::counter!("cpi_http_retries_exhausted_total", "transport" => transport.to_string())
        .increment(1);
}
