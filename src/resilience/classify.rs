//! Outcome classification.
//!
//! A pure function over the result of one attempt. No I/O, no policy state:
//! whether another attempt is *allowed* is decided by [`RetryPolicy`](super::policy::RetryPolicy).

use hyper::StatusCode;

/// What the base transport produced for one attempt, reduced to the part
/// that matters for retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The server answered with this status.
    Response(StatusCode),
    /// The transport failed before a response arrived (connect, DNS, timeout, ...).
    TransportError,
}

/// Whether an outcome may be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Terminal,
    Retryable,
}

impl Classification {
    pub fn is_retryable(self) -> bool {
        matches!(self, Classification::Retryable)
    }
}

/// Classify one attempt.
///
/// Transport errors are all retryable, malformed requests included. Responses
/// are retryable only for 5xx and 429; everything else goes back to the caller.
pub fn classify(outcome: Outcome) -> Classification {
    match outcome {
        Outcome::TransportError => Classification::Retryable,
        Outcome::Response(status) if status.is_server_error() => Classification::Retryable,
        Outcome::Response(StatusCode::TOO_MANY_REQUESTS) => Classification::Retryable,
        Outcome::Response(_) => Classification::Terminal,
    }
}

/// Short label for logs and metrics.
pub(crate) fn reason(outcome: Outcome) -> String {
    match outcome {
        Outcome::Response(status) => status.as_u16().to_string(),
        Outcome::TransportError => "transport_error".to_string(),
    }
}
