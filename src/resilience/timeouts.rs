//! Request deadlines.
//!
//! Callers attach a [`Deadline`] to a request's extensions. The retry layer
//! checks it before every retry and gives up with [`DeadlineExceeded`] instead
//! of sleeping past it. Enforcing the deadline on an in-flight attempt is the
//! base transport's job (or wrap the whole call in `tokio::time::timeout`).

use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

/// Absolute point in time after which no further retries are started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(pub Instant);

impl Deadline {
    /// Deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self(Instant::now() + timeout)
    }

    pub fn instant(&self) -> Instant {
        self.0
    }

    /// Whether a retry scheduled `delay` from now would start at or after the deadline.
    pub fn expires_within(&self, delay: Duration) -> bool {
        Instant::now() + delay >= self.0
    }
}

/// Returned instead of retrying once the request's deadline leaves no room for
/// another attempt.
#[derive(Debug, Error)]
#[error("request deadline exceeded after {attempts} attempt(s)")]
pub struct DeadlineExceeded {
    pub attempts: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_expires_within() {
        let deadline = Deadline::after(Duration::from_millis(100));
        assert!(!deadline.expires_within(Duration::from_millis(50)));
        assert!(deadline.expires_within(Duration::from_millis(100)));

        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(deadline.expires_within(Duration::ZERO));
    }

    #[test]
    fn test_error_display() {
        let err = DeadlineExceeded { attempts: 3 };
        assert_eq!(err.to_string(), "request deadline exceeded after 3 attempt(s)");
    }
}
