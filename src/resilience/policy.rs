//! Retry policy and per-request attempt state.

use std::time::Duration;

use axum::body::Bytes;
use thiserror::Error;

use crate::resilience::backoff::calculate_backoff;
use crate::resilience::classify::Classification;

/// Retries attempted after the first request.
pub const DEFAULT_MAX_RETRIES: u32 = 12;

/// Delay before the first retry.
pub const DEFAULT_FIRST_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Upper bound on a single backoff delay.
///
/// Above the largest delay of the default schedule (50ms * 2^11 = 102.4s), so
/// the defaults never hit it.
pub const DEFAULT_MAX_RETRY_DELAY: Duration = Duration::from_secs(120);

/// Invalid retry policy parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("first retry delay must be greater than zero")]
    ZeroFirstDelay,

    #[error("max retry delay {max:?} is shorter than first retry delay {first:?}")]
    MaxBelowFirst { first: Duration, max: Duration },
}

/// Immutable retry configuration, shared by every request through a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    first_retry_delay: Duration,
    max_retry_delay: Duration,
}

/// What to do after an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Return the outcome as-is.
    Succeed,
    /// Sleep, then send again.
    RetryAfter(Duration),
    /// Retries exhausted; return the last outcome as-is.
    GiveUp,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, first_retry_delay: Duration) -> Result<Self, PolicyError> {
        Self::with_max_delay(
            max_retries,
            first_retry_delay,
            DEFAULT_MAX_RETRY_DELAY.max(first_retry_delay),
        )
    }

    pub fn with_max_delay(
        max_retries: u32,
        first_retry_delay: Duration,
        max_retry_delay: Duration,
    ) -> Result<Self, PolicyError> {
        if first_retry_delay.is_zero() {
            return Err(PolicyError::ZeroFirstDelay);
        }
        if max_retry_delay < first_retry_delay {
            return Err(PolicyError::MaxBelowFirst {
                first: first_retry_delay,
                max: max_retry_delay,
            });
        }
        Ok(Self {
            max_retries,
            first_retry_delay,
            max_retry_delay,
        })
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn first_retry_delay(&self) -> Duration {
        self.first_retry_delay
    }

    pub fn max_retry_delay(&self) -> Duration {
        self.max_retry_delay
    }

    /// Upper bound on requests sent per logical request.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Backoff before retry number `attempt + 1`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, self.first_retry_delay, self.max_retry_delay)
    }

    /// Decide what follows attempt number `attempt` (0-based) given its classification.
    pub fn decide(&self, attempt: u32, classification: Classification) -> RetryDecision {
        match classification {
            Classification::Terminal => RetryDecision::Succeed,
            Classification::Retryable if attempt < self.max_retries => {
                RetryDecision::RetryAfter(self.delay_for(attempt))
            }
            Classification::Retryable => RetryDecision::GiveUp,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            first_retry_delay: DEFAULT_FIRST_RETRY_DELAY,
            max_retry_delay: DEFAULT_MAX_RETRY_DELAY,
        }
    }
}

/// State of one in-flight retry loop. Never shared between requests.
#[derive(Debug)]
pub struct AttemptState {
    attempt: u32,
    total_delay: Duration,
    body: Bytes,
}

impl AttemptState {
    pub fn new(body: Bytes) -> Self {
        Self {
            attempt: 0,
            total_delay: Duration::ZERO,
            body,
        }
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn total_delay(&self) -> Duration {
        self.total_delay
    }

    /// A fresh handle on the buffered body. Cheap: `Bytes` is reference counted.
    pub fn body(&self) -> Bytes {
        self.body.clone()
    }

    /// Record a backoff and move on to the next attempt.
    pub fn advance(&mut self, delay: Duration) {
        self.attempt += 1;
        self.total_delay += delay;
    }
}
