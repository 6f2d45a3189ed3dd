//! Resilience subsystem: the retrying transport.
//!
//! # Data Flow
//! ```text
//! Request from an API service handle:
//!     → retries.rs (buffer body, send through the wrapped transport)
//!     → classify.rs (Terminal or Retryable?)
//!     → policy.rs (Succeed / RetryAfter(delay) / GiveUp)
//!     → backoff.rs (first_retry_delay * 2^attempt, capped)
//!     → timeouts.rs (stop early if the request's deadline would pass)
//!     → resend, or return the last outcome verbatim
//! ```
//!
//! # Design Decisions
//! - Classification is a pure function, testable without I/O
//! - The policy is immutable and `Copy`; attempt state lives in each call's future
//! - Backoff sleeps on a per-call tokio timer, never a shared one

pub mod backoff;
pub mod classify;
pub mod policy;
pub mod retries;
pub mod timeouts;

pub use classify::{classify, Classification, Outcome};
pub use policy::{AttemptState, PolicyError, RetryDecision, RetryPolicy};
pub use retries::{RetryLayer, RetryTransport};
pub use timeouts::{Deadline, DeadlineExceeded};
