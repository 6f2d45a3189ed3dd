//! Exponential backoff.

use std::time::Duration;

/// Delay before retry number `attempt + 1`, where `attempt` counts the
/// retries already made (0 for the first retry).
///
/// `first * 2^attempt`, capped at `max`. No jitter: callers rely on the
/// schedule being exact.
pub fn calculate_backoff(attempt: u32, first: Duration, max: Duration) -> Duration {
    let factor = 2u32.saturating_pow(attempt);
    first.saturating_mul(factor).min(max)
}
