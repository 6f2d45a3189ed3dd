//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! resilience/retries.rs, auth/, client/ produce:
//!     → tracing events (one per retry, token refreshes, client construction)
//!     → metrics.rs (attempt / retry / exhaustion counters)
//!
//! Consumers:
//!     → logging.rs subscriber (pretty or JSON on stdout)
//!     → whatever metrics recorder the embedding process installs
//! ```

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
