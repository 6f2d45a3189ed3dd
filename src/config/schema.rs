//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML. Every section
//! has defaults so a config file only needs the project.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::resilience::policy::{
    PolicyError, RetryPolicy, DEFAULT_FIRST_RETRY_DELAY, DEFAULT_MAX_RETRIES,
    DEFAULT_MAX_RETRY_DELAY,
};
use crate::resilience::retries::DEFAULT_MAX_BODY_BYTES;

/// Root configuration for the client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CpiConfig {
    /// Project, credentials and provisioning defaults.
    pub google: GoogleConfig,

    /// Remote API base URLs.
    pub endpoints: EndpointConfig,

    /// Retry configuration.
    pub retries: RetryConfig,

    /// Connection timeouts.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl CpiConfig {
    /// User agent sent with every request.
    pub fn user_agent(&self) -> String {
        let agent = format!("google-cpi-client/{}", env!("CARGO_PKG_VERSION"));
        let prefix = self.google.user_agent_prefix.trim();
        if prefix.is_empty() {
            agent
        } else {
            format!("{} {}", prefix, agent)
        }
    }
}

/// Google Cloud settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// Project identifier.
    pub project: String,

    /// Service account key JSON. Empty means default credential discovery.
    pub json_key: String,

    /// Root disk size used when a request does not specify one.
    pub default_root_disk_size_gb: u32,

    /// Root disk type used when a request does not specify one.
    pub default_root_disk_type: String,

    /// Prepended to the user agent (e.g. the calling tool's name/version).
    pub user_agent_prefix: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            json_key: String::new(),
            default_root_disk_size_gb: 10,
            default_root_disk_type: "pd-standard".to_string(),
            user_agent_prefix: String::new(),
        }
    }
}

/// Base URLs of the remote APIs. Must end with `/` (added if missing).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub compute: String,
    pub compute_beta: String,
    pub storage: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            compute: "https://compute.googleapis.com/compute/v1/".to_string(),
            compute_beta: "https://compute.googleapis.com/compute/beta/".to_string(),
            storage: "https://storage.googleapis.com/storage/v1/".to_string(),
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds; doubles on each retry.
    pub first_retry_delay_ms: u64,

    /// Ceiling on any single delay in milliseconds.
    pub max_retry_delay_ms: u64,

    /// Largest request body buffered for replay.
    pub max_buffered_body_bytes: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            first_retry_delay_ms: DEFAULT_FIRST_RETRY_DELAY.as_millis() as u64,
            max_retry_delay_ms: DEFAULT_MAX_RETRY_DELAY.as_millis() as u64,
            max_buffered_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> Result<RetryPolicy, PolicyError> {
        RetryPolicy::with_max_delay(
            self.max_retries,
            Duration::from_millis(self.first_retry_delay_ms),
            Duration::from_millis(self.max_retry_delay_ms),
        )
    }
}

/// Timeout configuration for the base transport.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// How long idle pooled connections are kept, in seconds.
    pub pool_idle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            pool_idle_secs: 90,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}
