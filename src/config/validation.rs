//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (delays > 0, body limit > 0)
//! - Check endpoints are absolute http(s) URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CpiConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::CpiConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("google.project must not be empty")]
    EmptyProject,

    #[error("google.default_root_disk_type must not be empty")]
    EmptyDiskType,

    #[error("retries.first_retry_delay_ms must be greater than zero")]
    ZeroFirstRetryDelay,

    #[error("retries.max_retry_delay_ms ({max}) must be at least first_retry_delay_ms ({first})")]
    MaxDelayBelowFirst { first: u64, max: u64 },

    #[error("retries.max_buffered_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("endpoints.{name}: {reason}")]
    InvalidEndpoint { name: &'static str, reason: String },
}

pub fn validate_config(config: &CpiConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.google.project.trim().is_empty() {
        errors.push(ValidationError::EmptyProject);
    }
    if config.google.default_root_disk_type.trim().is_empty() {
        errors.push(ValidationError::EmptyDiskType);
    }

    let retries = &config.retries;
    if retries.first_retry_delay_ms == 0 {
        errors.push(ValidationError::ZeroFirstRetryDelay);
    } else if retries.max_retry_delay_ms < retries.first_retry_delay_ms {
        errors.push(ValidationError::MaxDelayBelowFirst {
            first: retries.first_retry_delay_ms,
            max: retries.max_retry_delay_ms,
        });
    }
    if retries.max_buffered_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let endpoints = [
        ("compute", &config.endpoints.compute),
        ("compute_beta", &config.endpoints.compute_beta),
        ("storage", &config.endpoints.storage),
    ];
    for (name, raw) in endpoints {
        if let Err(reason) = check_endpoint(raw) {
            errors.push(ValidationError::InvalidEndpoint { name, reason });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_endpoint(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}
