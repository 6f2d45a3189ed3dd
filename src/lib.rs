//! Google Compute and Storage clients with a retrying HTTP transport.

pub mod auth;
pub mod client;
pub mod config;
pub mod net;
pub mod observability;
pub mod resilience;

pub use client::{ApiError, ApiService, ClientError, GoogleClient, ServiceClientFactory};
pub use config::CpiConfig;
pub use resilience::{RetryLayer, RetryPolicy, RetryTransport};
