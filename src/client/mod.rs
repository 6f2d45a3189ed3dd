//! Google API client subsystem.
//!
//! # Data Flow
//! ```text
//! CpiConfig + CredentialSource
//!     → factory.rs (ServiceClientFactory: per-scope token sources, layered clients)
//!     → service.rs (ApiService handles: compute v1, compute beta, storage v1)
//!
//! Per request:
//!     ApiService::call_json
//!         → SetRequestHeader (User-Agent)
//!         → resilience::RetryTransport
//!         → auth::AuthService (Authorization)
//!         → net::HttpClient (hyper-util pool, rustls)
//! ```

pub mod error;
pub mod factory;
pub mod service;

pub use error::{ApiError, ClientError};
pub use factory::{GoogleClient, ServiceClientFactory};
pub use service::ApiService;
