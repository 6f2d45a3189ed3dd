//! Credential acquisition subsystem.
//!
//! # Data Flow
//! ```text
//! CpiConfig.google.json_key
//!     → credentials.rs (parse key, or discover defaults)
//!     → CredentialSource::token_source(scope)
//!         - service_account.rs (signed JWT → token endpoint)
//!         - metadata.rs (instance metadata server)
//!         - token.rs StaticTokenSource (pre-issued token)
//!     → layer.rs (AuthLayer: Authorization header on every attempt)
//! ```
//!
//! # Design Decisions
//! - One token source per scope; compute v1 and beta share the compute one
//! - Network-backed sources cache until shortly before expiry
//! - Token failures surface as transport errors, so the retry layer above sees them

pub mod credentials;
pub mod layer;
pub mod metadata;
pub mod service_account;
pub mod token;

pub use credentials::{CredentialError, CredentialSource, Scope, ServiceAccountKey};
pub use layer::{AuthLayer, AuthService};
pub use token::{AccessToken, StaticTokenSource, TokenError, TokenSource};
