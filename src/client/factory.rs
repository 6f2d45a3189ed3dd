//! Service client construction.
//!
//! # Responsibilities
//! - Turn credentials into one token source per scope
//! - Stack user agent → retry → auth on top of the base transport, per client
//! - Bundle the service handles with the provisioning defaults from config
//!
//! # Design Decisions
//! - Every client gets its own `RetryTransport` value; nothing is mutated in place
//! - The base transport is shared by clone (one connection pool per process)
//! - Retry sits outside auth, so each attempt re-checks the token

use std::sync::Arc;

use hyper::header::{HeaderValue, USER_AGENT};
use tower::util::BoxCloneSyncService;
use tower::ServiceBuilder;
use tower_http::set_header::SetRequestHeaderLayer;

use crate::auth::{AuthLayer, CredentialSource, Scope, TokenSource};
use crate::client::error::ClientError;
use crate::client::service::ApiService;
use crate::config::CpiConfig;
use crate::net::{build_base_transport, HttpClient};
use crate::resilience::{RetryLayer, RetryPolicy};

/// Builds authenticated, retrying HTTP clients on a shared base transport.
#[derive(Clone)]
pub struct ServiceClientFactory {
    base: HttpClient,
    retry: RetryLayer,
    user_agent: HeaderValue,
}

impl ServiceClientFactory {
    pub fn new(base: HttpClient, policy: RetryPolicy, user_agent: &str) -> Result<Self, ClientError> {
        let user_agent =
            HeaderValue::from_str(user_agent).map_err(|e| ClientError::Construction {
                service: "http",
                reason: format!("invalid user agent '{}': {}", user_agent, e),
            })?;
        Ok(Self {
            base,
            retry: RetryLayer::new(policy),
            user_agent,
        })
    }

    /// Largest request body each client buffers for replay.
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.retry = self.retry.max_body_bytes(limit);
        self
    }

    /// The unauthenticated transport, e.g. for token requests.
    pub fn base_transport(&self) -> HttpClient {
        self.base.clone()
    }

    /// An HTTP client that sets the user agent, retries, and authenticates.
    pub fn authenticated_client(&self, name: &'static str, tokens: Arc<dyn TokenSource>) -> HttpClient {
        let stack = ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::overriding(
                USER_AGENT,
                self.user_agent.clone(),
            ))
            .layer(self.retry.clone().named(name))
            .layer(AuthLayer::new(tokens))
            .service(self.base.clone());
        BoxCloneSyncService::new(stack)
    }

    pub fn service(
        &self,
        name: &'static str,
        endpoint: &str,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<ApiService, ClientError> {
        ApiService::new(name, endpoint, self.authenticated_client(name, tokens))
    }
}

/// Compute and storage clients plus the provisioning defaults that travel with them.
#[derive(Clone)]
pub struct GoogleClient {
    config: Arc<CpiConfig>,
    compute: ApiService,
    compute_beta: ApiService,
    storage: ApiService,
}

impl GoogleClient {
    /// Credentials from config: the JSON key, or default discovery.
    pub fn new(config: CpiConfig) -> Result<Self, ClientError> {
        let credentials = CredentialSource::from_config(&config.google)?;
        Self::with_credentials(config, credentials)
    }

    pub fn with_credentials(
        config: CpiConfig,
        credentials: CredentialSource,
    ) -> Result<Self, ClientError> {
        let base = build_base_transport(&config.timeouts);
        Self::with_transport(config, credentials, base)
    }

    /// Build on a caller-supplied base transport.
    pub fn with_transport(
        config: CpiConfig,
        credentials: CredentialSource,
        base: HttpClient,
    ) -> Result<Self, ClientError> {
        let policy = config
            .retries
            .policy()
            .map_err(|e| ClientError::Construction {
                service: "http",
                reason: e.to_string(),
            })?;
        let factory = ServiceClientFactory::new(base, policy, &config.user_agent())?
            .max_body_bytes(config.retries.max_buffered_body_bytes);

        let compute_tokens = credentials.token_source(Scope::Compute, factory.base_transport())?;
        let storage_tokens = credentials.token_source(Scope::Storage, factory.base_transport())?;

        let endpoints = &config.endpoints;
        let compute = factory.service("compute", &endpoints.compute, compute_tokens.clone())?;
        let compute_beta = factory.service("compute_beta", &endpoints.compute_beta, compute_tokens)?;
        let storage = factory.service("storage", &endpoints.storage, storage_tokens)?;

        tracing::info!(
            project = %config.google.project,
            user_agent = %config.user_agent(),
            max_retries = policy.max_retries(),
            first_retry_delay = ?policy.first_retry_delay(),
            "Google client initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            compute,
            compute_beta,
            storage,
        })
    }

    pub fn config(&self) -> &CpiConfig {
        &self.config
    }

    pub fn project(&self) -> &str {
        &self.config.google.project
    }

    pub fn default_root_disk_size_gb(&self) -> u32 {
        self.config.google.default_root_disk_size_gb
    }

    pub fn default_root_disk_type(&self) -> &str {
        &self.config.google.default_root_disk_type
    }

    pub fn compute_service(&self) -> &ApiService {
        &self.compute
    }

    pub fn compute_beta_service(&self) -> &ApiService {
        &self.compute_beta
    }

    pub fn storage_service(&self) -> &ApiService {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CredentialError;
    use crate::config::TimeoutConfig;

    fn config() -> CpiConfig {
        let mut config = CpiConfig::default();
        config.google.project = "p1".into();
        config.google.default_root_disk_size_gb = 25;
        config.google.default_root_disk_type = "pd-ssd".into();
        config
    }

    #[tokio::test]
    async fn test_accessors() {
        let client =
            GoogleClient::with_credentials(config(), CredentialSource::AccessToken("t".into()))
                .unwrap();
        assert_eq!(client.project(), "p1");
        assert_eq!(client.default_root_disk_size_gb(), 25);
        assert_eq!(client.default_root_disk_type(), "pd-ssd");
        assert_eq!(client.compute_service().name(), "compute");
        assert_eq!(
            client.compute_beta_service().base_url().as_str(),
            "https://compute.googleapis.com/compute/beta/"
        );
        assert_eq!(
            client.storage_service().base_url().as_str(),
            "https://storage.googleapis.com/storage/v1/"
        );
    }

    #[tokio::test]
    async fn test_malformed_json_key() {
        let mut config = config();
        config.google.json_key = "{not json".into();

        let err = GoogleClient::new(config).err().unwrap();
        assert!(matches!(
            err,
            ClientError::Credential(CredentialError::MalformedKey(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_endpoint_is_construction_error() {
        let mut config = config();
        config.endpoints.storage = "::".into();

        let err = GoogleClient::with_credentials(config, CredentialSource::AccessToken("t".into()))
            .err()
            .unwrap();
        assert!(matches!(err, ClientError::Construction { service: "storage", .. }));
    }

    #[tokio::test]
    async fn test_invalid_retry_settings_are_construction_error() {
        let mut config = config();
        config.retries.first_retry_delay_ms = 0;

        let err = GoogleClient::with_credentials(config, CredentialSource::AccessToken("t".into()))
            .err()
            .unwrap();
        assert!(matches!(err, ClientError::Construction { service: "http", .. }));
    }

    #[tokio::test]
    async fn test_invalid_user_agent() {
        let base = build_base_transport(&TimeoutConfig::default());
        let err = ServiceClientFactory::new(base, RetryPolicy::default(), "bad\nagent")
            .err()
            .unwrap();
        assert!(err.to_string().contains("invalid user agent"));
    }
}
