//! Tokens from the instance metadata server.

use axum::body::Body;
use futures_util::future::BoxFuture;
use hyper::Request;
use url::form_urlencoded;

use crate::auth::credentials::Scope;
use crate::auth::token::{fetch_token, AccessToken, TokenCache, TokenError, TokenSource};
use crate::net::HttpClient;

/// Metadata server address. An IP, not a hostname, so it resolves even when
/// the instance uses public DNS servers.
pub const METADATA_HOST: &str = "169.254.169.254";

/// Overrides [`METADATA_HOST`] when set.
pub const METADATA_HOST_ENV: &str = "GCE_METADATA_HOST";

/// The override if present and non-empty, else the well-known address.
pub fn resolve_metadata_host(override_host: Option<String>) -> String {
    override_host
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| METADATA_HOST.to_string())
}

/// Fetches the default service account's token for one scope.
pub struct MetadataTokenSource {
    client: HttpClient,
    host: String,
    scope: Scope,
    cache: TokenCache,
}

impl MetadataTokenSource {
    pub fn new(client: HttpClient, host: String, scope: Scope) -> Self {
        Self {
            client,
            host,
            scope,
            cache: TokenCache::default(),
        }
    }

    pub fn token_url(&self) -> String {
        let scopes: String = form_urlencoded::byte_serialize(self.scope.url().as_bytes()).collect();
        format!(
            "http://{}/computeMetadata/v1/instance/service-accounts/default/token?scopes={}",
            self.host, scopes
        )
    }

    async fn fetch(&self) -> Result<AccessToken, TokenError> {
        let request = Request::get(self.token_url())
            .header("Metadata-Flavor", "Google")
            .body(Body::empty())?;
        tracing::debug!(host = %self.host, scope = ?self.scope, "Requesting metadata token");
        fetch_token(&self.client, request).await
    }
}

impl TokenSource for MetadataTokenSource {
    fn token(&self) -> BoxFuture<'_, Result<AccessToken, TokenError>> {
        Box::pin(self.cache.get_or_refresh(|| self.fetch()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimeoutConfig;
    use crate::net::build_base_transport;

    #[test]
    fn test_resolve_metadata_host() {
        assert_eq!(resolve_metadata_host(None), "169.254.169.254");
        assert_eq!(resolve_metadata_host(Some("  ".into())), "169.254.169.254");
        assert_eq!(resolve_metadata_host(Some("127.0.0.1:8080".into())), "127.0.0.1:8080");
    }

    #[tokio::test]
    async fn test_token_url_encodes_scope() {
        let source = MetadataTokenSource::new(
            build_base_transport(&TimeoutConfig::default()),
            "127.0.0.1:9".into(),
            Scope::Storage,
        );
        assert_eq!(
            source.token_url(),
            "http://127.0.0.1:9/computeMetadata/v1/instance/service-accounts/default/token\
             ?scopes=https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fdevstorage.full_control"
        );
    }
}
