//! Tokens from a service account key (OAuth2 JWT bearer flow).

use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::Body;
use futures_util::future::BoxFuture;
use hyper::header::CONTENT_TYPE;
use hyper::Request;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;
use url::form_urlencoded;

use crate::auth::credentials::{CredentialError, Scope, ServiceAccountKey};
use crate::auth::token::{fetch_token, AccessToken, TokenCache, TokenError, TokenSource};
use crate::net::HttpClient;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each assertion; Google caps it at one hour.
const ASSERTION_LIFETIME_SECS: u64 = 3600;

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

/// Signs an assertion with the key and trades it for an access token.
pub struct ServiceAccountTokenSource {
    client: HttpClient,
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    scope: Scope,
    cache: TokenCache,
}

impl ServiceAccountTokenSource {
    pub fn new(
        client: HttpClient,
        key: ServiceAccountKey,
        scope: Scope,
    ) -> Result<Self, CredentialError> {
        let signing_key = key.signing_key()?;
        Ok(Self {
            client,
            key,
            signing_key,
            scope,
            cache: TokenCache::default(),
        })
    }

    fn assertion(&self, now: u64) -> Result<String, TokenError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let claims = Claims {
            iss: &self.key.client_email,
            scope: self.scope.url(),
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        Ok(jsonwebtoken::encode(&header, &claims, &self.signing_key)?)
    }

    async fn fetch(&self) -> Result<AccessToken, TokenError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let form = form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", JWT_BEARER_GRANT)
            .append_pair("assertion", &self.assertion(now)?)
            .finish();

        let request = Request::post(self.key.token_uri.as_str())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))?;
        tracing::debug!(
            client_email = %self.key.client_email,
            scope = ?self.scope,
            "Exchanging service account assertion"
        );
        fetch_token(&self.client, request).await
    }
}

impl TokenSource for ServiceAccountTokenSource {
    fn token(&self) -> BoxFuture<'_, Result<AccessToken, TokenError>> {
        Box::pin(self.cache.get_or_refresh(|| self.fetch()))
    }
}
