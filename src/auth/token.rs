//! Access tokens and the sources that produce them.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use axum::body::Body;
use futures_util::future::BoxFuture;
use hyper::{Request, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tower::{BoxError, ServiceExt};

use crate::net::HttpClient;

/// Tokens this close to expiry are refreshed before use.
const EXPIRY_SKEW: Duration = Duration::from_secs(60);

const MAX_TOKEN_RESPONSE_BYTES: usize = 64 * 1024;

/// A bearer token.
#[derive(Clone)]
pub struct AccessToken {
    value: String,
    expires_at: Option<Instant>,
    refresh_at: Option<Instant>,
}

impl AccessToken {
    /// `expires_in: None` means the token never expires as far as we know.
    pub fn new(value: impl Into<String>, expires_in: Option<Duration>) -> Self {
        let now = Instant::now();
        Self {
            value: value.into(),
            expires_at: expires_in.map(|d| now + d),
            // Tokens living under two minutes refresh at half their lifetime.
            refresh_at: expires_in.map(|d| now + d - EXPIRY_SKEW.min(d / 2)),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_fresh(&self) -> bool {
        match self.refresh_at {
            Some(at) => Instant::now() < at,
            None => true,
        }
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Failure to obtain a token. Surfaces as a transport error of the request
/// that needed it.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token request failed: {0}")]
    Transport(BoxError),

    #[error("token endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid token response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("signing token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("building token request: {0}")]
    Request(#[from] hyper::http::Error),
}

/// Produces bearer tokens for one scope.
pub trait TokenSource: Send + Sync {
    fn token(&self) -> BoxFuture<'_, Result<AccessToken, TokenError>>;
}

/// Always hands out the same token.
#[derive(Debug, Clone)]
pub struct StaticTokenSource {
    token: AccessToken,
}

impl StaticTokenSource {
    pub fn new(token: AccessToken) -> Self {
        Self { token }
    }
}

impl TokenSource for StaticTokenSource {
    fn token(&self) -> BoxFuture<'_, Result<AccessToken, TokenError>> {
        Box::pin(futures_util::future::ready(Ok(self.token.clone())))
    }
}

/// Holds the current token; concurrent callers wait for one refresh.
#[derive(Debug, Default)]
pub(crate) struct TokenCache {
    current: Mutex<Option<AccessToken>>,
}

impl TokenCache {
    pub(crate) async fn get_or_refresh<F, Fut>(&self, fetch: F) -> Result<AccessToken, TokenError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AccessToken, TokenError>>,
    {
        let mut current = self.current.lock().await;
        if let Some(token) = current.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.clone());
        }

        let token = fetch().await?;
        *current = Some(token.clone());
        Ok(token)
    }
}

/// Body of an OAuth2 token response (shared by the metadata server and the token endpoint).
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Send a token request and parse the answer.
pub(crate) async fn fetch_token(
    client: &HttpClient,
    request: Request<Body>,
) -> Result<AccessToken, TokenError> {
    let response = client
        .clone()
        .oneshot(request)
        .await
        .map_err(TokenError::Transport)?;

    let status = response.status();
    let body = axum::body::to_bytes(Body::new(response.into_body()), MAX_TOKEN_RESPONSE_BYTES)
        .await
        .map_err(|e| TokenError::Transport(e.into()))?;

    if !status.is_success() {
        return Err(TokenError::Status {
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }

    let parsed: TokenResponse = serde_json::from_slice(&body)?;
    tracing::debug!(expires_in = ?parsed.expires_in, "Fetched access token");
    Ok(AccessToken::new(
        parsed.access_token,
        parsed.expires_in.map(Duration::from_secs),
    ))
}
