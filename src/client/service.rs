//! API service handles.
//!
//! Thin request builders over a retry-wrapped, authenticated [`HttpClient`].
//! They know the API's base URL and JSON conventions, nothing about individual
//! operations.

use axum::body::Body;
use hyper::body::Incoming;
use hyper::header::{ACCEPT, CONTENT_TYPE};
use hyper::{Method, Request, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tower::{BoxError, ServiceExt};
use url::Url;

use crate::client::error::{ApiError, ClientError};
use crate::net::HttpClient;

const MAX_RESPONSE_BYTES: usize = 64 * 1024 * 1024;

/// Handle on one remote API (compute v1, compute beta, storage v1).
#[derive(Clone)]
pub struct ApiService {
    name: &'static str,
    base_url: Url,
    client: HttpClient,
}

impl ApiService {
    pub fn new(name: &'static str, base_url: &str, client: HttpClient) -> Result<Self, ClientError> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| ClientError::Construction {
            service: name,
            reason: format!("invalid endpoint '{}': {}", base_url, e),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::Construction {
                service: name,
                reason: format!("unsupported endpoint scheme '{}'", base_url.scheme()),
            });
        }

        Ok(Self {
            name,
            base_url,
            client,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` (e.g. `projects/p/zones/z/instances`) against the base URL.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|source| ApiError::InvalidPath {
                path: path.to_string(),
                source,
            })
    }

    /// Build a request, JSON-encoding `body` when given.
    pub fn request<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Request<Body>, ApiError> {
        let url = self.url(path)?;
        let builder = Request::builder()
            .method(method)
            .uri(url.as_str())
            .header(ACCEPT, "application/json");

        let request = match body {
            Some(body) => {
                let json = serde_json::to_vec(body).map_err(ApiError::Encode)?;
                builder
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(json))?
            }
            None => builder.body(Body::empty())?,
        };
        Ok(request)
    }

    /// One logical round trip; the transport retries underneath.
    pub async fn send(&self, request: Request<Body>) -> Result<Response<Incoming>, BoxError> {
        self.client.clone().oneshot(request).await
    }

    /// Send, require a 2xx, and decode the JSON answer.
    pub async fn call_json<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let request = self.request(method, path, body)?;
        let response = self.send(request).await.map_err(ApiError::Transport)?;

        let status = response.status();
        let bytes = axum::body::to_bytes(Body::new(response.into_body()), MAX_RESPONSE_BYTES)
            .await
            .map_err(|e| ApiError::Transport(e.into()))?;

        if !status.is_success() {
            return Err(ApiError::Status {
                service: self.name,
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode {
            service: self.name,
            source,
        })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.call_json::<T, serde_json::Value>(Method::GET, path, None)
            .await
    }
}
