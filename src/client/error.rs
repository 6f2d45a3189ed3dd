//! Client error types.

use hyper::StatusCode;
use thiserror::Error;
use tower::BoxError;

use crate::auth::CredentialError;

/// Failure to build a [`GoogleClient`](super::GoogleClient). Configuration
/// problems: fatal at startup, never retried.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("creating {service} service client: {reason}")]
    Construction { service: &'static str, reason: String },
}

/// Failure of a single API call, after the transport's retries.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request path '{path}': {source}")]
    InvalidPath {
        path: String,
        source: url::ParseError,
    },

    #[error("encoding request body: {0}")]
    Encode(serde_json::Error),

    #[error("building request: {0}")]
    Request(#[from] hyper::http::Error),

    #[error("transport error: {0}")]
    Transport(BoxError),

    #[error("{service} API returned {status}: {body}")]
    Status {
        service: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("decoding {service} response: {source}")]
    Decode {
        service: &'static str,
        source: serde_json::Error,
    },
}

impl ApiError {
    /// HTTP status of a non-2xx answer, if that is what this is.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}
