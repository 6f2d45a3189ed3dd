//! Bearer token middleware.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use futures_util::future::BoxFuture;
use hyper::header::{HeaderValue, AUTHORIZATION};
use hyper::Request;
use tower::{BoxError, Layer, Service};

use crate::auth::token::TokenSource;

/// Attaches `Authorization: Bearer <token>` to every request.
#[derive(Clone)]
pub struct AuthLayer {
    tokens: Arc<dyn TokenSource>,
}

impl AuthLayer {
    pub fn new(tokens: Arc<dyn TokenSource>) -> Self {
        Self { tokens }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            tokens: self.tokens.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    tokens: Arc<dyn TokenSource>,
}

impl<S> Service<Request<Body>> for AuthService<S>
where
    S: Service<Request<Body>> + Clone + Send + 'static,
    S::Response: Send + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let clone = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, clone);
        let tokens = self.tokens.clone();

        Box::pin(authorize(inner, tokens, request))
    }
}

async fn authorize<S>(
    mut inner: S,
    tokens: Arc<dyn TokenSource>,
    mut request: Request<Body>,
) -> Result<S::Response, BoxError>
where
    S: Service<Request<Body>>,
    S::Error: Into<BoxError>,
{
    let token = tokens.token().await?;
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.value()))?;
    value.set_sensitive(true);
    request.headers_mut().insert(AUTHORIZATION, value);

    inner.call(request).await.map_err(Into::into)
}
