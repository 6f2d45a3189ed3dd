//! Retrying HTTP transport.
//!
//! # Responsibilities
//! - Buffer the request body so it can be replayed byte-for-byte
//! - Send through the wrapped transport and classify the outcome
//! - Back off exponentially between attempts, per request
//! - Hand the last real outcome back once retries run out
//!
//! # Design Decisions
//! - Same `Service` contract as the wrapped transport, so it slots in anywhere
//! - Retries every method: the remote APIs are the only judge of idempotency
//! - No retry budget or shared counters; the policy is the only shared state

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use futures_util::future::BoxFuture;
use hyper::{Request, Response};
use tower::util::BoxCloneSyncService;
use tower::{BoxError, Layer, Service, ServiceExt};

use crate::observability::metrics;
use crate::resilience::classify::{classify, reason, Outcome};
use crate::resilience::policy::{AttemptState, RetryDecision, RetryPolicy};
use crate::resilience::timeouts::{Deadline, DeadlineExceeded};

/// Largest request body buffered for replay.
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Installs a [`RetryTransport`] in front of a transport.
#[derive(Debug, Clone)]
pub struct RetryLayer {
    policy: RetryPolicy,
    name: Arc<str>,
    max_body_bytes: usize,
}

impl RetryLayer {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            name: Arc::from("default"),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Label attached to retry events and metrics (e.g. "compute").
    pub fn named(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = name.into();
        self
    }

    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }
}

impl<S, B> Layer<S> for RetryLayer
where
    S: Service<Request<Body>, Response = Response<B>> + Clone + Send + Sync + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Service = RetryTransport<B>;

    fn layer(&self, inner: S) -> Self::Service {
        RetryTransport {
            inner: BoxCloneSyncService::new(inner.map_err(Into::<BoxError>::into)),
            policy: self.policy,
            name: self.name.clone(),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

/// The wrapped transport, boxed once at construction with its error already
/// converted. The `Service` impl below carries no bounds on the inner error.
type Inner<B> = BoxCloneSyncService<Request<Body>, Response<B>, BoxError>;

/// Transport that resends requests failing with a network error, a 5xx or a 429.
pub struct RetryTransport<B> {
    inner: Inner<B>,
    policy: RetryPolicy,
    name: Arc<str>,
    max_body_bytes: usize,
}

impl<B> Clone for RetryTransport<B> {
    fn clone(&self) -> Self {
        RetryTransport {
            inner: self.inner.clone(),
            policy: self.policy.clone(),
            name: self.name.clone(),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

impl<B: Send + 'static> RetryTransport<B> {
    pub fn new<S>(inner: S, policy: RetryPolicy) -> Self
    where
        S: Service<Request<Body>, Response = Response<B>> + Clone + Send + Sync + 'static,
        S::Error: Into<BoxError>,
        S::Future: Send + 'static,
    {
        RetryLayer::new(policy).layer(inner)
    }
}

impl<B> RetryTransport<B> {
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<B> Service<Request<Body>> for RetryTransport<B>
where
    B: Send + 'static,
{
    type Response = Response<B>;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        // Keep the instance that was driven to readiness; leave a clone for the next caller.
        let clone = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(retry_loop(
            inner,
            self.policy,
            self.name.clone(),
            self.max_body_bytes,
            request,
        ))
    }
}

async fn retry_loop<B>(
    mut inner: Inner<B>,
    policy: RetryPolicy,
    name: Arc<str>,
    max_body_bytes: usize,
    request: Request<Body>,
) -> Result<Response<B>, BoxError> {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, max_body_bytes).await?;
    let deadline = parts.extensions.get::<Deadline>().copied();
    let mut state = AttemptState::new(body);

    loop {
        let request = Request::from_parts(parts.clone(), Body::from(state.body()));
        metrics::record_attempt(&name);

        let result = send(&mut inner, request).await;

        let outcome = match &result {
            Ok(response) => Outcome::Response(response.status()),
            Err(_) => Outcome::TransportError,
        };

        match policy.decide(state.attempt(), classify(outcome)) {
            RetryDecision::Succeed => return result,
            RetryDecision::GiveUp => {
                tracing::warn!(
                    transport = %name,
                    attempts = state.attempt() + 1,
                    total_delay = ?state.total_delay(),
                    reason = %reason(outcome),
                    "Retries exhausted"
                );
                metrics::record_exhausted(&name);
                return result;
            }
            RetryDecision::RetryAfter(delay) => {
                if let Some(deadline) = deadline {
                    if deadline.expires_within(delay) {
                        tracing::debug!(
                            transport = %name,
                            attempts = state.attempt() + 1,
                            "Deadline leaves no room for another attempt"
                        );
                        return Err(DeadlineExceeded {
                            attempts: state.attempt() + 1,
                        }
                        .into());
                    }
                }

                match &result {
                    Ok(response) => tracing::info!(
                        transport = %name,
                        attempt = state.attempt() + 1,
                        delay = ?delay,
                        status = %response.status(),
                        "Retrying request"
                    ),
                    Err(e) => tracing::info!(
                        transport = %name,
                        attempt = state.attempt() + 1,
                        delay = ?delay,
                        error = %e,
                        "Retrying after transport error"
                    ),
                }
                metrics::record_retry(&name, reason(outcome));

                drop(result);
                tokio::time::sleep(delay).await;
                state.advance(delay);
            }
        }
    }
}

async fn send<B>(inner: &mut Inner<B>, request: Request<Body>) -> Result<Response<B>, BoxError> {
    inner.ready().await?.call(request).await
}
