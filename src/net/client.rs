//! Base HTTP transport.

use std::time::Duration;

use axum::body::Body;
use hyper::body::Incoming;
use hyper::{Request, Response};
use hyper_util::client::legacy::Client;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use tower::util::BoxCloneSyncService;
use tower::{BoxError, ServiceExt};

use crate::config::TimeoutConfig;
use crate::net::tls::https_connector;

/// A cloneable, shareable HTTP transport. Every layer in this crate both
/// consumes and produces one of these.
pub type HttpClient = BoxCloneSyncService<Request<Body>, Response<Incoming>, BoxError>;

/// Build the pooled transport every service client sits on.
pub fn build_base_transport(timeouts: &TimeoutConfig) -> HttpClient {
    let connector = https_connector(Duration::from_secs(timeouts.connect_secs));
    let client: Client<_, Body> = Client::builder(TokioExecutor::new())
        .pool_timer(TokioTimer::new())
        .pool_idle_timeout(Duration::from_secs(timeouts.pool_idle_secs))
        .build(connector);

    BoxCloneSyncService::new(client.map_err(BoxError::from))
}
