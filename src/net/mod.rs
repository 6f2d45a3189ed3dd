//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound request (already authenticated and retry-wrapped)
//!     → client.rs (pooled hyper-util client, HTTP/1.1 + HTTP/2)
//!     → tls.rs (rustls handshake, webpki roots; plain http passes through)
//!     → remote API
//! ```
//!
//! # Design Decisions
//! - One base transport per process, shared by clone across every service client
//! - Pooling is hyper-util's; nothing here adds its own
//! - Errors are boxed so layers above can stack without naming hyper types

pub mod client;
pub mod tls;

pub use client::{build_base_transport, HttpClient};
