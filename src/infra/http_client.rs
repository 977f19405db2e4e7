//! HTTP client factory with consistent timeout configuration.
//!
//! Outbound clients (Chapa, Resend) are built here rather than by constructing
//! `reqwest::Client` directly.

use reqwest::Client;
use std::time::Duration;

/// Default connect timeout (TCP handshake + TLS).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default request timeout (total request/response time).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Payment provider calls sit on the checkout path and fail fast.
pub const PAYMENT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Build an HTTP client with default timeouts.
///
/// Panics if the client cannot be built (e.g., TLS misconfiguration).
/// Only call from startup singletons; the app cannot run without them.
pub fn build_client() -> Client {
    build_client_with_timeout(DEFAULT_REQUEST_TIMEOUT)
}

pub fn build_client_with_timeout(timeout: Duration) -> Client {
    Client::builder()
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
        .timeout(timeout)
        .build()
        .expect("Failed to build HTTP client")
}
