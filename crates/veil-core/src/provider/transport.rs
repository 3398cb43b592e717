//! Transport seam for issuing JSON-RPC calls with a deadline.
//!
//! The router never talks to the network directly: it issues calls through
//! the [`Transport`] trait, which takes an endpoint URL, an opaque request
//! payload, and a deadline, and returns the response payload plus optional
//! provider fee metadata. Production code uses [`HttpTransport`]; tests
//! substitute programmable mocks.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::{sync::Arc, time::Duration};
use tokio::sync::Semaphore;

pub(crate) use crate::provider::errors::TransportError;
use crate::types::{RpcRequest, RpcResponse};

/// A successful transport reply: the response payload plus any
/// provider-specific fee metadata the transport observed.
///
/// Fee metadata is deliberately opaque (`serde_json::Value`); the router
/// aggregates it for telemetry without interpreting it.
#[derive(Debug, Clone)]
pub struct TransportReply {
    /// The JSON-RPC response payload.
    pub response: RpcResponse,
    /// Provider-reported fee or rate figure, if the transport surfaces one.
    pub fee: Option<serde_json::Value>,
}

/// Abstract "issue a JSON-RPC-style call to an endpoint URL with a
/// deadline" operation.
///
/// Implementations must enforce the deadline themselves and return
/// [`TransportError::Timeout`] when it elapses, so that a stalled endpoint
/// never holds up the router's fallback loop. Call futures must be
/// drop-cancellable: dropping a pending call releases its timers and
/// connections.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues one call to `url` and awaits the response until `deadline`
    /// elapses.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] describing the per-attempt failure;
    /// the router records it and falls back to the next candidate.
    async fn call(
        &self,
        url: &str,
        request: &RpcRequest,
        deadline: Duration,
    ) -> Result<TransportReply, TransportError>;
}

/// Configuration for HTTP transport connection pooling and concurrency.
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Maximum number of concurrent HTTP requests across all endpoints.
    pub concurrent_limit: usize,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Idle connections kept per host.
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            concurrent_limit: 256,
            connect_timeout: Duration::from_secs(5),
            pool_max_idle_per_host: 16,
        }
    }
}

/// Production [`Transport`] over HTTP POST with connection pooling and
/// semaphore-based concurrency control.
///
/// The per-attempt deadline covers the whole call: permit acquisition,
/// connection, request, and response body. Network errors are sanitized to
/// stable messages before they reach diagnostics.
pub struct HttpTransport {
    client: Client,
    concurrent_limit: Arc<Semaphore>,
}

impl HttpTransport {
    /// Creates a new HTTP transport with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to build.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(HttpTransportConfig::default())
    }

    /// Creates a new HTTP transport with the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to build.
    pub fn with_config(config: HttpTransportConfig) -> Result<Self, TransportError> {
        let client = ClientBuilder::new()
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .connect_timeout(config.connect_timeout)
            .use_rustls_tls()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("veil-core/", env!("CARGO_PKG_VERSION")))
            .tcp_keepalive(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build http client");
                TransportError::ConnectionFailed(format!("HTTP client build failed: {e}"))
            })?;

        Ok(Self { client, concurrent_limit: Arc::new(Semaphore::new(config.concurrent_limit)) })
    }

    /// Sanitizes network errors to stable messages that do not leak
    /// connection details into diagnostics.
    fn sanitize_network_error(error: &reqwest::Error) -> String {
        if error.is_connect() {
            "connection refused or unreachable".to_string()
        } else if error.is_timeout() {
            "connection timed out".to_string()
        } else if error.is_request() {
            "request failed".to_string()
        } else if error.is_body() || error.is_decode() {
            "response body error".to_string()
        } else if error.is_redirect() {
            "too many redirects".to_string()
        } else {
            "network error".to_string()
        }
    }

    async fn execute(&self, url: &str, body: bytes::Bytes) -> Result<TransportReply, TransportError> {
        let _permit = Arc::clone(&self.concurrent_limit)
            .acquire_owned()
            .await
            .map_err(|_| TransportError::ConcurrencyLimit(url.to_string()))?;

        let response = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    TransportError::ConnectionFailed(Self::sanitize_network_error(&e))
                } else {
                    TransportError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpError(
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown status").to_string(),
            ));
        }

        let payload = response.bytes().await.map_err(TransportError::Network)?;

        let rpc_response: RpcResponse = serde_json::from_slice(&payload)
            .map_err(|e| TransportError::InvalidPayload(format!("invalid JSON-RPC response: {e}")))?;

        if let Some(error) = &rpc_response.error {
            return Err(TransportError::RpcError(error.code, error.message.clone()));
        }

        // Plain JSON-RPC endpoints carry no out-of-band fee figure; richer
        // provider transports can attach one here.
        Ok(TransportReply { response: rpc_response, fee: None })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(
        &self,
        url: &str,
        request: &RpcRequest,
        deadline: Duration,
    ) -> Result<TransportReply, TransportError> {
        let body = serde_json::to_vec(request)
            .map_err(|e| TransportError::InvalidPayload(format!("failed to serialize request: {e}")))?;

        match tokio::time::timeout(deadline, self.execute(url, bytes::Bytes::from(body))).await {
            Ok(result) => result,
            Err(_elapsed) => {
                tracing::debug!(url = url, deadline_ms = deadline.as_millis() as u64, "call stalled");
                Err(TransportError::Timeout)
            }
        }
    }
}
