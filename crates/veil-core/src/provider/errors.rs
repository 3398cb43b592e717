use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur on a single transport attempt against one
/// endpoint.
///
/// Attempt errors are absorbed by the router's fallback loop and recorded
/// as [`AttemptFailure`] diagnostics; they never surface individually to
/// the caller of [`ProviderRouter::request`](crate::provider::ProviderRouter::request).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TransportError {
    /// The endpoint did not answer within its stall deadline.
    #[error("request stalled past its deadline")]
    Timeout,

    /// Failed to establish a connection to the endpoint.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// HTTP-level error (non-2xx status code).
    ///
    /// First field is the HTTP status code, second is the error message.
    #[error("HTTP error {0}: {1}")]
    HttpError(u16, String),

    /// JSON-RPC error returned by the provider.
    ///
    /// First field is the RPC error code, second is the error message.
    #[error("RPC error {0}: {1}")]
    RpcError(i32, String),

    /// Network-level error from the underlying HTTP client.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request could not be serialized or the response could not be parsed.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The transport's concurrency limit could not be acquired.
    #[error("concurrency limit reached for {0}")]
    ConcurrencyLimit(String),
}

impl TransportError {
    /// Returns `true` if this failure is a stall: the endpoint was reached
    /// (or reachable) but produced no answer within the deadline.
    #[must_use]
    pub fn is_stall(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

/// Diagnostic record of one failed endpoint attempt within a request.
#[derive(Debug)]
pub struct AttemptFailure {
    /// URL of the endpoint that failed.
    pub url: Arc<str>,
    /// The per-attempt error observed.
    pub error: TransportError,
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.url, self.error)
    }
}

/// Errors surfaced by a [`ProviderRouter`](crate::provider::ProviderRouter)
/// request.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ProviderError {
    /// Every endpoint in every priority group failed for this request.
    ///
    /// Carries one [`AttemptFailure`] per attempted endpoint, in attempt
    /// order, for logging and diagnosis.
    #[error("all providers unavailable after {} failed attempts", failures.len())]
    AllProvidersUnavailable {
        /// Per-endpoint failure reasons, one entry per endpoint attempted.
        failures: Vec<AttemptFailure>,
    },
}

/// Errors raised when registering a network.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RegistryError {
    /// The descriptor set is malformed: empty endpoint list or an endpoint
    /// with a non-positive weight or priority. Fatal to the registration
    /// call only; other networks are unaffected.
    #[error("invalid provider config: {reason}")]
    InvalidConfig { reason: String },
}
