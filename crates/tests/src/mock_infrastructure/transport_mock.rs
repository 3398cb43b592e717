//! Programmable transport mock for router testing.
//!
//! Each endpoint URL is given an [`EndpointBehavior`]; the mock records
//! every call in order so tests can assert on attempt sequences.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc, time::Duration};

use veil_core::{RpcRequest, RpcResponse, Transport, TransportError, TransportReply};

/// How a mocked endpoint reacts to a call.
#[derive(Debug, Clone)]
pub enum EndpointBehavior {
    /// Answer successfully with the given result and fee after `delay`.
    ///
    /// If `delay` reaches the call's deadline, the attempt stalls instead.
    Respond {
        result: serde_json::Value,
        fee: Option<serde_json::Value>,
        delay: Duration,
    },
    /// Never answer: the attempt stalls until its deadline elapses.
    Stall,
    /// Fail immediately with a connection error.
    Refuse,
    /// Fail immediately with the given HTTP status.
    HttpStatus(u16),
}

/// [`Transport`] implementation with per-URL programmable behavior and a
/// call log.
#[derive(Default)]
pub struct MockTransport {
    behaviors: Mutex<HashMap<String, EndpointBehavior>>,
    calls: Mutex<Vec<String>>,
}

impl MockTransport {
    /// Creates a mock where every endpoint refuses connections until
    /// configured otherwise.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the behavior for an endpoint URL.
    pub fn set(&self, url: impl Into<String>, behavior: EndpointBehavior) {
        self.behaviors.lock().insert(url.into(), behavior);
    }

    /// Configures an endpoint to answer immediately with `result` and no
    /// fee.
    pub fn respond(&self, url: impl Into<String>, result: serde_json::Value) {
        self.set(url, EndpointBehavior::Respond { result, fee: None, delay: Duration::ZERO });
    }

    /// Configures an endpoint to answer immediately with `result` and the
    /// given fee figure.
    pub fn respond_with_fee(
        &self,
        url: impl Into<String>,
        result: serde_json::Value,
        fee: serde_json::Value,
    ) {
        self.set(url, EndpointBehavior::Respond { result, fee: Some(fee), delay: Duration::ZERO });
    }

    /// Returns every URL called so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Returns how many times `url` has been called.
    #[must_use]
    pub fn calls_for(&self, url: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.as_str() == url).count()
    }

    /// Clears the call log.
    pub fn reset_calls(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(
        &self,
        url: &str,
        request: &RpcRequest,
        deadline: Duration,
    ) -> Result<TransportReply, TransportError> {
        self.calls.lock().push(url.to_string());

        let behavior = self
            .behaviors
            .lock()
            .get(url)
            .cloned()
            .unwrap_or(EndpointBehavior::Refuse);

        match behavior {
            EndpointBehavior::Respond { result, fee, delay } => {
                if delay >= deadline {
                    tokio::time::sleep(deadline).await;
                    return Err(TransportError::Timeout);
                }
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(TransportReply {
                    response: RpcResponse::success(result, Arc::clone(&request.id)),
                    fee,
                })
            }
            EndpointBehavior::Stall => {
                tokio::time::sleep(deadline).await;
                Err(TransportError::Timeout)
            }
            EndpointBehavior::Refuse => {
                Err(TransportError::ConnectionFailed("connection refused or unreachable".into()))
            }
            EndpointBehavior::HttpStatus(status) => {
                Err(TransportError::HttpError(status, "mocked status".into()))
            }
        }
    }
}
