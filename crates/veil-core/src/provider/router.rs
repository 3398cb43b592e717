//! Provider router: priority-group iteration with weighted-random
//! selection and per-request fallback.

use chrono::Utc;
use rand::Rng;
use std::{collections::BTreeMap, sync::Arc, time::Instant};

use crate::{
    config::ProviderDescriptorSet,
    provider::{
        errors::{AttemptFailure, ProviderError, RegistryError},
        telemetry::{EndpointTelemetry, NetworkTelemetry},
        transport::Transport,
    },
    types::{RpcRequest, RpcResponse},
};

/// A successful routed response: the payload plus which endpoint served it
/// and any fee figure that endpoint reported.
#[derive(Debug, Clone)]
pub struct RouterResponse {
    /// URL of the endpoint that answered.
    pub endpoint: Arc<str>,
    /// The JSON-RPC response payload.
    pub response: RpcResponse,
    /// Provider-reported fee figure, if any.
    pub fee: Option<serde_json::Value>,
}

/// Routes requests for one network across its configured endpoints.
///
/// Built from exactly one [`ProviderDescriptorSet`]; the descriptor is
/// immutable for the router's lifetime and the only mutable state is the
/// per-endpoint telemetry, updated through request outcomes.
///
/// # Selection
///
/// Priority groups are walked in ascending order. Within a group, endpoints
/// are drawn weighted-randomly without replacement: the probability of
/// drawing an endpoint is its weight divided by the sum of the weights still
/// in the pool. A failed attempt removes the endpoint from this request's
/// pool only; nothing is remembered across requests.
///
/// # Cancellation
///
/// Dropping the future returned by [`request`](Self::request) cancels the
/// in-flight transport call and releases its deadline timer. Sibling
/// requests on the same router are unaffected.
pub struct ProviderRouter {
    descriptor: ProviderDescriptorSet,
    /// Endpoint indices grouped by ascending priority.
    groups: Vec<Vec<usize>>,
    /// One telemetry slot per endpoint, index-aligned with the descriptor.
    telemetry: Vec<EndpointTelemetry>,
    transport: Arc<dyn Transport>,
}

impl ProviderRouter {
    /// Creates a router from a descriptor set and a transport.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidConfig`] if the descriptor set fails
    /// validation (empty endpoint list, zero weight or priority).
    pub fn new(
        descriptor: ProviderDescriptorSet,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, RegistryError> {
        descriptor.validate()?;

        let mut by_priority: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (index, endpoint) in descriptor.endpoints.iter().enumerate() {
            by_priority.entry(endpoint.priority).or_default().push(index);
        }
        let groups: Vec<Vec<usize>> = by_priority.into_values().collect();

        let telemetry = descriptor
            .endpoints
            .iter()
            .map(|e| EndpointTelemetry::new(Arc::from(e.url.as_str())))
            .collect();

        Ok(Self { descriptor, groups, telemetry, transport })
    }

    /// Returns the descriptor set this router was built from.
    #[must_use]
    pub fn descriptor(&self) -> &ProviderDescriptorSet {
        &self.descriptor
    }

    /// Returns the network label this router serves.
    #[must_use]
    pub fn network_name(&self) -> &str {
        &self.descriptor.network_name
    }

    /// Returns the chain id this router serves.
    #[must_use]
    pub fn chain_id(&self) -> u64 {
        self.descriptor.chain_id
    }

    /// Issues one logical call, falling back across endpoints until one
    /// succeeds.
    ///
    /// Per-attempt failures (stalls, transport errors) are absorbed and
    /// recorded; only total exhaustion surfaces.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::AllProvidersUnavailable`] when every
    /// endpoint in every priority group has failed for this request,
    /// carrying one failure entry per attempted endpoint.
    pub async fn request(&self, request: &RpcRequest) -> Result<RouterResponse, ProviderError> {
        let mut failures = Vec::new();

        for group in &self.groups {
            let mut remaining = group.clone();

            while !remaining.is_empty() {
                let slot = if remaining.len() == 1 {
                    0
                } else {
                    let weights: Vec<u32> =
                        remaining.iter().map(|&i| self.descriptor.endpoints[i].weight).collect();
                    let total: u64 = weights.iter().map(|&w| u64::from(w)).sum();
                    let roll = {
                        let mut rng = rand::rng();
                        rng.random_range(0..total)
                    };
                    pick_by_weight(&weights, roll)
                };
                let index = remaining.swap_remove(slot);
                let endpoint = &self.descriptor.endpoints[index];
                let deadline = endpoint.stall_timeout();

                tracing::debug!(
                    network = %self.descriptor.network_name,
                    url = %endpoint.url,
                    priority = endpoint.priority,
                    deadline_ms = deadline.as_millis() as u64,
                    "attempting endpoint"
                );

                let started = Instant::now();
                match self.transport.call(&endpoint.url, request, deadline).await {
                    Ok(reply) => {
                        #[allow(clippy::cast_possible_truncation)]
                        let latency_ms = started.elapsed().as_millis() as u64;
                        self.telemetry[index].record_success(
                            Utc::now(),
                            latency_ms,
                            reply.fee.clone(),
                        );

                        tracing::debug!(
                            network = %self.descriptor.network_name,
                            url = %endpoint.url,
                            latency_ms = latency_ms,
                            "endpoint answered"
                        );

                        return Ok(RouterResponse {
                            endpoint: Arc::clone(self.telemetry[index].url()),
                            response: reply.response,
                            fee: reply.fee,
                        });
                    }
                    Err(error) => {
                        self.telemetry[index].record_failure();

                        tracing::warn!(
                            network = %self.descriptor.network_name,
                            url = %endpoint.url,
                            stall = error.is_stall(),
                            error = %error,
                            "endpoint attempt failed"
                        );

                        failures.push(AttemptFailure {
                            url: Arc::clone(self.telemetry[index].url()),
                            error,
                        });
                    }
                }
            }
        }

        tracing::error!(
            network = %self.descriptor.network_name,
            attempts = failures.len(),
            "all providers unavailable"
        );

        Err(ProviderError::AllProvidersUnavailable { failures })
    }

    /// Produces a serializable telemetry snapshot for this network.
    ///
    /// Non-blocking with respect to in-flight requests: only short
    /// per-endpoint locks are taken.
    #[must_use]
    pub fn telemetry_snapshot(&self) -> NetworkTelemetry {
        NetworkTelemetry {
            network_name: self.descriptor.network_name.clone(),
            chain_id: self.descriptor.chain_id,
            endpoints: self.telemetry.iter().map(EndpointTelemetry::snapshot).collect(),
        }
    }

    /// Returns the last-known fees as a JSON object mapping endpoint URL to
    /// fee figure.
    #[must_use]
    pub fn fees_serialized(&self) -> serde_json::Value {
        self.telemetry_snapshot().fees_serialized()
    }
}

/// Selects an index from `weights` given a roll in `[0, sum(weights))`,
/// walking cumulative weights.
fn pick_by_weight(weights: &[u32], roll: u64) -> usize {
    let mut cumulative = 0u64;
    for (index, weight) in weights.iter().enumerate() {
        cumulative += u64::from(*weight);
        if roll < cumulative {
            return index;
        }
    }
    weights.len() - 1
}
