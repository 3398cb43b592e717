//! Network registration: binds named networks to router instances.
//!
//! A [`NetworkRegistry`] owns one [`ProviderRouter`] per registered
//! network, keyed by network name. Registration validates the descriptor
//! set; re-registering a name replaces the router atomically. Callers
//! holding the previous `Arc<ProviderRouter>` finish their in-flight
//! requests against it, while new lookups resolve to the replacement —
//! there is no partial-request migration.
//!
//! Lookups and registrations on unrelated networks never serialize on a
//! common lock (the map is sharded).

use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;

use crate::{
    config::ProviderDescriptorSet,
    provider::{
        errors::RegistryError, router::ProviderRouter, telemetry::NetworkTelemetry,
        transport::Transport,
    },
};

/// Registry of named networks, each served by its own router.
///
/// All routers share one transport (connection pool); descriptor sets stay
/// per-network.
pub struct NetworkRegistry {
    transport: Arc<dyn Transport>,
    networks: DashMap<String, Arc<ProviderRouter>>,
}

impl NetworkRegistry {
    /// Creates a registry that routes through the given transport.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport, networks: DashMap::new() }
    }

    /// Registers a network, creating its router.
    ///
    /// Re-registering an existing `network_name` replaces the prior router;
    /// requests already in flight on the old router complete against it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidConfig`] if the descriptor set is
    /// malformed. A failed registration leaves any previously registered
    /// router for that name untouched.
    pub fn register_network(
        &self,
        descriptor: ProviderDescriptorSet,
    ) -> Result<Arc<ProviderRouter>, RegistryError> {
        let network_name = descriptor.network_name.clone();
        let chain_id = descriptor.chain_id;
        let endpoint_count = descriptor.endpoints.len();

        let router = Arc::new(ProviderRouter::new(descriptor, Arc::clone(&self.transport))?);
        let replaced = self.networks.insert(network_name.clone(), Arc::clone(&router)).is_some();

        info!(
            network = %network_name,
            chain_id = chain_id,
            endpoints = endpoint_count,
            replaced = replaced,
            "registered network"
        );

        Ok(router)
    }

    /// Resolves the router currently serving `network_name`.
    #[must_use]
    pub fn router(&self, network_name: &str) -> Option<Arc<ProviderRouter>> {
        self.networks.get(network_name).map(|entry| Arc::clone(entry.value()))
    }

    /// Returns the names of all registered networks.
    #[must_use]
    pub fn networks(&self) -> Vec<String> {
        self.networks.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Produces a telemetry snapshot for one network, if registered.
    #[must_use]
    pub fn telemetry_snapshot(&self, network_name: &str) -> Option<NetworkTelemetry> {
        self.router(network_name).map(|router| router.telemetry_snapshot())
    }

    /// Returns the last-known fees for one network as a JSON object mapping
    /// endpoint URL to fee figure, if the network is registered.
    #[must_use]
    pub fn fees_serialized(&self, network_name: &str) -> Option<serde_json::Value> {
        self.router(network_name).map(|router| router.fees_serialized())
    }
}
