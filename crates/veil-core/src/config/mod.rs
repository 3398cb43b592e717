//! Static per-network provider configuration.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: Hardcoded in struct `Default` implementations
//! 2. **Config file**: TOML file passed to [`VeilConfig::load`]
//! 3. **Environment variables**: `VEIL_*` env vars override specific fields
//!
//! Descriptor sets are constructed once at startup and are immutable
//! thereafter; there is no hot reload. They can also be built directly in
//! code when embedding the library.
//!
//! # Validation
//!
//! Descriptor sets are validated at registration time: an empty endpoint
//! list, a zero weight, or a zero priority is rejected with
//! [`RegistryError::InvalidConfig`] rather than failing later mid-request.
//!
//! # Example
//!
//! ```toml
//! [[networks]]
//! network_name = "Ethereum"
//! chain_id = 1
//!
//! [[networks.endpoints]]
//! url = "https://cloudflare-eth.com/"
//! priority = 1
//! weight = 1
//!
//! [[networks.endpoints]]
//! url = "https://rpc.ankr.com/eth"
//! priority = 2
//! weight = 1
//!
//! [[networks.endpoints]]
//! url = "https://railwayapi.xyz/rpc/pokt/eth-mainnet"
//! priority = 1
//! weight = 2
//! stall_timeout_ms = 2500
//! ```

use crate::provider::errors::RegistryError;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, path::Path, time::Duration};

/// Deadline applied to an endpoint attempt when the endpoint does not
/// configure its own stall timeout.
pub const DEFAULT_STALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a single JSON-RPC provider endpoint.
///
/// Endpoints sharing a `priority` form a *priority group*: groups are tried
/// in ascending priority order, and within a group endpoints are selected
/// weighted-randomly. The list order of endpoints carries no meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEndpoint {
    /// JSON-RPC endpoint URL.
    pub url: String,

    /// Priority group; lower values are tried first. Must be `>= 1`.
    /// Defaults to `1`.
    #[serde(default = "default_priority")]
    pub priority: u32,

    /// Relative selection probability within the priority group. Must be
    /// `>= 1`. Defaults to `1`.
    #[serde(default = "default_weight")]
    pub weight: u32,

    /// Per-attempt deadline in milliseconds before the endpoint is treated
    /// as stalled and the router advances to the next candidate. Defaults to
    /// [`DEFAULT_STALL_TIMEOUT`] when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stall_timeout_ms: Option<u64>,
}

fn default_priority() -> u32 {
    1
}

fn default_weight() -> u32 {
    1
}

impl ProviderEndpoint {
    /// Creates an endpoint with default priority and weight.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), priority: 1, weight: 1, stall_timeout_ms: None }
    }

    /// Returns the effective per-attempt deadline for this endpoint.
    #[must_use]
    pub fn stall_timeout(&self) -> Duration {
        self.stall_timeout_ms.map_or(DEFAULT_STALL_TIMEOUT, Duration::from_millis)
    }
}

/// Static descriptor for one logical network: a name, a chain id, and the
/// endpoints serving it.
///
/// Constructed once from configuration and immutable thereafter. A
/// [`ProviderRouter`](crate::provider::ProviderRouter) is created from
/// exactly one descriptor set and owns all derived runtime state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderDescriptorSet {
    /// Human-readable network label, unique within a registry instance.
    pub network_name: String,

    /// Numeric chain identifier (e.g. `1` for Ethereum mainnet).
    pub chain_id: u64,

    /// Endpoints serving this network. Cannot be empty.
    pub endpoints: Vec<ProviderEndpoint>,
}

impl ProviderDescriptorSet {
    /// Validates the descriptor set invariants.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidConfig`] if the endpoint list is
    /// empty, or any endpoint has a zero weight or zero priority.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.endpoints.is_empty() {
            return Err(RegistryError::InvalidConfig {
                reason: format!("network '{}' has no endpoints", self.network_name),
            });
        }

        for endpoint in &self.endpoints {
            if endpoint.weight < 1 {
                return Err(RegistryError::InvalidConfig {
                    reason: format!("endpoint '{}' has weight 0 (must be >= 1)", endpoint.url),
                });
            }
            if endpoint.priority < 1 {
                return Err(RegistryError::InvalidConfig {
                    reason: format!("endpoint '{}' has priority 0 (must be >= 1)", endpoint.url),
                });
            }
        }

        Ok(())
    }
}

/// Application logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g. "trace", "debug", "info", "warn", "error").
    /// Defaults to `"info"`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

/// Top-level configuration: the set of networks to register at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VeilConfig {
    /// Per-network descriptor sets. Network names must be unique.
    pub networks: Vec<ProviderDescriptorSet>,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl VeilConfig {
    /// Loads configuration from a TOML file with `VEIL_*` environment
    /// variable overrides, then validates it.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed, or
    /// if validation fails (duplicate network names, invalid descriptors).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = Config::builder()
            .add_source(File::from(path))
            .add_source(Environment::with_prefix("VEIL").separator("__"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validates all descriptor sets and network-name uniqueness.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError::Message`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.networks.is_empty() {
            return Err(ConfigError::Message("no networks configured".to_string()));
        }

        let mut seen = HashSet::new();
        for network in &self.networks {
            if !seen.insert(network.network_name.as_str()) {
                return Err(ConfigError::Message(format!(
                    "duplicate network name '{}'",
                    network.network_name
                )));
            }
            network.validate().map_err(|e| ConfigError::Message(e.to_string()))?;
        }

        Ok(())
    }
}
