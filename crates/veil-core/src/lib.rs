//! # Veil Core
//!
//! Core library for the networking and artifact-availability layer of a
//! shielded wallet engine.
//!
//! This crate provides the two subsystems the engine depends on:
//!
//! - **[`provider`]**: Resilient multi-provider JSON-RPC routing with
//!   priority groups, weighted-random endpoint selection, per-attempt stall
//!   detection, and fee/latency telemetry.
//!
//! - **[`artifact`]**: A pluggable key-addressed cache for large
//!   cryptographic proving artifacts, with filesystem and in-memory
//!   backends.
//!
//! - **[`registry`]**: Binds named networks (name + chain id) to router
//!   instances for concurrent multi-network use.
//!
//! - **[`config`]**: Static per-network descriptor sets, loadable from TOML
//!   files with environment overrides.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                   NetworkRegistry                    │
//! │   "Ethereum" ──► ProviderRouter ──► Transport        │
//! │   "Polygon"  ──► ProviderRouter ──► Transport        │
//! │                       │                              │
//! │                       ▼                              │
//! │            EndpointTelemetry (per endpoint)          │
//! └──────────────────────────────────────────────────────┘
//!
//! ┌──────────────────────────────────────────────────────┐
//! │                    ArtifactStore                     │
//! │   get / store / exists ──► ArtifactBackend           │
//! │                             (fs, memory, ...)        │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Request Flow
//!
//! ```text
//! Caller ──► registry.router("Ethereum")
//!                 │
//!                 ▼
//!          ProviderRouter::request
//!                 │
//!     priority group 1 ── weighted pick ── call with deadline
//!                 │            │
//!                 │         timeout/error ──► next candidate
//!                 ▼
//!     priority group 2 ── ... ── all exhausted ──► AllProvidersUnavailable
//! ```

pub mod artifact;
pub mod config;
pub mod provider;
pub mod registry;
pub mod types;

pub use artifact::{
    ArtifactBackend, ArtifactError, ArtifactKey, ArtifactStore, FsArtifactBackend,
    InvalidArtifactKey, MemoryArtifactBackend,
};
pub use config::{ProviderDescriptorSet, ProviderEndpoint, VeilConfig, DEFAULT_STALL_TIMEOUT};
pub use provider::{
    AttemptFailure, EndpointSnapshot, EndpointTelemetry, HttpTransport, HttpTransportConfig,
    NetworkTelemetry, ProviderError, ProviderRouter, RegistryError, RouterResponse, Transport,
    TransportError, TransportReply,
};
pub use registry::NetworkRegistry;
pub use types::{RpcError, RpcRequest, RpcResponse};
