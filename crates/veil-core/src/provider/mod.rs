//! Multi-provider JSON-RPC routing.
//!
//! This module handles communication with the JSON-RPC providers serving a
//! network, including:
//! - Priority-group iteration with weighted-random endpoint selection
//! - Per-attempt stall detection and fallback to the next candidate
//! - Fee and latency telemetry per endpoint
//! - An abstract transport seam with a production HTTP implementation
//!
//! # Selection Strategy
//!
//! For each logical request the [`ProviderRouter`] walks priority groups in
//! ascending order. Within a group it draws endpoints weighted-randomly
//! without replacement until one answers inside its stall deadline or the
//! group is exhausted, then advances to the next group:
//!
//! ```text
//! Request → group 1 ── weighted draw ── attempt (deadline)
//!              │            │  success ──► return + record telemetry
//!              │            └─ stall/error ──► redraw from remainder
//!              ▼
//!           group 2 ── ... ── exhausted ──► AllProvidersUnavailable
//! ```
//!
//! Selection is recomputed per request: a failed attempt is remembered only
//! for the request that observed it, never as a global blacklist. This
//! bounds the effect of a transient outage to the requests concurrent with
//! it and lets an endpoint recover without explicit health-check machinery.

pub mod errors;
pub mod router;
pub mod telemetry;
pub mod transport;

pub use errors::{AttemptFailure, ProviderError, RegistryError, TransportError};
pub use router::{ProviderRouter, RouterResponse};
pub use telemetry::{EndpointSnapshot, EndpointTelemetry, NetworkTelemetry};
pub use transport::{HttpTransport, HttpTransportConfig, Transport, TransportReply};
