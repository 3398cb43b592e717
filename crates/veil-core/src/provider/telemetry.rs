//! Per-endpoint fee and latency telemetry.
//!
//! Each router keeps one [`EndpointTelemetry`] slot per endpoint. Slots are
//! mutated through `&self` by concurrent requests: counters are atomics, and
//! the non-atomic fee/latency sample sits behind a short `parking_lot` lock
//! that is never held across an await point. Snapshot queries therefore
//! never block in-flight requests for more than a pointer-sized critical
//! section.
//!
//! # Ordering
//!
//! Telemetry reports "most recent observed", not "most recent issued": every
//! update carries the timestamp at which the response was observed, and an
//! update older than the stored sample is discarded. A slow, stale response
//! can never overwrite data from a newer one.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// One observed successful response: when it was observed, how long it
/// took, and any fee figure the provider reported.
#[derive(Debug, Clone)]
struct FeeSample {
    observed_at: DateTime<Utc>,
    latency_ms: u64,
    fee: Option<serde_json::Value>,
}

/// Telemetry slot for a single endpoint.
///
/// All methods take `&self`; counters use atomics and the sample uses a
/// short lock, so many concurrent requests can record outcomes without
/// coordination.
#[derive(Debug)]
pub struct EndpointTelemetry {
    url: Arc<str>,
    success_count: AtomicU64,
    failure_count: AtomicU64,
    last_sample: RwLock<Option<FeeSample>>,
}

impl EndpointTelemetry {
    /// Creates an empty telemetry slot for the given endpoint URL.
    #[must_use]
    pub fn new(url: Arc<str>) -> Self {
        Self {
            url,
            success_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
            last_sample: RwLock::new(None),
        }
    }

    /// Returns the endpoint URL this slot describes.
    #[must_use]
    pub fn url(&self) -> &Arc<str> {
        &self.url
    }

    /// Records a successful response observed at `observed_at`.
    ///
    /// Out-of-order updates are discarded: if the stored sample is newer
    /// than `observed_at`, the stored sample wins and this call is a no-op
    /// apart from the success counter.
    pub fn record_success(
        &self,
        observed_at: DateTime<Utc>,
        latency_ms: u64,
        fee: Option<serde_json::Value>,
    ) {
        self.success_count.fetch_add(1, Ordering::Relaxed);

        let mut sample = self.last_sample.write();
        if let Some(existing) = sample.as_ref() {
            if existing.observed_at > observed_at {
                tracing::trace!(
                    url = %self.url,
                    "discarding out-of-order telemetry update"
                );
                return;
            }
        }
        *sample = Some(FeeSample { observed_at, latency_ms, fee });
    }

    /// Records a failed attempt against this endpoint.
    pub fn record_failure(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Produces a serializable snapshot of this slot.
    #[must_use]
    pub fn snapshot(&self) -> EndpointSnapshot {
        let sample = self.last_sample.read().clone();

        EndpointSnapshot {
            url: self.url.to_string(),
            success_count: self.success_count.load(Ordering::Relaxed),
            failure_count: self.failure_count.load(Ordering::Relaxed),
            latency_ms: sample.as_ref().map(|s| s.latency_ms),
            last_fee: sample.as_ref().and_then(|s| s.fee.clone()),
            observed_at: sample.map(|s| s.observed_at),
        }
    }
}

/// Serializable telemetry for one endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointSnapshot {
    /// Endpoint URL.
    pub url: String,
    /// Successful responses recorded.
    pub success_count: u64,
    /// Failed attempts recorded.
    pub failure_count: u64,
    /// Latency of the most recent observed response in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    /// Last-known provider fee figure, opaque.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_fee: Option<serde_json::Value>,
    /// When the most recent sample was observed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<DateTime<Utc>>,
}

/// Serializable telemetry for a whole network.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkTelemetry {
    /// Network label the snapshot describes.
    pub network_name: String,
    /// Chain id of the network.
    pub chain_id: u64,
    /// One entry per configured endpoint.
    pub endpoints: Vec<EndpointSnapshot>,
}

impl NetworkTelemetry {
    /// Returns the last-known fees as a JSON object mapping endpoint URL to
    /// fee figure, omitting endpoints with no observed fee.
    #[must_use]
    pub fn fees_serialized(&self) -> serde_json::Value {
        let fees: serde_json::Map<String, serde_json::Value> = self
            .endpoints
            .iter()
            .filter_map(|e| e.last_fee.clone().map(|fee| (e.url.clone(), fee)))
            .collect();

        serde_json::Value::Object(fees)
    }
}
