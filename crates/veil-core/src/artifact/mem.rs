//! In-memory artifact backend.
//!
//! Useful for tests and for environments without a usable filesystem. Keys
//! map to `Bytes` values in a sharded concurrent map, so reads during a
//! write to a different key never contend, and same-key writes are
//! last-writer-wins whole-value swaps.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use super::{ArtifactBackend, ArtifactError};

/// In-memory implementation of [`ArtifactBackend`].
#[derive(Default)]
pub struct MemoryArtifactBackend {
    entries: DashMap<String, Bytes>,
}

impl MemoryArtifactBackend {
    /// Creates a new, empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of artifacts currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no artifacts are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ArtifactBackend for MemoryArtifactBackend {
    async fn read(&self, path: &str) -> Result<Bytes, ArtifactError> {
        self.entries
            .get(path)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ArtifactError::NotFound { key: path.to_string() })
    }

    async fn write(&self, path: &str, bytes: Bytes) -> Result<(), ArtifactError> {
        self.entries.insert(path.to_string(), bytes);
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool, ArtifactError> {
        Ok(self.entries.contains_key(path))
    }
}
