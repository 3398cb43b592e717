//! Key-addressed cache for proving artifacts.
//!
//! Proving artifacts are large opaque byte blobs that are expensive to
//! fetch; the engine only ever needs a yes/no existence check plus byte
//! retrieval, so the cache exposes exactly three operations — `get`,
//! `store`, `exists` — over a pluggable [`ArtifactBackend`]:
//!
//! - [`fs::FsArtifactBackend`]: on-disk store rooted at a base directory,
//!   for devices with a usable filesystem,
//! - [`mem::MemoryArtifactBackend`]: in-memory store for tests and
//!   environments without one.
//!
//! Keys are caller-supplied relative paths, validated once at construction
//! ([`ArtifactKey`]) and otherwise opaque; how a key is derived from proof
//! type and parameters is the caller's concern.

pub mod fs;
pub mod mem;

use async_trait::async_trait;
use bytes::Bytes;
use std::{
    fmt,
    path::{Component, Path},
    sync::Arc,
};
use thiserror::Error;

pub use fs::FsArtifactBackend;
pub use mem::MemoryArtifactBackend;

/// A caller-supplied artifact key was not a safe relative path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid artifact key '{key}': {reason}")]
pub struct InvalidArtifactKey {
    /// The rejected key.
    pub key: String,
    /// Why it was rejected.
    pub reason: &'static str,
}

/// Relative path uniquely identifying one artifact across `get`, `store`,
/// and `exists`.
///
/// Construction enforces filesystem safety — non-empty, relative, no `.` or
/// `..` components, no NUL bytes — and nothing more; the cache imposes no
/// structure on what the path segments mean.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactKey(String);

impl ArtifactKey {
    /// Validates and wraps a relative path.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArtifactKey`] if the path is empty, absolute,
    /// contains `.`/`..` components, or contains a NUL byte.
    pub fn new(path: impl Into<String>) -> Result<Self, InvalidArtifactKey> {
        let path = path.into();

        let reject = |reason: &'static str, key: &str| {
            Err(InvalidArtifactKey { key: key.to_string(), reason })
        };

        if path.is_empty() {
            return reject("key is empty", &path);
        }
        if path.contains('\0') {
            return reject("key contains a NUL byte", &path);
        }

        for component in Path::new(&path).components() {
            match component {
                Component::Normal(_) => {}
                Component::ParentDir => return reject("key contains a '..' component", &path),
                Component::CurDir => return reject("key contains a '.' component", &path),
                Component::RootDir | Component::Prefix(_) => {
                    return reject("key must be a relative path", &path)
                }
            }
        }

        Ok(Self(path))
    }

    /// Returns the key as a path string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for ArtifactKey {
    type Error = InvalidArtifactKey;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Errors surfaced by artifact cache operations.
///
/// Callers must handle the two kinds distinctly: [`NotFound`](Self::NotFound)
/// is an expected, recoverable condition ("fetch or produce the artifact");
/// [`Io`](Self::Io) means the store itself is broken. The cache retries
/// nothing internally.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ArtifactError {
    /// No value is stored under the key.
    #[error("artifact not found: {key}")]
    NotFound { key: String },

    /// The backend failed.
    #[error("artifact backend failure for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Storage binding consumed by the artifact cache: read bytes by path,
/// write bytes to a path (creating intermediate grouping as needed), and a
/// path-exists predicate. The cache never touches storage except through
/// these three.
///
/// Implementations must tolerate concurrent reads during a write to a
/// different key; concurrent writes to the *same* key are last-writer-wins
/// and must never expose a torn value.
#[async_trait]
pub trait ArtifactBackend: Send + Sync {
    /// Reads the bytes stored at `path`.
    ///
    /// # Errors
    ///
    /// [`ArtifactError::NotFound`] if nothing is stored there,
    /// [`ArtifactError::Io`] on backend failure.
    async fn read(&self, path: &str) -> Result<Bytes, ArtifactError>;

    /// Writes `bytes` to `path`, creating implied intermediate grouping
    /// first and overwriting any existing value.
    ///
    /// # Errors
    ///
    /// [`ArtifactError::Io`] on backend failure.
    async fn write(&self, path: &str, bytes: Bytes) -> Result<(), ArtifactError>;

    /// Returns whether `path` holds a value. Never fails for a missing
    /// path.
    ///
    /// # Errors
    ///
    /// [`ArtifactError::Io`] if the backend is unreachable.
    async fn exists(&self, path: &str) -> Result<bool, ArtifactError>;
}

/// Key-addressed artifact cache over a concrete backend.
///
/// One instance exists per running engine and is shared across all
/// concurrent artifact requests (`Clone` is cheap).
#[derive(Clone)]
pub struct ArtifactStore {
    backend: Arc<dyn ArtifactBackend>,
}

impl ArtifactStore {
    /// Creates a store over the given backend.
    #[must_use]
    pub fn new(backend: Arc<dyn ArtifactBackend>) -> Self {
        Self { backend }
    }

    /// Returns whether an artifact is stored under `key`.
    ///
    /// # Errors
    ///
    /// [`ArtifactError::Io`] if the backend is unreachable; a missing key
    /// is `Ok(false)`, never an error.
    pub async fn exists(&self, key: &ArtifactKey) -> Result<bool, ArtifactError> {
        let present = self.backend.exists(key.as_str()).await?;
        tracing::debug!(key = %key, present = present, "artifact existence check");
        Ok(present)
    }

    /// Retrieves the artifact stored under `key`.
    ///
    /// # Errors
    ///
    /// [`ArtifactError::NotFound`] if the key has no stored value,
    /// [`ArtifactError::Io`] on backend failure.
    pub async fn get(&self, key: &ArtifactKey) -> Result<Bytes, ArtifactError> {
        match self.backend.read(key.as_str()).await {
            Ok(bytes) => {
                tracing::debug!(key = %key, size = bytes.len(), "artifact cache hit");
                Ok(bytes)
            }
            Err(error @ ArtifactError::NotFound { .. }) => {
                tracing::debug!(key = %key, "artifact cache miss");
                Err(error)
            }
            Err(error) => {
                tracing::warn!(key = %key, error = %error, "artifact read failed");
                Err(error)
            }
        }
    }

    /// Stores `bytes` under `key`, overwriting any existing artifact.
    ///
    /// Safe to call concurrently with `get`/`exists` on other keys;
    /// concurrent stores on the same key are last-writer-wins.
    ///
    /// # Errors
    ///
    /// [`ArtifactError::Io`] on backend failure.
    pub async fn store(&self, key: &ArtifactKey, bytes: Bytes) -> Result<(), ArtifactError> {
        let size = bytes.len();
        match self.backend.write(key.as_str(), bytes).await {
            Ok(()) => {
                tracing::debug!(key = %key, size = size, "artifact stored");
                Ok(())
            }
            Err(error) => {
                tracing::warn!(key = %key, error = %error, "artifact store failed");
                Err(error)
            }
        }
    }
}
