//! Filesystem artifact backend.

use async_trait::async_trait;
use bytes::Bytes;
use std::{
    io,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use super::{ArtifactBackend, ArtifactError};

/// Monotonic counter distinguishing temp files of concurrent writers within
/// this process.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// [`ArtifactBackend`] rooted at a base directory (on mobile, the app's
/// document directory).
///
/// Writes go to a uniquely named temp file in the target directory and are
/// renamed into place, so concurrent writers to the same key are
/// last-writer-wins and a reader never observes a torn artifact.
pub struct FsArtifactBackend {
    root: PathBuf,
}

impl FsArtifactBackend {
    /// Creates a backend storing artifacts under `root`.
    ///
    /// The root itself is created lazily on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the base directory artifacts are stored under.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    fn io_error(path: &str, source: io::Error) -> ArtifactError {
        ArtifactError::Io { key: path.to_string(), source }
    }
}

#[async_trait]
impl ArtifactBackend for FsArtifactBackend {
    async fn read(&self, path: &str) -> Result<Bytes, ArtifactError> {
        match tokio::fs::read(self.resolve(path)).await {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ArtifactError::NotFound { key: path.to_string() })
            }
            Err(e) => Err(Self::io_error(path, e)),
        }
    }

    async fn write(&self, path: &str, bytes: Bytes) -> Result<(), ArtifactError> {
        let target = self.resolve(path);

        let parent = target
            .parent()
            .ok_or_else(|| Self::io_error(path, io::Error::other("key has no parent directory")))?;
        tokio::fs::create_dir_all(parent).await.map_err(|e| Self::io_error(path, e))?;

        // Unique temp name per writer; rename is atomic within a directory.
        let file_name = target
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Self::io_error(path, io::Error::other("key has no file name")))?;
        let temp = parent.join(format!(
            ".{file_name}.{}.{}.tmp",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        if let Err(e) = tokio::fs::write(&temp, &bytes).await {
            return Err(Self::io_error(path, e));
        }

        if let Err(e) = tokio::fs::rename(&temp, &target).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(Self::io_error(path, e));
        }

        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool, ArtifactError> {
        tokio::fs::try_exists(self.resolve(path)).await.map_err(|e| Self::io_error(path, e))
    }
}
