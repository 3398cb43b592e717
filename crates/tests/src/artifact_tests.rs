//! Integration tests for the artifact cache across both backends.

use bytes::Bytes;
use std::sync::Arc;
use veil_core::{
    ArtifactBackend, ArtifactError, ArtifactKey, ArtifactStore, FsArtifactBackend,
    MemoryArtifactBackend,
};

fn key(path: &str) -> ArtifactKey {
    ArtifactKey::new(path).unwrap()
}

fn fs_store() -> (tempfile::TempDir, ArtifactStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(Arc::new(FsArtifactBackend::new(dir.path())));
    (dir, store)
}

#[tokio::test]
async fn test_fs_store_round_trip_with_nested_key() {
    let (_dir, store) = fs_store();
    let key = key("prover/snark/v2/params.bin");

    assert!(!store.exists(&key).await.unwrap());

    store.store(&key, Bytes::from_static(b"proving-params")).await.unwrap();

    assert!(store.exists(&key).await.unwrap());
    assert_eq!(store.get(&key).await.unwrap(), Bytes::from_static(b"proving-params"));
}

#[tokio::test]
async fn test_get_never_stored_key_is_not_found_only() {
    let (_dir, store) = fs_store();

    let error = store.get(&key("never/written.bin")).await.unwrap_err();
    assert!(matches!(error, ArtifactError::NotFound { .. }), "got {error:?}");
}

#[tokio::test]
async fn test_store_overwrites_existing_artifact() {
    let (_dir, store) = fs_store();
    let key = key("params.bin");

    store.store(&key, Bytes::from_static(b"first")).await.unwrap();
    store.store(&key, Bytes::from_static(b"second")).await.unwrap();

    assert_eq!(store.get(&key).await.unwrap(), Bytes::from_static(b"second"));
}

/// Concurrent stores to the same key must end with one of the two values
/// intact, never an interleaving of both.
async fn assert_last_writer_wins(backend: Arc<dyn ArtifactBackend>) {
    let store = ArtifactStore::new(backend);
    let key = key("contended/params.bin");

    let value_a = Bytes::from(vec![0xAA_u8; 256 * 1024]);
    let value_b = Bytes::from(vec![0xBB_u8; 256 * 1024]);

    let mut writers = Vec::new();
    for round in 0..8 {
        let store = store.clone();
        let key = key.clone();
        let value = if round % 2 == 0 { value_a.clone() } else { value_b.clone() };
        writers.push(tokio::spawn(async move { store.store(&key, value).await }));
    }
    for writer in writers {
        writer.await.unwrap().unwrap();
    }

    let stored = store.get(&key).await.unwrap();
    assert_eq!(stored.len(), 256 * 1024);
    let all_a = stored.iter().all(|&b| b == 0xAA);
    let all_b = stored.iter().all(|&b| b == 0xBB);
    assert!(all_a || all_b, "stored value is a corrupted mix");
}

#[tokio::test]
async fn test_concurrent_same_key_stores_memory_backend() {
    assert_last_writer_wins(Arc::new(MemoryArtifactBackend::new())).await;
}

#[tokio::test]
async fn test_concurrent_same_key_stores_fs_backend() {
    let dir = tempfile::tempdir().unwrap();
    assert_last_writer_wins(Arc::new(FsArtifactBackend::new(dir.path()))).await;
}

#[tokio::test]
async fn test_concurrent_distinct_keys_do_not_interfere() {
    let (_dir, store) = fs_store();

    let mut tasks = Vec::new();
    for index in 0..16 {
        let store = store.clone();
        tasks.push(tokio::spawn(async move {
            let key = ArtifactKey::new(format!("shard-{index}/artifact.bin")).unwrap();
            let value = Bytes::from(vec![index as u8; 4096]);

            store.store(&key, value.clone()).await.unwrap();
            assert!(store.exists(&key).await.unwrap());
            assert_eq!(store.get(&key).await.unwrap(), value);
        }));
    }

    for task in tasks {
        task.await.unwrap();
    }
}

#[tokio::test]
async fn test_reads_during_writes_to_other_keys() {
    let store = ArtifactStore::new(Arc::new(MemoryArtifactBackend::new()));
    let stable_key = key("stable.bin");
    store.store(&stable_key, Bytes::from_static(b"stable")).await.unwrap();

    let writer = tokio::spawn({
        let store = store.clone();
        async move {
            for round in 0..100_u8 {
                let key = key("churning.bin");
                store.store(&key, Bytes::from(vec![round; 1024])).await.unwrap();
            }
        }
    });

    for _ in 0..100 {
        assert_eq!(store.get(&stable_key).await.unwrap(), Bytes::from_static(b"stable"));
    }

    writer.await.unwrap();
}
