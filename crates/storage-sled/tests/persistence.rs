//! Integration tests exercising the sled backend against a real on-disk
//! store in a temporary directory.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use idvault_storage::{testutil, StorageBackend, StorageError};
use idvault_storage_sled::{SledBackend, SledBackendConfig};
use tempfile::TempDir;

fn open_backend(dir: &TempDir) -> SledBackend {
    let config = SledBackendConfig::builder()
        .with_path(dir.path().join("users"))
        .without_periodic_flush()
        .build()
        .expect("valid config");
    SledBackend::open(config).expect("open sled store")
}

#[tokio::test]
async fn set_get_delete_roundtrip() {
    let dir = TempDir::new().unwrap();
    let backend = open_backend(&dir);

    backend.set(b"ann@x.com".to_vec(), b"record".to_vec()).await.unwrap();
    let value = backend.get(b"ann@x.com").await.unwrap();
    assert_eq!(value.as_deref(), Some(b"record".as_slice()));

    backend.delete(b"ann@x.com").await.unwrap();
    assert!(backend.get(b"ann@x.com").await.unwrap().is_none());
}

#[tokio::test]
async fn get_missing_key_returns_none() {
    let dir = TempDir::new().unwrap();
    let backend = open_backend(&dir);

    assert!(backend.get(b"nobody@x.com").await.unwrap().is_none());
}

#[tokio::test]
async fn delete_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let backend = open_backend(&dir);

    backend.delete(b"never-existed").await.unwrap();
    backend.set(b"k".to_vec(), b"v".to_vec()).await.unwrap();
    backend.delete(b"k").await.unwrap();
    backend.delete(b"k").await.unwrap();
}

#[tokio::test]
async fn overwrite_replaces_value() {
    let dir = TempDir::new().unwrap();
    let backend = open_backend(&dir);

    backend.set(b"k".to_vec(), b"one".to_vec()).await.unwrap();
    backend.set(b"k".to_vec(), b"two".to_vec()).await.unwrap();

    let value = backend.get(b"k").await.unwrap();
    assert_eq!(value.as_deref(), Some(b"two".as_slice()));
}

#[tokio::test]
async fn compare_and_set_insert_if_absent() {
    let dir = TempDir::new().unwrap();
    let backend = open_backend(&dir);

    backend.compare_and_set(b"k", None, b"first".to_vec()).await.unwrap();

    // A second insert-if-absent against the now-present key must conflict.
    let result = backend.compare_and_set(b"k", None, b"second".to_vec()).await;
    testutil::assert_conflict!(result);

    let value = backend.get(b"k").await.unwrap();
    assert_eq!(value.as_deref(), Some(b"first".as_slice()));
}

#[tokio::test]
async fn compare_and_set_update_if_unchanged() {
    let dir = TempDir::new().unwrap();
    let backend = open_backend(&dir);

    backend.set(b"k".to_vec(), b"one".to_vec()).await.unwrap();
    backend.compare_and_set(b"k", Some(b"one"), b"two".to_vec()).await.unwrap();

    let result = backend.compare_and_set(b"k", Some(b"one"), b"three".to_vec()).await;
    testutil::assert_conflict!(result);
}

#[tokio::test]
async fn range_scan_is_key_ordered() {
    let dir = TempDir::new().unwrap();
    let backend = open_backend(&dir);

    // Insert out of order; the scan must come back sorted by key bytes.
    for key in ["carol@x.com", "ann@x.com", "bob@x.com"] {
        backend.set(key.as_bytes().to_vec(), b"v".to_vec()).await.unwrap();
    }

    let entries = backend.get_range(..).await.unwrap();
    let keys: Vec<&[u8]> = entries.iter().map(|kv| kv.key.as_ref()).collect();
    assert_eq!(keys, vec![b"ann@x.com".as_slice(), b"bob@x.com", b"carol@x.com"]);
}

#[tokio::test]
async fn bounded_range_scan() {
    let dir = TempDir::new().unwrap();
    let backend = open_backend(&dir);

    for idx in 0..10 {
        backend
            .set(testutil::make_key("user", idx), testutil::make_value(idx))
            .await
            .unwrap();
    }

    let start = testutil::make_key("user", 3);
    let end = testutil::make_key("user", 7);
    let entries = backend.get_range(start..end).await.unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0].key.as_ref(), testutil::make_key("user", 3).as_slice());
}

#[tokio::test]
async fn closed_handle_rejects_operations() {
    let dir = TempDir::new().unwrap();
    let backend = open_backend(&dir);

    backend.set(b"k".to_vec(), b"v".to_vec()).await.unwrap();
    backend.close().await.unwrap();

    testutil::assert_closed!(backend.get(b"k").await);
    testutil::assert_closed!(backend.set(b"k".to_vec(), b"v".to_vec()).await);
    testutil::assert_closed!(backend.delete(b"k").await);
    testutil::assert_closed!(backend.get_range(..).await);
    testutil::assert_closed!(backend.flush().await);
}

#[tokio::test]
async fn double_close_errors() {
    let dir = TempDir::new().unwrap();
    let backend = open_backend(&dir);

    backend.close().await.unwrap();
    let err = backend.close().await.unwrap_err();
    assert!(matches!(err, StorageError::Closed));
}

#[tokio::test]
async fn clones_share_closed_state() {
    let dir = TempDir::new().unwrap();
    let backend = open_backend(&dir);
    let clone = backend.clone();

    backend.close().await.unwrap();
    testutil::assert_closed!(clone.get(b"k").await);
}

#[tokio::test]
async fn data_survives_reopen() {
    let dir = TempDir::new().unwrap();

    {
        let backend = open_backend(&dir);
        backend.set(b"ann@x.com".to_vec(), b"record-a".to_vec()).await.unwrap();
        backend.set(b"bob@x.com".to_vec(), b"record-b".to_vec()).await.unwrap();
        backend.close().await.unwrap();
    }

    let backend = open_backend(&dir);
    let entries = backend.get_range(..).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(
        backend.get(b"ann@x.com").await.unwrap().as_deref(),
        Some(b"record-a".as_slice())
    );
}
