//! In-memory storage backend implementation.
//!
//! This module provides [`MemoryBackend`], an in-memory implementation of
//! [`StorageBackend`] suitable for testing and development.
//!
//! # Features
//!
//! - **Thread-safe**: Uses [`parking_lot::RwLock`] for concurrent access
//! - **Ordered storage**: Keys are stored in a [`BTreeMap`] so range scans
//!   iterate in key order
//! - **Lifecycle enforcement**: Honors the closed-handle contract of
//!   [`StorageBackend::close`]
//!
//! # Example
//!
//! ```
//! use idvault_storage::{MemoryBackend, StorageBackend};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = MemoryBackend::new();
//!
//!     backend.set(b"greeting".to_vec(), b"hello".to_vec()).await.unwrap();
//!     let value = backend.get(b"greeting").await.unwrap();
//!
//!     assert_eq!(value.unwrap().as_ref(), b"hello");
//! }
//! ```
//!
//! # Limitations
//!
//! - Data is not persisted; all data is lost when the process exits
//! - `flush` is a no-op

use std::{
    collections::BTreeMap,
    ops::{Bound, RangeBounds},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use crate::{
    backend::StorageBackend,
    error::{StorageError, StorageResult},
    types::KeyValue,
};

/// In-memory storage backend using [`BTreeMap`].
///
/// This backend is primarily intended for testing but can also be used
/// for development or small-scale deployments where persistence is not
/// required.
///
/// # Cloning
///
/// `MemoryBackend` is cheaply cloneable via [`Arc`]. All clones share the
/// same underlying data store and closed state: closing one handle closes
/// them all.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    data: Arc<RwLock<BTreeMap<Vec<u8>, Bytes>>>,
    closed: Arc<AtomicBool>,
}

impl MemoryBackend {
    /// Creates a new, empty in-memory storage backend.
    ///
    /// # Example
    ///
    /// ```
    /// use idvault_storage::MemoryBackend;
    ///
    /// let backend = MemoryBackend::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `Err(Closed)` when the handle has been closed.
    fn check_open(&self) -> StorageResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StorageError::closed());
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn get(&self, key: &[u8]) -> StorageResult<Option<Bytes>> {
        self.check_open()?;
        let data = self.data.read();
        Ok(data.get(key).cloned())
    }

    async fn set(&self, key: Vec<u8>, value: Vec<u8>) -> StorageResult<()> {
        self.check_open()?;
        let mut data = self.data.write();
        data.insert(key, Bytes::from(value));
        Ok(())
    }

    async fn compare_and_set(
        &self,
        key: &[u8],
        expected: Option<&[u8]>,
        new_value: Vec<u8>,
    ) -> StorageResult<()> {
        self.check_open()?;
        let mut data = self.data.write();

        let current = data.get(key);
        let matches = match (expected, current) {
            (None, None) => true,
            (Some(exp), Some(cur)) => exp == &cur[..],
            _ => false,
        };

        if !matches {
            return Err(StorageError::Conflict);
        }

        data.insert(key.to_vec(), Bytes::from(new_value));
        Ok(())
    }

    async fn delete(&self, key: &[u8]) -> StorageResult<()> {
        self.check_open()?;
        let mut data = self.data.write();
        data.remove(key);
        Ok(())
    }

    async fn get_range<R>(&self, range: R) -> StorageResult<Vec<KeyValue>>
    where
        R: RangeBounds<Vec<u8>> + Send,
    {
        self.check_open()?;
        let data = self.data.read();

        let start = match range.start_bound() {
            Bound::Included(b) => Bound::Included(b.as_slice()),
            Bound::Excluded(b) => Bound::Excluded(b.as_slice()),
            Bound::Unbounded => Bound::Unbounded,
        };

        let end = match range.end_bound() {
            Bound::Included(b) => Bound::Included(b.as_slice()),
            Bound::Excluded(b) => Bound::Excluded(b.as_slice()),
            Bound::Unbounded => Bound::Unbounded,
        };

        let results: Vec<KeyValue> = data
            .range::<[u8], _>((start, end))
            .map(|(k, v)| KeyValue::new(Bytes::copy_from_slice(k), v.clone()))
            .collect();

        Ok(results)
    }

    async fn flush(&self) -> StorageResult<()> {
        // Nothing to persist; still honors the closed-handle contract.
        self.check_open()
    }

    async fn close(&self) -> StorageResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(StorageError::closed());
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_basic_operations() {
        let backend = MemoryBackend::new();

        // Set and get
        backend.set(b"key1".to_vec(), b"value1".to_vec()).await.unwrap();
        let value = backend.get(b"key1").await.unwrap();
        assert_eq!(value, Some(Bytes::from("value1")));

        // Delete
        backend.delete(b"key1").await.unwrap();
        let value = backend.get(b"key1").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_overwrite_existing_key() {
        let backend = MemoryBackend::new();

        backend.set(b"key".to_vec(), b"old".to_vec()).await.unwrap();
        backend.set(b"key".to_vec(), b"new".to_vec()).await.unwrap();

        let value = backend.get(b"key").await.unwrap();
        assert_eq!(value, Some(Bytes::from("new")));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let backend = MemoryBackend::new();

        // Deleting a key that never existed must not fail
        backend.delete(b"ghost").await.unwrap();
        backend.delete(b"ghost").await.unwrap();
    }

    #[tokio::test]
    async fn test_range_operations() {
        let backend = MemoryBackend::new();

        backend.set(b"a".to_vec(), b"1".to_vec()).await.unwrap();
        backend.set(b"b".to_vec(), b"2".to_vec()).await.unwrap();
        backend.set(b"c".to_vec(), b"3".to_vec()).await.unwrap();

        let range = backend.get_range(b"a".to_vec()..b"c".to_vec()).await.unwrap();
        assert_eq!(range.len(), 2);
        assert_eq!(range[0].key, Bytes::from("a"));
        assert_eq!(range[1].key, Bytes::from("b"));
    }

    #[tokio::test]
    async fn test_full_scan_is_ordered() {
        let backend = MemoryBackend::new();

        // Insert out of order
        backend.set(b"charlie".to_vec(), b"3".to_vec()).await.unwrap();
        backend.set(b"alice".to_vec(), b"1".to_vec()).await.unwrap();
        backend.set(b"bob".to_vec(), b"2".to_vec()).await.unwrap();

        let all = backend.get_range(..).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].key, Bytes::from("alice"));
        assert_eq!(all[1].key, Bytes::from("bob"));
        assert_eq!(all[2].key, Bytes::from("charlie"));
    }

    #[tokio::test]
    async fn test_compare_and_set_insert_if_absent() {
        let backend = MemoryBackend::new();

        backend.compare_and_set(b"new_key", None, b"value".to_vec()).await.unwrap();

        let value = backend.get(b"new_key").await.unwrap();
        assert_eq!(value, Some(Bytes::from("value")));

        // Second insert-if-absent fails
        let result = backend.compare_and_set(b"new_key", None, b"other".to_vec()).await;
        assert!(matches!(result, Err(StorageError::Conflict)));
    }

    #[tokio::test]
    async fn test_compare_and_set_update_if_unchanged() {
        let backend = MemoryBackend::new();

        backend.set(b"key".to_vec(), b"value1".to_vec()).await.unwrap();

        backend
            .compare_and_set(b"key", Some(b"value1".as_slice()), b"value2".to_vec())
            .await
            .unwrap();

        let value = backend.get(b"key").await.unwrap();
        assert_eq!(value, Some(Bytes::from("value2")));

        // Stale expected value conflicts and leaves the value unchanged
        let result =
            backend.compare_and_set(b"key", Some(b"value1".as_slice()), b"value3".to_vec()).await;
        assert!(matches!(result, Err(StorageError::Conflict)));
        assert_eq!(backend.get(b"key").await.unwrap(), Some(Bytes::from("value2")));
    }

    #[tokio::test]
    async fn test_operations_after_close_fail() {
        let backend = MemoryBackend::new();
        backend.set(b"key".to_vec(), b"value".to_vec()).await.unwrap();

        backend.close().await.unwrap();

        assert!(matches!(backend.get(b"key").await, Err(StorageError::Closed)));
        assert!(matches!(
            backend.set(b"key".to_vec(), b"value".to_vec()).await,
            Err(StorageError::Closed)
        ));
        assert!(matches!(backend.delete(b"key").await, Err(StorageError::Closed)));
        assert!(matches!(backend.get_range(..).await, Err(StorageError::Closed)));
        assert!(matches!(backend.flush().await, Err(StorageError::Closed)));
    }

    #[tokio::test]
    async fn test_double_close_fails() {
        let backend = MemoryBackend::new();

        backend.close().await.unwrap();
        assert!(matches!(backend.close().await, Err(StorageError::Closed)));
    }

    #[tokio::test]
    async fn test_clone_shares_data_and_closed_state() {
        let backend1 = MemoryBackend::new();
        let backend2 = backend1.clone();

        backend1.set(b"key".to_vec(), b"value".to_vec()).await.unwrap();
        let value = backend2.get(b"key").await.unwrap();
        assert_eq!(value, Some(Bytes::from("value")));

        backend1.close().await.unwrap();
        assert!(matches!(backend2.get(b"key").await, Err(StorageError::Closed)));
    }

    #[tokio::test]
    async fn test_compare_and_set_json() {
        #[derive(serde::Serialize, serde::Deserialize, Clone)]
        struct Record {
            version: u32,
            name: String,
        }

        let backend = MemoryBackend::new();
        let v1 = Record { version: 1, name: "ann".into() };

        backend.compare_and_set_json::<Record>(b"record", None, &v1).await.unwrap();

        let v2 = Record { version: 2, name: "ann".into() };
        backend.compare_and_set_json(b"record", Some(&v1), &v2).await.unwrap();

        let result = backend.compare_and_set_json(b"record", Some(&v1), &v2).await;
        assert!(matches!(result, Err(StorageError::Conflict)));
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        /// Strategy for generating a sorted, deduplicated set of keys.
        fn arb_sorted_keys() -> impl Strategy<Value = Vec<Vec<u8>>> {
            proptest::collection::vec(proptest::collection::vec(any::<u8>(), 1..16), 0..30)
                .prop_map(|mut keys| {
                    keys.sort();
                    keys.dedup();
                    keys
                })
        }

        proptest! {
            /// All keys returned by `get_range` must fall within the requested bounds.
            #[test]
            fn range_query_returns_keys_within_bounds(
                keys in arb_sorted_keys(),
                a in proptest::collection::vec(any::<u8>(), 1..8),
                b in proptest::collection::vec(any::<u8>(), 1..8),
            ) {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("runtime");

                rt.block_on(async {
                    let backend = MemoryBackend::new();
                    for key in &keys {
                        backend.set(key.clone(), b"v".to_vec()).await.unwrap();
                    }

                    // Ensure start <= end to avoid BTreeMap panic
                    let (start, end) = if a <= b { (a, b) } else { (b, a) };

                    let results = backend.get_range(start.clone()..end.clone()).await.unwrap();

                    for kv in &results {
                        let k = kv.key.to_vec();
                        prop_assert!(k >= start, "key {:?} < start {:?}", k, start);
                        prop_assert!(k < end, "key {:?} >= end {:?}", k, end);
                    }

                    Ok(())
                })?;
            }

            /// The count of keys returned by `get_range` must equal the count of
            /// stored keys that fall within the bounds.
            #[test]
            fn range_query_count_matches_expected(
                keys in arb_sorted_keys(),
                a in proptest::collection::vec(any::<u8>(), 1..8),
                b in proptest::collection::vec(any::<u8>(), 1..8),
            ) {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("runtime");

                rt.block_on(async {
                    let backend = MemoryBackend::new();
                    for key in &keys {
                        backend.set(key.clone(), b"v".to_vec()).await.unwrap();
                    }

                    let (start, end) = if a <= b { (a, b) } else { (b, a) };

                    let results = backend.get_range(start.clone()..end.clone()).await.unwrap();
                    let expected_count = keys
                        .iter()
                        .filter(|k| **k >= start && **k < end)
                        .count();
                    prop_assert_eq!(results.len(), expected_count);

                    Ok(())
                })?;
            }

            /// Results from `get_range` must be sorted by key.
            #[test]
            fn range_query_results_are_sorted(
                keys in arb_sorted_keys(),
                a in proptest::collection::vec(any::<u8>(), 1..8),
                b in proptest::collection::vec(any::<u8>(), 1..8),
            ) {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("runtime");

                rt.block_on(async {
                    let backend = MemoryBackend::new();
                    for key in &keys {
                        backend.set(key.clone(), b"v".to_vec()).await.unwrap();
                    }

                    let (start, end) = if a <= b { (a, b) } else { (b, a) };

                    let results = backend.get_range(start..end).await.unwrap();
                    for pair in results.windows(2) {
                        prop_assert!(pair[0].key <= pair[1].key);
                    }

                    Ok(())
                })?;
            }
        }
    }
}
