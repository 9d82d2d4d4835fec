//! Storage backend trait definition.
//!
//! This module defines the [`StorageBackend`] trait, which is the core abstraction
//! for key-value storage in idvault. All storage implementations (MemoryBackend,
//! SledBackend, etc.) implement this trait.
//!
//! # Design Philosophy
//!
//! The trait provides a minimal, generic key-value interface:
//! - **Keys and values are bytes**: No assumptions about serialization format
//! - **Async by default**: All operations are async for non-blocking I/O
//! - **Ordered scans supported**: Range queries iterate in key order
//! - **Explicit lifecycle**: A handle is opened once, shared for the process
//!   lifetime, and closed before shutdown
//!
//! Domain-specific logic (user records, uniqueness by email) lives in the
//! repository layer built on top of this trait, not in the storage backends.
//!
//! # Implementing a Backend
//!
//! 1. Implement the [`StorageBackend`] trait
//! 2. Map backend-specific errors to [`StorageError`]
//! 3. Enforce the closed-handle contract: every operation after
//!    [`close`](StorageBackend::close) fails with [`StorageError::Closed`]
//!
//! See [`MemoryBackend`](crate::MemoryBackend) for a reference implementation.

use std::ops::RangeBounds;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};

use crate::{error::StorageResult, types::KeyValue, StorageError};

/// Abstract storage backend for key-value operations.
///
/// This trait defines the interface that all storage backends must implement.
/// Backends are expected to be thread-safe (`Send + Sync`) and support
/// concurrent operations; the backend serializes physical writes internally,
/// so callers need no external locking for single-key operations.
///
/// # Key Operations
///
/// | Method | Description |
/// |--------|-------------|
/// | [`get`](StorageBackend::get) | Retrieve a single value by key |
/// | [`set`](StorageBackend::set) | Store a key-value pair (overwrite) |
/// | [`compare_and_set`](StorageBackend::compare_and_set) | Atomic compare-and-swap |
/// | [`delete`](StorageBackend::delete) | Remove a key (idempotent) |
/// | [`get_range`](StorageBackend::get_range) | Retrieve keys in a range, ordered |
/// | [`flush`](StorageBackend::flush) | Force durability of prior writes |
/// | [`close`](StorageBackend::close) | Flush and release the handle |
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use idvault_storage::{MemoryBackend, StorageBackend};
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let backend = MemoryBackend::new();
///
/// backend.set(b"key".to_vec(), b"value".to_vec()).await.unwrap();
/// let value = backend.get(b"key").await.unwrap();
/// assert_eq!(value, Some(Bytes::from("value")));
/// # });
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Retrieves a value by key.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(bytes))` if the key exists
    /// - `Ok(None)` if the key doesn't exist
    /// - `Err(...)` on storage errors
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn get(&self, key: &[u8]) -> StorageResult<Option<Bytes>>;

    /// Stores a key-value pair.
    ///
    /// If the key already exists, its value is overwritten.
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn set(&self, key: Vec<u8>, value: Vec<u8>) -> StorageResult<()>;

    /// Atomically sets a key's value if it matches the expected current value.
    ///
    /// The `expected` parameter controls the precondition:
    ///
    /// - **`expected: None`** — insert-if-absent. Succeeds only when the key does not exist. Fails
    ///   with [`Conflict`](StorageError::Conflict) if any value is present.
    /// - **`expected: Some(value)`** — update-if-unchanged. Succeeds only when the current value is
    ///   an exact byte-for-byte match of `value`.
    ///
    /// The comparison is an exact, length-sensitive byte equality check; there
    /// is no normalization or encoding-aware comparison. Callers serializing
    /// structured data must ensure the byte representation is deterministic.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Conflict`] — the current value does not match `expected`.
    #[must_use = "compare-and-set may fail with a conflict and errors must be handled"]
    async fn compare_and_set(
        &self,
        key: &[u8],
        expected: Option<&[u8]>,
        new_value: Vec<u8>,
    ) -> StorageResult<()>;

    /// Atomically sets a key's JSON value if the current value deserializes to
    /// the expected value.
    ///
    /// Typed convenience wrapper around
    /// [`compare_and_set`](StorageBackend::compare_and_set). Both sides are
    /// serialized with the same serializer, so the comparison is deterministic
    /// for struct types (`serde_json` serializes struct fields in declaration
    /// order; avoid `HashMap` fields in CAS values).
    ///
    /// # Errors
    ///
    /// - [`StorageError::Serialization`] — `expected` or `new_value` cannot be serialized.
    /// - [`StorageError::Conflict`] — the current value does not match `expected`.
    #[must_use = "compare-and-set may fail with a conflict and errors must be handled"]
    async fn compare_and_set_json<T>(
        &self,
        key: &[u8],
        expected: Option<&T>,
        new_value: &T,
    ) -> StorageResult<()>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let expected_bytes = expected
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e: serde_json::Error| StorageError::serialization(e.to_string()))?;

        let new_bytes = serde_json::to_vec(new_value)
            .map_err(|e| StorageError::serialization(e.to_string()))?;

        self.compare_and_set(key, expected_bytes.as_deref(), new_bytes).await
    }

    /// Deletes a key.
    ///
    /// If the key doesn't exist, this is a no-op (returns `Ok(())`), so
    /// deletes are idempotent.
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn delete(&self, key: &[u8]) -> StorageResult<()>;

    /// Retrieves all key-value pairs within a range.
    ///
    /// The range is defined using Rust's standard [`RangeBounds`] trait,
    /// allowing for flexible range specifications:
    /// - `start..end` (exclusive end)
    /// - `start..=end` (inclusive end)
    /// - `start..` (unbounded end)
    /// - `..` (full scan)
    ///
    /// Results are returned in key order. Each call is an independent,
    /// restartable scan with no isolation guarantee against concurrent
    /// writers: readers may observe a mix of old and new values.
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn get_range<R>(&self, range: R) -> StorageResult<Vec<KeyValue>>
    where
        R: RangeBounds<Vec<u8>> + Send;

    /// Forces durability of all prior writes.
    ///
    /// For in-memory backends this is a no-op; on-disk backends sync to disk.
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn flush(&self) -> StorageResult<()>;

    /// Flushes and releases the store handle.
    ///
    /// After `close` returns, every subsequent operation — including a second
    /// `close` — fails with [`StorageError::Closed`]. Reopening an on-disk
    /// store after a clean close must yield identical content.
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn close(&self) -> StorageResult<()>;
}
