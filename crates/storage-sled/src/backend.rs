//! Sled-backed implementation of [`StorageBackend`].
//!
//! [`SledBackend`] persists key-value pairs in a single on-disk sled tree.
//! Keys iterate in lexicographic byte order, single-key writes are atomic,
//! and a clean [`close`](StorageBackend::close) flushes everything so that
//! reopening the same path yields identical content.

use std::{
    ops::RangeBounds,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use bytes::Bytes;
use idvault_storage::{KeyValue, StorageBackend, StorageError, StorageResult};

use crate::{
    config::SledBackendConfig,
    error::{sled_error_to_storage_error, Result},
};

/// On-disk storage backend built on the sled embedded database.
///
/// The handle is opened once per process from a [`SledBackendConfig`] and
/// shared (it is cheaply cloneable; clones share the underlying tree and
/// closed state). sled serializes physical writes internally, so callers
/// need no external locking for single-key operations.
///
/// # Example
///
/// ```no_run
/// use idvault_storage::StorageBackend;
/// use idvault_storage_sled::{SledBackend, SledBackendConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SledBackendConfig::builder().with_path("data/dev/users").build()?;
/// let backend = SledBackend::open(config)?;
///
/// backend.set(b"ann@x.com".to_vec(), b"{}".to_vec()).await?;
/// let value = backend.get(b"ann@x.com").await?;
/// assert!(value.is_some());
///
/// backend.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SledBackend {
    db: sled::Db,
    closed: Arc<AtomicBool>,
}

impl SledBackend {
    /// Opens (or creates) the on-disk store at the configured path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is unusable (permissions, lock held by
    /// another process, corrupted store files).
    pub fn open(config: SledBackendConfig) -> Result<Self> {
        let db = config.build_sled_config().open()?;
        tracing::debug!(path = %config.path().display(), "opened sled store");
        Ok(Self { db, closed: Arc::new(AtomicBool::new(false)) })
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
impl StorageBackend for SledBackend {
    async fn get(&self, key: &[u8]) -> StorageResult<Option<Bytes>> {
        self.check_open()?;
        let value = self.db.get(key).map_err(sled_error_to_storage_error)?;
        Ok(value.map(|ivec| Bytes::copy_from_slice(&ivec)))
    }

    async fn set(&self, key: Vec<u8>, value: Vec<u8>) -> StorageResult<()> {
        self.check_open()?;
        self.db.insert(key, value).map_err(sled_error_to_storage_error)?;
        Ok(())
    }

    async fn compare_and_set(
        &self,
        key: &[u8],
        expected: Option<&[u8]>,
        new_value: Vec<u8>,
    ) -> StorageResult<()> {
        self.check_open()?;
        let swap = self
            .db
            .compare_and_swap(key, expected, Some(new_value))
            .map_err(sled_error_to_storage_error)?;

        swap.map_err(|_| StorageError::conflict())
    }

    async fn delete(&self, key: &[u8]) -> StorageResult<()> {
        self.check_open()?;
        // remove() returns the previous value; absent keys are a no-op,
        // which gives the idempotent delete the trait requires.
        self.db.remove(key).map_err(sled_error_to_storage_error)?;
        Ok(())
    }

    async fn get_range<R>(&self, range: R) -> StorageResult<Vec<KeyValue>>
    where
        R: RangeBounds<Vec<u8>> + Send,
    {
        self.check_open()?;

        let mut results = Vec::new();
        for entry in self.db.range::<Vec<u8>, R>(range) {
            let (key, value) = entry.map_err(sled_error_to_storage_error)?;
            results.push(KeyValue::new(
                Bytes::copy_from_slice(&key),
                Bytes::copy_from_slice(&value),
            ));
        }

        Ok(results)
    }

    async fn flush(&self) -> StorageResult<()> {
        self.check_open()?;
        self.db.flush_async().await.map_err(sled_error_to_storage_error)?;
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(StorageError::closed());
        }
        self.db.flush_async().await.map_err(sled_error_to_storage_error)?;
        tracing::debug!("closed sled store");
        Ok(())
    }
}
