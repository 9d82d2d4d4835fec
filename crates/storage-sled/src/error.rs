//! Error types for the sled storage backend.
//!
//! This module provides error types that map between sled's errors and the
//! generic [`StorageError`](idvault_storage::StorageError) type.

use idvault_storage::StorageError;
use thiserror::Error;

/// Result type alias for sled storage operations.
pub type Result<T> = std::result::Result<T, SledStorageError>;

/// Errors specific to the sled storage backend.
///
/// This error type wraps sled errors and provides additional context
/// for storage-layer failures.
#[derive(Debug, Error)]
pub enum SledStorageError {
    /// Error from the sled engine.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<SledStorageError> for StorageError {
    fn from(err: SledStorageError) -> Self {
        match err {
            SledStorageError::Sled(source) => sled_error_to_storage_error(source),
            SledStorageError::Config(message) => {
                StorageError::internal(format!("Config: {message}"))
            },
        }
    }
}

/// Converts a sled error to a storage error.
///
/// This mapping preserves the semantic meaning of errors while using the
/// canonical [`StorageError`] variants. Infrastructure faults are logged
/// once here, at the origination point, and nowhere else.
pub(crate) fn sled_error_to_storage_error(err: sled::Error) -> StorageError {
    match err {
        sled::Error::Io(io_err) => StorageError::io_with_source("sled I/O failure", io_err),
        sled::Error::Corruption { .. } => {
            tracing::error!(error = %err, "sled detected on-disk corruption");
            StorageError::internal_with_source("sled corruption", err)
        },
        sled::Error::ReportableBug(ref message) => {
            tracing::error!(message = %message, "sled reported an internal bug");
            StorageError::internal_with_source("sled internal bug", err)
        },
        sled::Error::Unsupported(ref message) => {
            StorageError::internal(format!("sled unsupported operation: {message}"))
        },
        sled::Error::CollectionNotFound(_) => {
            StorageError::internal("sled collection not found")
        },
    }
}
