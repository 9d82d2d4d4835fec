//! Shared test utilities for storage backend testing.
//!
//! This module provides common helpers for creating test backends, generating
//! test data, and asserting on [`StorageResult`] values. It is feature-gated
//! behind `testutil` to prevent leaking into production builds.
//!
//! # Usage
//!
//! In integration tests, enable the feature in `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! idvault-storage = { path = "../storage", features = ["testutil"] }
//! ```

use crate::{
    error::{StorageError, StorageResult},
    memory::MemoryBackend,
    StorageBackend,
};

// The assertion macros are exported at the crate root by `#[macro_export]`;
// re-export them here so `testutil::assert_conflict!` also resolves.
pub use crate::{assert_closed, assert_conflict};

/// Create a deterministic test key from a prefix and index.
///
/// Produces keys like `"prefix:000042"` (zero-padded to 6 digits) encoded
/// as UTF-8 bytes. The zero-padding ensures lexicographic ordering matches
/// numeric ordering, which is important for range scan tests.
#[must_use]
pub fn make_key(prefix: &str, idx: usize) -> Vec<u8> {
    format!("{prefix}:{idx:06}").into_bytes()
}

/// Create a test value of the given size filled with `0xAB` bytes.
#[must_use]
pub fn make_value(size: usize) -> Vec<u8> {
    vec![0xAB; size]
}

/// Create a [`MemoryBackend`] pre-populated with `count` keys.
///
/// Keys are formatted as `"{prefix}:{idx:06}"` with values of `value_size`
/// bytes each. The backend is ready for immediate use in tests.
///
/// # Panics
///
/// Panics if any `set` operation fails (should not happen with `MemoryBackend`).
pub async fn populated_backend(prefix: &str, count: usize, value_size: usize) -> MemoryBackend {
    let backend = MemoryBackend::new();
    let value = make_value(value_size);
    for i in 0..count {
        backend.set(make_key(prefix, i), value.clone()).await.expect("populate set failed");
    }
    backend
}

/// Assert that a [`StorageResult`] is a [`StorageError::Conflict`].
#[macro_export]
macro_rules! assert_conflict {
    ($result:expr) => {
        assert!(
            matches!($result, Err($crate::error::StorageError::Conflict)),
            "expected StorageError::Conflict, got: {:?}",
            $result,
        );
    };
    ($result:expr, $msg:expr) => {
        assert!(
            matches!($result, Err($crate::error::StorageError::Conflict)),
            "{}: expected StorageError::Conflict, got: {:?}",
            $msg,
            $result,
        );
    };
}

/// Assert that a [`StorageResult`] is a [`StorageError::Closed`].
#[macro_export]
macro_rules! assert_closed {
    ($result:expr) => {
        assert!(
            matches!($result, Err($crate::error::StorageError::Closed)),
            "expected StorageError::Closed, got: {:?}",
            $result,
        );
    };
}

/// Helper to verify that a result is a `Conflict` error.
pub fn is_conflict<T>(result: &StorageResult<T>) -> bool {
    matches!(result, Err(StorageError::Conflict))
}

/// Helper to verify that a result is a `Closed` error.
pub fn is_closed<T>(result: &StorageResult<T>) -> bool {
    matches!(result, Err(StorageError::Closed))
}
