//! Configuration for the sled storage backend.
//!
//! This module provides [`SledBackendConfig`] which determines where the
//! on-disk store lives and how the sled engine is tuned.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SledStorageError};

/// Default page cache capacity (10 MB).
pub const DEFAULT_CACHE_CAPACITY: u64 = 10 * 1024 * 1024;

/// Configuration for [`SledBackend`](crate::SledBackend).
///
/// One on-disk store exists per environment; the path is expected to already
/// encode the environment (e.g. `data/dev/users`). The handle should be
/// opened once at process start and shared for the process lifetime.
///
/// # Example
///
/// ```no_run
/// use idvault_storage_sled::SledBackendConfig;
///
/// let config = SledBackendConfig::builder()
///     .with_path("data/dev/users")
///     .with_cache_capacity(16 * 1024 * 1024)
///     .build()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SledBackendConfig {
    /// Directory holding the store files.
    pub(crate) path: PathBuf,

    /// Page cache capacity in bytes.
    #[serde(default = "default_cache_capacity")]
    pub(crate) cache_capacity: u64,

    /// Background flush interval in milliseconds. `None` disables the
    /// periodic flusher; writes are then only durable after an explicit
    /// `flush` or `close`.
    #[serde(default = "default_flush_every_ms")]
    pub(crate) flush_every_ms: Option<u64>,
}

fn default_cache_capacity() -> u64 {
    DEFAULT_CACHE_CAPACITY
}

fn default_flush_every_ms() -> Option<u64> {
    Some(500)
}

impl SledBackendConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> SledBackendConfigBuilder {
        SledBackendConfigBuilder::default()
    }

    /// Returns the store directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the page cache capacity in bytes.
    #[must_use]
    pub fn cache_capacity(&self) -> u64 {
        self.cache_capacity
    }

    /// Returns the background flush interval, if enabled.
    #[must_use]
    pub fn flush_every_ms(&self) -> Option<u64> {
        self.flush_every_ms
    }

    /// Builds the sled engine configuration.
    pub(crate) fn build_sled_config(&self) -> sled::Config {
        sled::Config::new()
            .path(&self.path)
            .cache_capacity(self.cache_capacity)
            .flush_every_ms(self.flush_every_ms)
    }
}

/// Builder for [`SledBackendConfig`].
#[derive(Debug, Default)]
pub struct SledBackendConfigBuilder {
    path: Option<PathBuf>,
    cache_capacity: Option<u64>,
    flush_every_ms: Option<Option<u64>>,
}

impl SledBackendConfigBuilder {
    /// Sets the directory the store lives in.
    ///
    /// The directory is created on open if it does not exist.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the page cache capacity in bytes.
    ///
    /// Default: 10 MB.
    #[must_use]
    pub fn with_cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = Some(bytes);
        self
    }

    /// Sets the background flush interval in milliseconds.
    ///
    /// Default: 500 ms.
    #[must_use]
    pub fn with_flush_every_ms(mut self, ms: u64) -> Self {
        self.flush_every_ms = Some(Some(ms));
        self
    }

    /// Disables the periodic background flusher.
    ///
    /// Writes become durable only on explicit `flush` or `close`.
    #[must_use]
    pub fn without_periodic_flush(mut self) -> Self {
        self.flush_every_ms = Some(None);
        self
    }

    /// Builds the configuration, validating all settings.
    ///
    /// # Errors
    ///
    /// Returns an error if no path was provided or the path is empty.
    pub fn build(self) -> Result<SledBackendConfig> {
        let path =
            self.path.ok_or_else(|| SledStorageError::Config("path is required".into()))?;

        if path.as_os_str().is_empty() {
            return Err(SledStorageError::Config("path cannot be empty".into()));
        }

        Ok(SledBackendConfig {
            path,
            cache_capacity: self.cache_capacity.unwrap_or(DEFAULT_CACHE_CAPACITY),
            flush_every_ms: self.flush_every_ms.unwrap_or_else(default_flush_every_ms),
        })
    }
}
