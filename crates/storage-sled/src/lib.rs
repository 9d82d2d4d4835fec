//! On-disk [`StorageBackend`](idvault_storage::StorageBackend) built on sled.
//!
//! This crate provides [`SledBackend`], the durable counterpart to the
//! in-memory backend in `idvault-storage`. Records survive process
//! restarts, keys iterate in lexicographic byte order, and
//! `compare_and_set` maps onto sled's native compare-and-swap so
//! insert-if-absent stays atomic under concurrent writers.
//!
//! Open a backend from a validated [`SledBackendConfig`]:
//!
//! ```no_run
//! use idvault_storage_sled::{SledBackend, SledBackendConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SledBackendConfig::builder()
//!     .with_path("data/dev/users")
//!     .build()?;
//! let backend = SledBackend::open(config)?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod config;
mod error;

pub use backend::SledBackend;
pub use config::{SledBackendConfig, SledBackendConfigBuilder, DEFAULT_CACHE_CAPACITY};
pub use error::{Result, SledStorageError};
