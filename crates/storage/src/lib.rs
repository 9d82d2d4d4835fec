//! Shared storage backend abstraction for the idvault identity store.
//!
//! This crate provides the [`StorageBackend`] trait and related types that form
//! the foundation for all storage operations in idvault. The repository layer
//! and the on-disk backend both build on this abstraction, enabling a unified
//! storage layer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Repository Layer                          │
//! │        UserRepository │ AuthService (idvault-identity)      │
//! │         (domain logic, serialization, uniqueness)           │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   idvault-storage                           │
//! │                 StorageBackend trait                        │
//! │      (get, set, compare_and_set, delete, get_range)         │
//! ├──────────────┬──────────────────────────────────────────────┤
//! │ MemoryBackend│            SledBackend                       │
//! │   (testing)  │   (production, idvault-storage-sled)         │
//! └──────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use idvault_storage::{MemoryBackend, StorageBackend};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = MemoryBackend::new();
//!
//!     // Store a value
//!     backend.set(b"ann@x.com".to_vec(), b"{}".to_vec()).await?;
//!
//!     // Retrieve it
//!     let value = backend.get(b"ann@x.com").await?;
//!     assert!(value.is_some());
//!
//!     // Ordered full scan
//!     let all = backend.get_range(..).await?;
//!     assert_eq!(all.len(), 1);
//!
//!     // Close before shutdown; later operations fail with Closed
//!     backend.close().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Available Backends
//!
//! | Backend | Use Case | Persistence |
//! |---------|----------|-------------|
//! | [`MemoryBackend`] | Testing, development | No |
//! | `SledBackend` (in `idvault-storage-sled`) | Production | Yes |
//!
//! # Error Handling
//!
//! All operations return [`StorageResult<T>`], which wraps potential
//! [`StorageError`] variants. Backends map their internal errors to these
//! standardized error types.
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the `testutil` module with shared test helpers (key/value generators,
//!   backend factories, assertion macros). Enable this in `[dev-dependencies]` for integration
//!   tests.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod error;
pub mod memory;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used, missing_docs)]
pub mod testutil;
pub mod types;

// Re-export primary types at crate root for convenience
pub use backend::StorageBackend;
pub use error::{BoxError, StorageError, StorageResult};
pub use memory::MemoryBackend;
pub use types::KeyValue;
