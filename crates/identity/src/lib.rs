//! Single-resource identity store: user records keyed by email.
//!
//! This crate composes the storage and credential layers into the two
//! services callers use:
//!
//! - [`UserRepository`] — CRUD over JSON user records, passwords hashed
//!   and a bearer token issued at creation
//! - [`AuthService`] — email/password authentication with fresh-token
//!   issuance on success
//!
//! ```text
//! AuthService ──▶ UserRepository ──▶ StorageBackend (memory or sled)
//!                      │
//!                      ├─▶ PasswordHasher (bcrypt)
//!                      └─▶ TokenIssuer (HS256)
//! ```
//!
//! # Example
//!
//! ```
//! use idvault_authn::{PasswordHasher, TokenIssuer};
//! use idvault_identity::{AuthService, NewUser, UserRepository};
//! use idvault_storage::MemoryBackend;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = UserRepository::new(
//!     MemoryBackend::new(),
//!     PasswordHasher::new(),
//!     TokenIssuer::new("shared-secret")?,
//! );
//!
//! let created = repo.create(NewUser::parse("Ann", "ann@x.com", "hunter2")?).await?;
//! println!("created {} with token {}", created.user.email, created.token);
//!
//! let auth = AuthService::new(repo);
//! let session = auth.authenticate("ann@x.com", "hunter2").await?;
//! assert_eq!(session.user.email, "ann@x.com");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod repository;
pub mod service;
pub mod user;

pub use config::{Environment, IdentityConfig, IdentityConfigBuilder};
pub use error::{IdentityError, IdentityResult};
pub use repository::{CreatedUser, UserRepository};
pub use service::{AuthService, AuthSession};
pub use user::{NewUser, PublicUser, User, UserPatch};
