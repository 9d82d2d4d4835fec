//! Credential primitives for the identity store.
//!
//! This crate holds the two stateless authentication building blocks the
//! repository layer composes:
//!
//! - [`PasswordHasher`] — bcrypt hashing with a fresh salt per hash
//! - [`TokenIssuer`] — HS256 bearer tokens keyed by subject email
//!
//! Both are cheap to clone and safe to share across tasks.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod password;
pub mod token;

pub use error::AuthnError;
pub use password::{PasswordHasher, DEFAULT_COST};
pub use token::{TokenClaims, TokenIssuer};
