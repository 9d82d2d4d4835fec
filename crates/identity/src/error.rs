//! Identity service error types.
//!
//! Every fallible operation in this crate returns [`IdentityError`]. The
//! taxonomy distinguishes "no such record" ([`IdentityError::NotFound`])
//! from "record exists but cannot be used" ([`IdentityError::Unprocessable`]),
//! and collapses every authentication failure into the single
//! [`IdentityError::AuthFailed`] variant so callers cannot tell an unknown
//! email from a wrong password.

use idvault_authn::AuthnError;
use idvault_storage::StorageError;
use thiserror::Error;

/// Boxed error type for source chains.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias for identity operations.
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Errors from user repository and authentication operations.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]` — new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IdentityError {
    /// Input failed validation before reaching storage.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No user record exists for the email.
    #[error("No user found for {email}")]
    NotFound {
        /// The email that was looked up.
        email: String,
    },

    /// A user record already exists for the email.
    #[error("User already exists for {email}")]
    Duplicate {
        /// The email that collided.
        email: String,
    },

    /// The caller is not allowed to make this change.
    #[error("Permission denied: {0}")]
    Permission(String),

    /// Authentication failed.
    ///
    /// Deliberately carries no detail: unknown email and wrong password
    /// produce the same error so the API cannot be used to enumerate
    /// accounts.
    #[error("Authentication failed")]
    AuthFailed,

    /// The record exists but could not be read or used.
    #[error("Unprocessable record: {message}")]
    Unprocessable {
        /// What went wrong with the record.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// Service configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage backend failure.
    #[error("Storage error")]
    Storage(#[from] StorageError),

    /// Credential or token failure.
    #[error("Credential error")]
    Authn(#[from] AuthnError),
}

impl IdentityError {
    /// Create an [`IdentityError::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an [`IdentityError::NotFound`] for the given email.
    pub fn not_found(email: impl Into<String>) -> Self {
        Self::NotFound { email: email.into() }
    }

    /// Create an [`IdentityError::Duplicate`] for the given email.
    pub fn duplicate(email: impl Into<String>) -> Self {
        Self::Duplicate { email: email.into() }
    }

    /// Create an [`IdentityError::Permission`] with the given message.
    pub fn permission(message: impl Into<String>) -> Self {
        Self::Permission(message.into())
    }

    /// Create an [`IdentityError::Unprocessable`] with the given message.
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::Unprocessable { message: message.into(), source: None }
    }

    /// Create an [`IdentityError::Unprocessable`] with a source error.
    pub fn unprocessable_with_source(message: impl Into<String>, source: BoxError) -> Self {
        Self::Unprocessable { message: message.into(), source: Some(source) }
    }

    /// Create an [`IdentityError::Config`] with the given message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// The HTTP status code an API surface would map this error to.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation(_) | Self::Permission(_) | Self::Unprocessable { .. } => 422,
            Self::AuthFailed => 401,
            Self::Duplicate { .. } => 409,
            _ => 500,
        }
    }
}
