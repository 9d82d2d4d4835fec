//! Credential and token error types.

use thiserror::Error;

/// Errors from password hashing and bearer token handling.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]` — new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthnError {
    /// Token issuer was constructed with an empty signing secret.
    #[error("Signing secret must not be empty")]
    MissingSecret,

    /// Bcrypt cost factor is outside the supported range.
    #[error("Invalid bcrypt cost {cost}: must be between 4 and 31")]
    InvalidCost {
        /// The rejected cost factor.
        cost: u32,
    },

    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    Hash(String),

    /// Stored hash could not be parsed during verification.
    #[error("Malformed password hash: {0}")]
    MalformedHash(String),

    /// Token signing failed.
    #[error("Token signing failed: {0}")]
    Signing(String),

    /// Malformed bearer token - cannot be decoded.
    #[error("Invalid token format: {0}")]
    InvalidTokenFormat(String),
}

impl AuthnError {
    /// Create an [`AuthnError::InvalidCost`] for the given cost factor.
    #[must_use]
    pub fn invalid_cost(cost: u32) -> Self {
        Self::InvalidCost { cost }
    }

    /// Create an [`AuthnError::Hash`] with the given message.
    pub fn hash(message: impl Into<String>) -> Self {
        Self::Hash(message.into())
    }

    /// Create an [`AuthnError::MalformedHash`] with the given message.
    pub fn malformed_hash(message: impl Into<String>) -> Self {
        Self::MalformedHash(message.into())
    }

    /// Create an [`AuthnError::InvalidTokenFormat`] with the given message.
    pub fn invalid_token_format(message: impl Into<String>) -> Self {
        Self::InvalidTokenFormat(message.into())
    }
}

impl From<jsonwebtoken::errors::Error> for AuthnError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Signing(err.to_string())
    }
}
