//! Password hashing with bcrypt.
//!
//! Every hash embeds a freshly generated salt, so hashing the same password
//! twice produces different strings while both still verify against the
//! original password.

use crate::error::AuthnError;

/// Default bcrypt cost factor.
pub const DEFAULT_COST: u32 = 10;

/// Minimum cost factor bcrypt accepts.
const MIN_COST: u32 = 4;
/// Maximum cost factor bcrypt accepts.
const MAX_COST: u32 = 31;

/// Salted password hasher.
///
/// # Example
///
/// ```
/// use idvault_authn::PasswordHasher;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let hasher = PasswordHasher::new();
/// let hash = hasher.hash("hunter2")?;
///
/// assert!(hasher.verify("hunter2", &hash)?);
/// assert!(!hasher.verify("wrong", &hash)?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy, Debug)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Create a hasher with the default cost factor.
    #[must_use]
    pub fn new() -> Self {
        Self { cost: DEFAULT_COST }
    }

    /// Create a hasher with an explicit cost factor.
    ///
    /// Tests use low costs (4) to keep hashing fast; production deployments
    /// should stay at the default or above.
    ///
    /// # Errors
    ///
    /// Returns [`AuthnError::InvalidCost`] if `cost` is outside `4..=31`.
    pub fn with_cost(cost: u32) -> Result<Self, AuthnError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(AuthnError::invalid_cost(cost));
        }
        Ok(Self { cost })
    }

    /// The configured cost factor.
    #[must_use]
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password with a freshly generated salt.
    ///
    /// # Errors
    ///
    /// Returns [`AuthnError::Hash`] if the underlying bcrypt operation fails.
    pub fn hash(&self, password: &str) -> Result<String, AuthnError> {
        bcrypt::hash(password, self.cost).map_err(|err| AuthnError::hash(err.to_string()))
    }

    /// Verify a plaintext password against a stored hash.
    ///
    /// Returns `Ok(false)` on a mismatch; errors are reserved for hashes
    /// that cannot be parsed at all.
    ///
    /// # Errors
    ///
    /// Returns [`AuthnError::MalformedHash`] if `hash` is not a valid bcrypt
    /// hash string.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthnError> {
        bcrypt::verify(password, hash).map_err(|err| AuthnError::malformed_hash(err.to_string()))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
