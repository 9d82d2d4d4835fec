//! Authentication service.
//!
//! Verifies an email/password pair against the stored record and issues a
//! fresh bearer token on success. Every failure mode collapses into
//! [`IdentityError::AuthFailed`] so the service cannot be used to probe
//! which emails have accounts.

use idvault_storage::StorageBackend;

use crate::{
    error::{IdentityError, IdentityResult},
    repository::UserRepository,
    user::PublicUser,
};

/// A successful authentication: the fresh token and the authenticated user.
#[derive(Clone, Debug)]
pub struct AuthSession {
    /// Newly issued bearer token.
    pub token: String,
    /// The authenticated user, credentials stripped.
    pub user: PublicUser,
}

/// Email/password authentication over a [`UserRepository`].
///
/// # Example
///
/// ```
/// use idvault_authn::{PasswordHasher, TokenIssuer};
/// use idvault_identity::{AuthService, NewUser, UserRepository};
/// use idvault_storage::MemoryBackend;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let repo = UserRepository::new(
///     MemoryBackend::new(),
///     PasswordHasher::new(),
///     TokenIssuer::new("shared-secret")?,
/// );
/// repo.create(NewUser::parse("Ann", "ann@x.com", "hunter2")?).await?;
///
/// let auth = AuthService::new(repo);
/// let session = auth.authenticate("ann@x.com", "hunter2").await?;
/// assert_eq!(session.user.email, "ann@x.com");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AuthService<B: StorageBackend> {
    repository: UserRepository<B>,
}

impl<B: StorageBackend> AuthService<B> {
    /// Create an authentication service over the given repository.
    pub fn new(repository: UserRepository<B>) -> Self {
        Self { repository }
    }

    /// The repository this service authenticates against.
    #[must_use]
    pub fn repository(&self) -> &UserRepository<B> {
        &self.repository
    }

    /// Authenticate an email/password pair.
    ///
    /// On success a fresh token is issued (distinct from any previously
    /// issued token for the user) and cached on the stored record on a
    /// best-effort basis: a failure to persist the cached token is logged
    /// but does not fail the authentication.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::AuthFailed`] whether the email is unknown
    /// or the password is wrong; the two cases are indistinguishable to
    /// the caller. Backend and record-decoding failures pass through
    /// unchanged.
    #[tracing::instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> IdentityResult<AuthSession> {
        let mut user = match self.repository.load(email).await {
            Ok(user) => user,
            Err(IdentityError::NotFound { .. }) => {
                tracing::debug!(email, "authentication failed: unknown email");
                return Err(IdentityError::AuthFailed);
            }
            Err(err) => return Err(err),
        };

        let verified = self.repository.hasher().verify(password, &user.password)?;
        if !verified {
            tracing::debug!(email, "authentication failed: password mismatch");
            return Err(IdentityError::AuthFailed);
        }

        let token = self.repository.issuer().issue(email)?;

        // Best effort: the session is valid even if the cached copy of the
        // token cannot be written back.
        user.token = Some(token.clone());
        if let Err(err) = self.repository.store(&user).await {
            tracing::warn!(email, error = %err, "failed to cache issued token on user record");
        }

        tracing::info!(email, "authenticated user");
        Ok(AuthSession { token, user: PublicUser::from(user) })
    }
}
