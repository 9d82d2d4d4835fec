//! User repository: CRUD over a storage backend.
//!
//! Records are JSON-serialized [`User`] values keyed by email bytes. The
//! repository owns the hashing and token-issuance steps, so plaintext
//! passwords never reach storage and every created user leaves with a
//! bearer token.

use std::sync::Arc;

use idvault_authn::{PasswordHasher, TokenIssuer};
use idvault_storage::{StorageBackend, StorageError};

use crate::{
    error::{IdentityError, IdentityResult},
    user::{NewUser, PublicUser, User, UserPatch, ADMIN_KIND, DEFAULT_KIND},
};

/// Result of creating a user: the stored record (public shape) plus the
/// bearer token issued for it.
#[derive(Clone, Debug)]
pub struct CreatedUser {
    /// The created record with credentials stripped.
    pub user: PublicUser,
    /// Bearer token issued at creation.
    pub token: String,
}

/// CRUD repository for user records.
///
/// Generic over the storage backend so tests run against the in-memory
/// backend while deployments use the on-disk one. Clones share the
/// backend handle.
///
/// # Example
///
/// ```
/// use idvault_authn::{PasswordHasher, TokenIssuer};
/// use idvault_identity::{NewUser, UserRepository};
/// use idvault_storage::MemoryBackend;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let repo = UserRepository::new(
///     MemoryBackend::new(),
///     PasswordHasher::new(),
///     TokenIssuer::new("shared-secret")?,
/// );
///
/// let input = NewUser::parse("Ann", "ann@x.com", "hunter2")?;
/// let created = repo.create(input).await?;
/// assert_eq!(created.user.email, "ann@x.com");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct UserRepository<B: StorageBackend> {
    backend: Arc<B>,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
}

impl<B: StorageBackend> UserRepository<B> {
    /// Create a repository over the given backend and credential helpers.
    pub fn new(backend: B, hasher: PasswordHasher, issuer: TokenIssuer) -> Self {
        Self { backend: Arc::new(backend), hasher, issuer }
    }

    /// The token issuer this repository signs with.
    #[must_use]
    pub(crate) fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// The password hasher this repository hashes with.
    #[must_use]
    pub(crate) fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    /// Create a user record.
    ///
    /// The password is hashed with a fresh salt, a bearer token is issued
    /// and cached on the record, and the record is inserted only if no
    /// record exists for the email. The insert is atomic: two concurrent
    /// creates for the same email cannot both succeed.
    ///
    /// # Errors
    ///
    /// - [`IdentityError::Duplicate`] if a record already exists for the email
    /// - [`IdentityError::Authn`] if hashing or token signing fails
    /// - [`IdentityError::Storage`] on backend failure
    #[tracing::instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create(&self, input: NewUser) -> IdentityResult<CreatedUser> {
        let password = self.hasher.hash(&input.password)?;
        let token = self.issuer.issue(&input.email)?;

        let user = User {
            id: uuid::Uuid::new_v4(),
            name: input.name,
            email: input.email,
            password,
            kind: DEFAULT_KIND.to_string(),
            token: Some(token.clone()),
        };

        let value = serde_json::to_vec(&user).map_err(|err| {
            IdentityError::unprocessable_with_source("serializing user record", Box::new(err))
        })?;

        // Insert-if-absent: a Conflict here means the email is taken.
        match self.backend.compare_and_set(user.email.as_bytes(), None, value).await {
            Ok(()) => {}
            Err(StorageError::Conflict) => return Err(IdentityError::duplicate(&user.email)),
            Err(err) => return Err(err.into()),
        }

        tracing::info!(email = %user.email, id = %user.id, "created user");
        Ok(CreatedUser { user: PublicUser::from(&user), token })
    }

    /// Fetch a user by email, credentials stripped.
    ///
    /// # Errors
    ///
    /// - [`IdentityError::Validation`] if `email` is empty
    /// - [`IdentityError::NotFound`] if no record exists
    /// - [`IdentityError::Unprocessable`] if the stored record is not valid JSON
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, email: &str) -> IdentityResult<PublicUser> {
        let user = self.load(email).await?;
        Ok(PublicUser::from(user))
    }

    /// Fetch the full stored record, cached token and hash included.
    ///
    /// Crate-internal: the authentication service needs the hash to verify
    /// passwords, but the hash never crosses the crate boundary.
    pub(crate) async fn load(&self, email: &str) -> IdentityResult<User> {
        if email.is_empty() {
            return Err(IdentityError::validation("email must not be empty"));
        }

        let bytes = self
            .backend
            .get(email.as_bytes())
            .await?
            .ok_or_else(|| IdentityError::not_found(email))?;

        serde_json::from_slice(&bytes).map_err(|err| {
            tracing::error!(email, error = %err, "stored user record is not valid JSON");
            IdentityError::unprocessable_with_source(
                format!("stored record for {email} could not be decoded"),
                Box::new(err),
            )
        })
    }

    /// List every user, credentials stripped, in email order.
    ///
    /// The scan is eager: the whole store is read before the first record
    /// is returned, and any undecodable record fails the entire listing.
    ///
    /// # Errors
    ///
    /// - [`IdentityError::Unprocessable`] if any stored record is not valid JSON
    /// - [`IdentityError::Storage`] on backend failure
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> IdentityResult<Vec<PublicUser>> {
        let entries = self.backend.get_range(..).await?;

        let mut users = Vec::with_capacity(entries.len());
        for entry in entries {
            let user: User = serde_json::from_slice(&entry.value).map_err(|err| {
                let key = String::from_utf8_lossy(&entry.key).into_owned();
                tracing::error!(key, error = %err, "stored user record is not valid JSON");
                IdentityError::unprocessable_with_source(
                    format!("stored record for {key} could not be decoded"),
                    Box::new(err),
                )
            })?;
            users.push(PublicUser::from(user));
        }

        Ok(users)
    }

    /// Apply a partial update to an existing user.
    ///
    /// Field rules:
    /// - `name` and `password` may always change; a new password is
    ///   re-hashed with a fresh salt
    /// - `kind` only changes when the stored record is an admin
    /// - `email` changes are rejected: records are keyed by email
    ///
    /// # Errors
    ///
    /// - [`IdentityError::Validation`] on empty patch fields or an email change
    /// - [`IdentityError::NotFound`] if no record exists
    /// - [`IdentityError::Permission`] on a role change by a non-admin record
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, email: &str, patch: UserPatch) -> IdentityResult<PublicUser> {
        patch.validate()?;

        let mut user = self.load(email).await?;

        if let Some(new_email) = &patch.email {
            if new_email != &user.email {
                return Err(IdentityError::validation(
                    "email cannot be changed: records are keyed by email",
                ));
            }
        }
        if let Some(kind) = patch.kind {
            if user.kind != ADMIN_KIND {
                return Err(IdentityError::permission("only admins may change a user's type"));
            }
            user.kind = kind;
        }
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(password) = patch.password {
            user.password = self.hasher.hash(&password)?;
        }

        self.store(&user).await?;
        tracing::info!(email, "updated user");
        Ok(PublicUser::from(user))
    }

    /// Delete a user by email.
    ///
    /// Idempotent: deleting an absent record succeeds. Deleting the record
    /// also revokes its tokens, since authentication resolves against the
    /// stored record.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Validation`] if `email` is empty.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, email: &str) -> IdentityResult<()> {
        if email.is_empty() {
            return Err(IdentityError::validation("email must not be empty"));
        }
        self.backend.delete(email.as_bytes()).await?;
        tracing::info!(email, "deleted user");
        Ok(())
    }

    /// Persist a full record under its email key.
    pub(crate) async fn store(&self, user: &User) -> IdentityResult<()> {
        let value = serde_json::to_vec(user).map_err(|err| {
            IdentityError::unprocessable_with_source("serializing user record", Box::new(err))
        })?;
        self.backend.set(user.email.as_bytes().to_vec(), value).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use idvault_storage::MemoryBackend;

    fn test_repo() -> UserRepository<MemoryBackend> {
        UserRepository::new(
            MemoryBackend::new(),
            PasswordHasher::with_cost(4).unwrap(),
            TokenIssuer::new("test-secret").unwrap(),
        )
    }

    fn ann() -> NewUser {
        NewUser::parse("Ann", "ann@x.com", "hunter2").unwrap()
    }

    #[tokio::test]
    async fn test_create_hashes_password_and_issues_token() {
        let repo = test_repo();
        let created = repo.create(ann()).await.unwrap();

        assert_eq!(created.user.email, "ann@x.com");
        assert_eq!(created.user.kind, DEFAULT_KIND);
        assert!(!created.token.is_empty());

        // The stored record carries a hash, never the plaintext.
        let stored = repo.load("ann@x.com").await.unwrap();
        assert_ne!(stored.password, "hunter2");
        assert!(repo.hasher().verify("hunter2", &stored.password).unwrap());
        assert_eq!(stored.token.as_deref(), Some(created.token.as_str()));
    }

    #[tokio::test]
    async fn test_create_duplicate_email_conflicts() {
        let repo = test_repo();
        repo.create(ann()).await.unwrap();

        let err = repo.create(ann()).await.unwrap_err();
        assert!(matches!(err, IdentityError::Duplicate { .. }));
        assert_eq!(err.http_status(), 409);
    }

    #[tokio::test]
    async fn test_get_unknown_email_is_not_found() {
        let repo = test_repo();
        let err = repo.get("nobody@x.com").await.unwrap_err();
        assert!(matches!(err, IdentityError::NotFound { .. }));
        assert_eq!(err.http_status(), 404);
    }

    #[tokio::test]
    async fn test_get_empty_email_is_validation_error() {
        let repo = test_repo();
        let err = repo.get("").await.unwrap_err();
        assert!(matches!(err, IdentityError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_is_email_ordered() {
        let repo = test_repo();
        for (name, email) in [("Carol", "carol@x.com"), ("Ann", "ann@x.com"), ("Bob", "bob@x.com")]
        {
            repo.create(NewUser::parse(name, email, "pw").unwrap()).await.unwrap();
        }

        let users = repo.list().await.unwrap();
        let emails: Vec<&str> = users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, vec!["ann@x.com", "bob@x.com", "carol@x.com"]);
    }

    #[tokio::test]
    async fn test_update_name_and_password() {
        let repo = test_repo();
        repo.create(ann()).await.unwrap();

        let patch = UserPatch::new().with_name("Ann B.").with_password("new-password");
        let updated = repo.update("ann@x.com", patch).await.unwrap();
        assert_eq!(updated.name, "Ann B.");

        let stored = repo.load("ann@x.com").await.unwrap();
        assert!(repo.hasher().verify("new-password", &stored.password).unwrap());
        assert!(!repo.hasher().verify("hunter2", &stored.password).unwrap());
    }

    #[tokio::test]
    async fn test_update_kind_requires_admin() {
        let repo = test_repo();
        repo.create(ann()).await.unwrap();

        let err =
            repo.update("ann@x.com", UserPatch::new().with_kind("admin")).await.unwrap_err();
        assert!(matches!(err, IdentityError::Permission(_)));

        // The stored record is untouched after the rejected patch.
        let stored = repo.load("ann@x.com").await.unwrap();
        assert_eq!(stored.kind, DEFAULT_KIND);
    }

    #[tokio::test]
    async fn test_admin_may_change_kind() {
        let repo = test_repo();
        repo.create(ann()).await.unwrap();

        // Promote the stored record directly; role escalation has no
        // public entry point.
        let mut stored = repo.load("ann@x.com").await.unwrap();
        stored.kind = ADMIN_KIND.to_string();
        repo.store(&stored).await.unwrap();

        let updated =
            repo.update("ann@x.com", UserPatch::new().with_kind("user")).await.unwrap();
        assert_eq!(updated.kind, "user");
    }

    #[tokio::test]
    async fn test_update_rejects_email_change() {
        let repo = test_repo();
        repo.create(ann()).await.unwrap();

        let err = repo
            .update("ann@x.com", UserPatch::new().with_email("ann@elsewhere.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_with_same_email_is_allowed() {
        let repo = test_repo();
        repo.create(ann()).await.unwrap();

        let patch = UserPatch::new().with_email("ann@x.com").with_name("Ann B.");
        let updated = repo.update("ann@x.com", patch).await.unwrap();
        assert_eq!(updated.name, "Ann B.");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repo = test_repo();
        repo.create(ann()).await.unwrap();

        repo.delete("ann@x.com").await.unwrap();
        repo.delete("ann@x.com").await.unwrap();
        assert!(matches!(
            repo.get("ann@x.com").await.unwrap_err(),
            IdentityError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_undecodable_record_is_unprocessable_not_missing() {
        let backend = MemoryBackend::new();
        backend.set(b"broken@x.com".to_vec(), b"not json".to_vec()).await.unwrap();

        let repo = UserRepository::new(
            backend,
            PasswordHasher::with_cost(4).unwrap(),
            TokenIssuer::new("test-secret").unwrap(),
        );

        let err = repo.get("broken@x.com").await.unwrap_err();
        assert!(matches!(err, IdentityError::Unprocessable { .. }));
        assert_eq!(err.http_status(), 422);

        // The broken record also fails the whole listing.
        let err = repo.list().await.unwrap_err();
        assert!(matches!(err, IdentityError::Unprocessable { .. }));
    }
}
