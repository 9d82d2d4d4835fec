//! User record types.
//!
//! [`User`] is the stored shape, password hash and cached token included.
//! [`PublicUser`] is what leaves the repository: the same record with the
//! credential fields stripped. [`NewUser`] and [`UserPatch`] are the
//! validated inputs for create and update.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{IdentityError, IdentityResult};

/// Role assigned to every newly created user.
pub const DEFAULT_KIND: &str = "user";

/// Role allowed to change another user's role.
pub const ADMIN_KIND: &str = "admin";

/// A stored user record.
///
/// Serialized as JSON under the user's email key. `kind` is stored under
/// the wire name `type`.
// Records are keyed by email, so updates never change it; callers that
// need a new email delete and recreate the record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Stable record ID, assigned at creation.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Email address; also the storage key.
    pub email: String,
    /// Bcrypt password hash. Never the plaintext.
    pub password: String,
    /// Role, e.g. `"user"` or `"admin"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Most recently issued bearer token, cached for convenience.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Input for creating a user.
#[derive(Clone, Debug)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Email address, used as the storage key.
    pub email: String,
    /// Plaintext password; hashed before it reaches storage.
    pub password: String,
}

impl NewUser {
    /// Validate raw input into a [`NewUser`].
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Validation`] if any field is empty.
    pub fn parse(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> IdentityResult<Self> {
        let name = name.into();
        let email = email.into();
        let password = password.into();

        if name.is_empty() {
            return Err(IdentityError::validation("name must not be empty"));
        }
        if email.is_empty() {
            return Err(IdentityError::validation("email must not be empty"));
        }
        if password.is_empty() {
            return Err(IdentityError::validation("password must not be empty"));
        }

        Ok(Self { name, email, password })
    }
}

/// Partial update for an existing user.
///
/// Every field is optional; absent fields are left unchanged. A `kind`
/// change is only honored when the stored record is an admin.
#[derive(Clone, Debug, Default)]
pub struct UserPatch {
    /// New display name.
    pub name: Option<String>,
    /// New email. Rejected: records are keyed by email.
    pub email: Option<String>,
    /// New plaintext password; re-hashed before storage.
    pub password: Option<String>,
    /// New role.
    pub kind: Option<String>,
}

impl UserPatch {
    /// A patch that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the role.
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Reject patches whose present fields are empty strings.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Validation`] naming the offending field.
    pub fn validate(&self) -> IdentityResult<()> {
        let fields = [
            ("name", &self.name),
            ("email", &self.email),
            ("password", &self.password),
            ("type", &self.kind),
        ];
        for (field, value) in fields {
            if matches!(value.as_deref(), Some("")) {
                return Err(IdentityError::validation(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }
}

/// A user record with credential fields stripped, safe to return to callers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    /// Stable record ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Role.
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self { id: user.id, name: user.name, email: user.email, kind: user.kind }
    }
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            kind: user.kind.clone(),
        }
    }
}
