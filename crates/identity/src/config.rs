//! Service configuration.
//!
//! [`IdentityConfig`] gathers everything the identity service needs at
//! startup: which environment it runs in, where the on-disk store lives,
//! the token signing secret, and the bcrypt work factor. Built through a
//! validating builder so an invalid configuration fails fast at startup
//! rather than on first use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{IdentityError, IdentityResult};

/// Deployment environment.
///
/// Selects which named store the service opens, so test runs never touch
/// development data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development (the default).
    #[default]
    Development,
    /// Automated test runs.
    Test,
    /// Production deployment.
    Production,
}

impl Environment {
    /// The store directory name for this environment.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "dev",
            Self::Test => "test",
            Self::Production => "production",
        }
    }

    /// Classify an environment name, e.g. from an `SVC_ENV` variable.
    ///
    /// Any name containing `test` maps to [`Environment::Test`] and any
    /// containing `prod` to [`Environment::Production`]; everything else
    /// (including the empty string) is [`Environment::Development`].
    #[must_use]
    pub fn from_env_name(name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        if name.contains("test") {
            Self::Test
        } else if name.contains("prod") {
            Self::Production
        } else {
            Self::Development
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated identity service configuration.
#[derive(Clone, Debug)]
pub struct IdentityConfig {
    environment: Environment,
    data_dir: PathBuf,
    token_secret: String,
    bcrypt_cost: u32,
}

impl IdentityConfig {
    /// Start building a configuration.
    #[must_use]
    pub fn builder() -> IdentityConfigBuilder {
        IdentityConfigBuilder::default()
    }

    /// The deployment environment.
    #[must_use]
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Root directory for on-disk stores.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The token signing secret.
    #[must_use]
    pub fn token_secret(&self) -> &str {
        &self.token_secret
    }

    /// The bcrypt work factor for password hashing.
    #[must_use]
    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
    }

    /// The environment-scoped path of the user store,
    /// e.g. `<data_dir>/dev/users`.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(self.environment.as_str()).join("users")
    }
}

/// Builder for [`IdentityConfig`].
#[derive(Clone, Debug, Default)]
pub struct IdentityConfigBuilder {
    environment: Option<Environment>,
    data_dir: Option<PathBuf>,
    token_secret: Option<String>,
    bcrypt_cost: Option<u32>,
}

impl IdentityConfigBuilder {
    /// Set the deployment environment. Defaults to development.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Set the root data directory. Required.
    #[must_use]
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(data_dir.into());
        self
    }

    /// Set the token signing secret. Required, must be non-empty.
    #[must_use]
    pub fn with_token_secret(mut self, secret: impl Into<String>) -> Self {
        self.token_secret = Some(secret.into());
        self
    }

    /// Set the bcrypt work factor. Defaults to 10.
    #[must_use]
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = Some(cost);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Config`] if the data directory is missing,
    /// the token secret is missing or empty, or the bcrypt cost is outside
    /// `4..=31`.
    pub fn build(self) -> IdentityResult<IdentityConfig> {
        let data_dir = self
            .data_dir
            .ok_or_else(|| IdentityError::config("data directory is required"))?;
        if data_dir.as_os_str().is_empty() {
            return Err(IdentityError::config("data directory must not be empty"));
        }

        let token_secret = self
            .token_secret
            .ok_or_else(|| IdentityError::config("token secret is required"))?;
        if token_secret.is_empty() {
            return Err(IdentityError::config("token secret must not be empty"));
        }

        let bcrypt_cost = self.bcrypt_cost.unwrap_or(idvault_authn::DEFAULT_COST);
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(IdentityError::config(format!(
                "bcrypt cost {bcrypt_cost} is outside the supported range 4..=31"
            )));
        }

        Ok(IdentityConfig {
            environment: self.environment.unwrap_or_default(),
            data_dir,
            token_secret,
            bcrypt_cost,
        })
    }
}
