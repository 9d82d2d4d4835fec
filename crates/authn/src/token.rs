//! Bearer token issuance and claim decoding.
//!
//! Tokens are HS256-signed JWTs carrying the subject email, an issued-at
//! timestamp, and a random token ID. The random `jti` claim means two
//! tokens issued for the same subject are always distinct strings, while
//! both decode to the same subject.
//!
//! Tokens carry no expiry; they are revoked by deleting the user record
//! they validate against.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthnError;

/// Claims embedded in an issued bearer token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject - the email of the user the token was issued for.
    pub sub: String,
    /// Issued at (seconds since epoch).
    pub iat: u64,
    /// Random token ID, unique per issuance.
    pub jti: String,
}

/// HS256 bearer token issuer.
///
/// # Example
///
/// ```
/// use idvault_authn::TokenIssuer;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let issuer = TokenIssuer::new("shared-secret")?;
/// let token = issuer.issue("ann@x.com")?;
///
/// let claims = TokenIssuer::decode_claims(&token)?;
/// assert_eq!(claims.sub, "ann@x.com");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The signing key must never appear in logs.
        f.debug_struct("TokenIssuer").finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Create an issuer from a shared signing secret.
    ///
    /// # Errors
    ///
    /// Returns [`AuthnError::MissingSecret`] if the secret is empty.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, AuthnError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(AuthnError::MissingSecret);
        }
        Ok(Self { encoding_key: EncodingKey::from_secret(secret) })
    }

    /// Issue a signed bearer token for the given subject email.
    ///
    /// Each call embeds a fresh random token ID, so repeated issuance for
    /// the same subject yields distinct token strings.
    ///
    /// # Errors
    ///
    /// Returns [`AuthnError::Signing`] if encoding fails.
    pub fn issue(&self, email: &str) -> Result<String, AuthnError> {
        let claims = TokenClaims {
            sub: email.to_string(),
            iat: Utc::now().timestamp().max(0) as u64,
            jti: Uuid::new_v4().to_string(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Decode the claims of a token without verifying its signature.
    ///
    /// Useful for inspecting which subject a token names; signature
    /// verification happens where the shared secret lives.
    ///
    /// # Errors
    ///
    /// Returns [`AuthnError::InvalidTokenFormat`] if the token is not a
    /// well-formed three-part JWT or the payload is not valid claims JSON.
    pub fn decode_claims(token: &str) -> Result<TokenClaims, AuthnError> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            return Err(AuthnError::invalid_token_format(format!(
                "expected 3 token segments, found {}",
                parts.len()
            )));
        }

        let payload = URL_SAFE_NO_PAD
            .decode(parts[1])
            .map_err(|err| AuthnError::invalid_token_format(format!("payload base64: {err}")))?;
        let claims: TokenClaims = serde_json::from_slice(&payload)
            .map_err(|err| AuthnError::invalid_token_format(format!("payload json: {err}")))?;

        if claims.sub.is_empty() {
            return Err(AuthnError::invalid_token_format("empty subject".to_string()));
        }

        Ok(claims)
    }
}
