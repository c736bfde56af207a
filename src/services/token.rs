//! Bearer token service
//!
//! Issues and verifies HS256-signed tokens carrying the user's public
//! identity. Tokens are stateless; there is no revocation list, so a
//! token stays valid until its expiry.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::models::User;

/// Claims embedded in every issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: i64,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Profile picture URL
    pub profile: Option<String>,
    /// Issued-at (unix seconds)
    pub iat: u64,
    /// Expiry (unix seconds)
    pub exp: u64,
}

/// Token errors.
///
/// Expired and forged tokens are deliberately indistinguishable; both
/// map to `Invalid` so callers can't probe which failure occurred.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid,
    #[error("failed to issue token: {0}")]
    Issue(String),
}

/// Issues and verifies signed bearer tokens
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            ttl,
        }
    }

    /// Issue a token for the given user
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| TokenError::Issue(e.to_string()))?
            .as_secs();

        let claims = Claims {
            sub: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            profile: user.profile.clone(),
            iat: now,
            exp: now + self.ttl.as_secs(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Issue(e.to_string()))
    }

    /// Verify a token and return its claims.
    ///
    /// Any decode failure (bad signature, expired, malformed) is
    /// `TokenError::Invalid`.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)
    }
}
