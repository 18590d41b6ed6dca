use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt;

use crate::types::db::user;
use crate::types::internal::Claims;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Session token has expired")]
    Expired,

    #[error("Invalid or malformed session token")]
    Invalid,

    #[error("Failed to create session token: {0}")]
    Creation(String),
}

/// Manages session token generation and validation
pub struct TokenService {
    jwt_secret: String,
    token_ttl_minutes: i64,
}

impl TokenService {
    /// Create a new TokenService with the given secret and token lifetime
    pub fn new(jwt_secret: String, token_ttl_minutes: i64) -> Self {
        Self {
            jwt_secret,
            token_ttl_minutes,
        }
    }

    /// Mint a session token for the given user.
    ///
    /// Claims carry id, username, email and role alongside the standard
    /// exp/iat pair.
    pub fn generate_token(&self, user: &user::Model) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let expiration = now + (self.token_ttl_minutes * 60);

        let claims = Claims {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            exp: expiration,
            iat: now,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| TokenError::Creation(e.to_string()))
    }

    /// Validate a session token and return its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })?;

        Ok(token_data.claims)
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .finish()
    }
}
