//! JWT token generation and validation

use glossa_shared::UserId;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// JWT claims structure for Glossa-issued tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: UserId,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
    /// Super-authentication expiry. Only present on super tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ste: Option<i64>,
    /// JWT ID, unique per issued token
    pub jti: String,
}

impl Claims {
    /// Whether the token still carries super-authentication at `now`
    pub fn is_super_at(&self, now: OffsetDateTime) -> bool {
        self.ste.is_some_and(|ste| ste > now.unix_timestamp())
    }
}

/// Mints opaque bearer credentials for users
pub trait TokenIssuer: Send + Sync {
    /// Issue a token for `user_id`; `super_token` marks a super-admin-issued
    /// (impersonation) credential.
    fn issue(&self, user_id: UserId, super_token: bool) -> Result<String, JwtError>;
}

/// JWT manager for token operations
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry: Duration,
    super_token_expiry: Duration,
}

impl JwtManager {
    /// Create a new JWT manager
    pub fn new(secret: &str, token_expiry_hours: i64, super_token_expiry_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expiry: Duration::hours(token_expiry_hours),
            super_token_expiry: Duration::minutes(super_token_expiry_minutes),
        }
    }

    /// Generate a signed token for `user_id`
    pub fn emit_token(&self, user_id: UserId, super_token: bool) -> Result<String, JwtError> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp(),
            exp: (now + self.token_expiry).unix_timestamp(),
            ste: super_token.then(|| (now + self.super_token_expiry).unix_timestamp()),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::Encoding(e.to_string()))
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 60; // 60 second clock skew tolerance

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidToken => JwtError::Invalid,
                jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => JwtError::Invalid,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::Invalid,
                _ => JwtError::Validation(e.to_string()),
            })
    }
}

impl TokenIssuer for JwtManager {
    fn issue(&self, user_id: UserId, super_token: bool) -> Result<String, JwtError> {
        self.emit_token(user_id, super_token)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
    #[error("Token encoding failed: {0}")]
    Encoding(String),
    #[error("Token validation failed: {0}")]
    Validation(String),
}
