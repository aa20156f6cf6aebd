//! Token Codec
//!
//! Signed, expiring JWTs (HS256) for access and refresh tokens.
//! Signature and expiry are checked on decode; the session store is never
//! consulted here.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entity::identity::Identity;
use crate::domain::value_object::user_role::UserRole;
use crate::error::AuthError;

/// Token codec errors
#[derive(Debug, Error)]
pub enum TokenError {
    /// Bad signature, malformed structure or past expiry
    #[error("Token signature is invalid or the token has expired")]
    InvalidSignatureOrExpired(#[source] jsonwebtoken::errors::Error),

    #[error("Token encoding failed: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidSignatureOrExpired(_) => AuthError::Unauthorized,
            TokenError::Encoding(e) => AuthError::Internal(e.to_string()),
        }
    }
}

/// Access token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Identity key
    pub sub: String,
    pub role: UserRole,
    /// Expiry (Unix seconds)
    pub exp: i64,
    /// Unique per issuance
    pub jti: String,
}

/// Refresh token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    /// Identity creation instant (Unix seconds)
    pub crt: i64,
    pub exp: i64,
    pub jti: String,
}

/// Encodes and decodes tokens with the process-wide secret
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn issue_access_token(&self, identity: &Identity, ttl: Duration) -> Result<String, TokenError> {
        let claims = AccessClaims {
            sub: identity.email.as_str().to_string(),
            role: identity.role,
            exp: (Utc::now() + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        self.encode(&claims)
    }

    pub fn issue_refresh_token(&self, identity: &Identity, ttl: Duration) -> Result<String, TokenError> {
        let claims = RefreshClaims {
            sub: identity.email.as_str().to_string(),
            crt: identity.created_at.timestamp(),
            exp: (Utc::now() + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        self.encode(&claims)
    }

    pub fn decode_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.decode(token)
    }

    pub fn decode_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        self.decode(token)
    }

    fn encode<C: Serialize>(&self, claims: &C) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(TokenError::Encoding)
    }

    fn decode<C: DeserializeOwned>(&self, token: &str) -> Result<C, TokenError> {
        jsonwebtoken::decode::<C>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::InvalidSignatureOrExpired)
    }
}
