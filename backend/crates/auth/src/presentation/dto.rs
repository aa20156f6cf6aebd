//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::application::{ProfileOutput, TokenPair};
use crate::domain::entity::identity::Identity;
use crate::domain::value_object::user_role::UserRole;

// ============================================================================
// Tokens
// ============================================================================

/// Login request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token pair response (login and refresh)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<TokenPair> for TokenPairResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }
    }
}

// ============================================================================
// Users
// ============================================================================

/// Registration request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub full_name: String,
    pub password: String,
}

/// Admin creation request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForceCreateRequest {
    pub email: String,
    pub full_name: String,
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
}

/// Admin update request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIdentityRequest {
    pub full_name: Option<String>,
    pub password: Option<String>,
    pub is_banned: Option<bool>,
}

/// Identity response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityResponse {
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub is_banned: bool,
    pub is_privileged: bool,
    /// Unix seconds
    pub last_login_at: Option<i64>,
}

impl From<Identity> for IdentityResponse {
    fn from(identity: Identity) -> Self {
        Self {
            email: identity.email.as_str().to_string(),
            full_name: identity.full_name,
            role: identity.role,
            is_banned: identity.is_banned,
            is_privileged: identity.is_privileged,
            last_login_at: identity.last_login_at.map(|t| t.timestamp()),
        }
    }
}

/// Profile of the authenticated caller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub email: String,
    pub full_name: String,
}

impl From<ProfileOutput> for ProfileResponse {
    fn from(output: ProfileOutput) -> Self {
        Self {
            email: output.email,
            full_name: output.full_name,
        }
    }
}
