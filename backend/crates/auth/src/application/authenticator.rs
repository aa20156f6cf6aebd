//! Request Authenticator
//!
//! Turns the access token of an inbound request into verified claims and
//! gates elevated operations by role.

use crate::application::token_codec::{AccessClaims, TokenCodec};
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};

#[derive(Clone)]
pub struct RequestAuthenticator {
    codec: TokenCodec,
}

impl RequestAuthenticator {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            codec: TokenCodec::new(secret),
        }
    }

    /// Every failure (absent, malformed, bad signature, expired) is `Unauthorized`
    pub fn authenticate_request(&self, access_token: Option<&str>) -> AuthResult<AccessClaims> {
        let token = access_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::Unauthorized)?;

        self.codec.decode_access(token).map_err(|e| {
            tracing::debug!(error = %e, "Access token rejected");
            AuthError::Unauthorized
        })
    }

    /// Rejects callers ranked strictly below `minimum`
    pub fn require_role(claims: &AccessClaims, minimum: UserRole) -> AuthResult<()> {
        if claims.role.is_descendant_of(minimum) {
            tracing::debug!(sub = %claims.sub, role = %claims.role, "Role check failed");
            return Err(AuthError::AccessDenied);
        }
        Ok(())
    }
}
