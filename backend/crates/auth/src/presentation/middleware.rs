//! Auth Middleware
//!
//! Middleware for requiring authentication on protected routes. Verified
//! [`AccessClaims`] are stored in request extensions for the handlers.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

use platform::cookie::extract_cookie;

use crate::application::config::AuthConfig;
use crate::application::{AccessClaims, RequestAuthenticator};
use crate::domain::value_object::user_role::UserRole;
use crate::error::AuthResult;

/// Middleware state
#[derive(Clone)]
pub struct AuthMiddlewareState {
    pub authenticator: RequestAuthenticator,
    pub config: Arc<AuthConfig>,
}

impl AuthMiddlewareState {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        Self {
            authenticator: RequestAuthenticator::new(&config.secret_key),
            config,
        }
    }

    fn authenticate(&self, headers: &HeaderMap) -> AuthResult<AccessClaims> {
        let token = extract_cookie(headers, &self.config.access_cookie_name)
            .or_else(|| extract_bearer(headers));
        self.authenticator.authenticate_request(token.as_deref())
    }
}

/// Middleware that requires a valid access token
pub async fn require_access_token(
    State(state): State<AuthMiddlewareState>,
    mut req: Request,
    next: Next,
) -> AuthResult<Response> {
    let claims = state.authenticate(req.headers())?;
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Middleware that requires a valid access token of an ADMIN or above
pub async fn require_admin(
    State(state): State<AuthMiddlewareState>,
    mut req: Request,
    next: Next,
) -> AuthResult<Response> {
    let claims = state.authenticate(req.headers())?;
    RequestAuthenticator::require_role(&claims, UserRole::Admin)?;
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer a.b.c"));
        assert_eq!(extract_bearer(&headers), Some("a.b.c".to_string()));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert_eq!(extract_bearer(&headers), None);
    }
}
