//! HTTP Handlers

use axum::extract::{Extension, Path, State};
use axum::http::{HeaderMap, header};
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use std::sync::Arc;

use platform::cookie::extract_cookie;

use crate::application::config::AuthConfig;
use crate::application::{
    AccessClaims, IdentityChanges, ProfileUseCase, RegisterInput, RegisterUseCase, SessionManager,
    TokenPair, UpdateIdentityUseCase,
};
use crate::domain::repository::{IdentityRepository, SessionRepository};
use crate::error::AuthResult;
use crate::presentation::dto::{
    ForceCreateRequest, IdentityResponse, LoginRequest, ProfileResponse, RegisterRequest,
    TokenPairResponse, UpdateIdentityRequest,
};

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: IdentityRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

impl<R> AuthAppState<R>
where
    R: IdentityRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    fn session_manager(&self) -> SessionManager<R, R> {
        SessionManager::new(self.repo.clone(), self.repo.clone(), self.config.clone())
    }
}

// ============================================================================
// Tokens
// ============================================================================

/// POST /login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: IdentityRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let pair = state.session_manager().login(&req.email, req.password).await?;

    Ok(token_response(&state.config, pair))
}

/// POST /refresh
pub async fn refresh<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: IdentityRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let (access_token, refresh_token) = extract_token_cookies(&state.config, &headers);

    let pair = state
        .session_manager()
        .refresh(access_token.as_deref(), refresh_token.as_deref())
        .await?;

    Ok(token_response(&state.config, pair))
}

/// POST /revoke
pub async fn revoke<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: IdentityRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let (access_token, refresh_token) = extract_token_cookies(&state.config, &headers);

    let outcome = state
        .session_manager()
        .revoke(access_token.as_deref(), refresh_token.as_deref())
        .await?;

    Ok((
        AppendHeaders([
            (header::SET_COOKIE, state.config.access_cookie().build_delete_cookie()),
            (header::SET_COOKIE, state.config.refresh_cookie().build_delete_cookie()),
        ]),
        Json(outcome.to_string()),
    ))
}

// ============================================================================
// Users
// ============================================================================

/// POST /users
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<Json<IdentityResponse>>
where
    R: IdentityRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(state.repo.clone(), state.config.clone());

    let identity = use_case
        .execute(RegisterInput {
            email: req.email,
            full_name: req.full_name,
            password: req.password,
        })
        .await?;

    Ok(Json(identity.into()))
}

/// POST /users/force (admin)
pub async fn force_create<R>(
    State(state): State<AuthAppState<R>>,
    Extension(claims): Extension<AccessClaims>,
    Json(req): Json<ForceCreateRequest>,
) -> AuthResult<Json<IdentityResponse>>
where
    R: IdentityRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(state.repo.clone(), state.config.clone());

    let input = RegisterInput {
        email: req.email,
        full_name: req.full_name,
        password: req.password,
    };
    let identity = use_case.force_create(claims.role, input, req.role).await?;

    Ok(Json(identity.into()))
}

/// GET /users (authenticated)
pub async fn profile<R>(
    State(state): State<AuthAppState<R>>,
    Extension(claims): Extension<AccessClaims>,
) -> AuthResult<Json<ProfileResponse>>
where
    R: IdentityRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let use_case = ProfileUseCase::new(state.repo.clone());
    let output = use_case.execute(&claims.sub).await?;

    Ok(Json(output.into()))
}

/// PATCH /users/{email} (admin)
pub async fn update_identity<R>(
    State(state): State<AuthAppState<R>>,
    Extension(claims): Extension<AccessClaims>,
    Path(email): Path<String>,
    Json(req): Json<UpdateIdentityRequest>,
) -> AuthResult<Json<IdentityResponse>>
where
    R: IdentityRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let use_case = UpdateIdentityUseCase::new(state.repo.clone(), state.config.clone());

    let changes = IdentityChanges {
        full_name: req.full_name,
        password: req.password,
        banned: req.is_banned,
    };
    let identity = use_case.execute(claims.role, &email, changes).await?;

    Ok(Json(identity.into()))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn extract_token_cookies(config: &AuthConfig, headers: &HeaderMap) -> (Option<String>, Option<String>) {
    (
        extract_cookie(headers, &config.access_cookie_name),
        extract_cookie(headers, &config.refresh_cookie_name),
    )
}

/// Body and cookies carrying a freshly issued pair
fn token_response(config: &AuthConfig, pair: TokenPair) -> impl IntoResponse + use<> {
    let cookies = AppendHeaders([
        (
            header::SET_COOKIE,
            config.access_cookie().build_set_cookie(&pair.access_token),
        ),
        (
            header::SET_COOKIE,
            config.refresh_cookie().build_set_cookie(&pair.refresh_token),
        ),
    ]);

    (cookies, Json(TokenPairResponse::from(pair)))
}
