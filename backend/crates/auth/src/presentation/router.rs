//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::{IdentityRepository, SessionRepository};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AuthMiddlewareState, require_access_token, require_admin};

/// Create the Auth router for any repository implementation
///
/// Routes are relative; the binary nests them under `/api/v1`.
pub fn auth_router<R>(repo: R, config: AuthConfig) -> Router
where
    R: IdentityRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let config = Arc::new(config);
    let guard = AuthMiddlewareState::new(config.clone());
    let state = AuthAppState {
        repo: Arc::new(repo),
        config,
    };

    let authenticated = middleware::from_fn_with_state(guard.clone(), require_access_token);
    let admin = middleware::from_fn_with_state(guard, require_admin);

    Router::new()
        .route("/login", post(handlers::login::<R>))
        .route("/refresh", post(handlers::refresh::<R>))
        .route("/revoke", post(handlers::revoke::<R>))
        .route(
            "/users",
            post(handlers::register::<R>)
                .merge(get(handlers::profile::<R>).route_layer(authenticated)),
        )
        .route(
            "/users/force",
            post(handlers::force_create::<R>).route_layer(admin.clone()),
        )
        .route(
            "/users/{email}",
            patch(handlers::update_identity::<R>).route_layer(admin),
        )
        .with_state(state)
}
