//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request-level errors are
//! `auth::AuthError` rendered through `kernel::error::AppError`.

use anyhow::Context;
use auth::{AuthConfig, PgAuthRepository, SuperuserSeed, auth_router, ensure_superuser};
use axum::{
    Router,
    http::{self, Method, header},
    routing::get,
};
use platform::crypto::decode_secret;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let config = load_auth_config()?;
    let repo = PgAuthRepository::new(pool);

    // Seed the privileged account
    if let (Ok(email), Ok(password)) = (env::var("SUPERUSER_EMAIL"), env::var("SUPERUSER_PASS")) {
        let created = ensure_superuser(&repo, &config, SuperuserSeed { email, password }).await?;
        tracing::info!(created, "Superuser check completed");
    } else {
        tracing::warn!("SUPERUSER_EMAIL / SUPERUSER_PASS not set, skipping superuser seed");
    }

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .route("/healthcheck", get(healthcheck))
        .nest("/api/v1", auth_router(repo, config))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()
        .context("BIND_ADDR must be a socket address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn healthcheck() -> &'static str {
    "OK"
}

/// Auth configuration from the environment
///
/// `SECRET_KEY` is required in release builds; debug builds fall back to a
/// random secret, which invalidates all tokens on restart.
fn load_auth_config() -> anyhow::Result<AuthConfig> {
    let mut config = match env::var("SECRET_KEY") {
        Ok(encoded) => AuthConfig::new(decode_secret(&encoded).context("SECRET_KEY is invalid")?),
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("SECRET_KEY not set, using a random secret");
            AuthConfig::development()
        }
        Err(_) => anyhow::bail!("SECRET_KEY must be set in production"),
    };

    if let Ok(minutes) = env::var("ACCESS_TOKEN_EXPIRE_MINUTES") {
        config = config
            .with_access_token_ttl_minutes(
                minutes
                    .parse()
                    .context("ACCESS_TOKEN_EXPIRE_MINUTES must be an integer")?,
            )
            .context("ACCESS_TOKEN_EXPIRE_MINUTES is out of range")?;
    }

    if let Ok(days) = env::var("REFRESH_TOKEN_EXPIRE_DAYS") {
        config = config
            .with_refresh_token_ttl_days(
                days.parse()
                    .context("REFRESH_TOKEN_EXPIRE_DAYS must be an integer")?,
            )
            .context("REFRESH_TOKEN_EXPIRE_DAYS is out of range")?;
    }

    config.password_pepper = env::var("PASSWORD_PEPPER").ok().map(String::into_bytes);

    Ok(config)
}
