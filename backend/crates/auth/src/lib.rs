//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Email + password login issuing a JWT access/refresh pair
//! - One server-side session per identity, rotated on login and refresh
//! - Idempotent logout
//! - Role hierarchy (User < Admin < SuperUser) gating admin routes
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant)
//! - HS256 tokens with zero expiry leeway
//! - Refresh requires the stored access/refresh pair, so sessions are revocable

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::bootstrap::{SuperuserSeed, ensure_superuser};
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::{memory::InMemoryAuthRepository, postgres::PgAuthRepository};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
