//! Application Layer
//!
//! Use cases and application services.

pub mod authenticator;
pub mod bootstrap;
pub mod config;
pub mod credentials;
pub mod profile;
pub mod register;
pub mod session_manager;
pub mod token_codec;
pub mod update_identity;

// Re-exports
pub use authenticator::RequestAuthenticator;
pub use bootstrap::{SuperuserSeed, ensure_superuser};
pub use config::AuthConfig;
pub use credentials::CredentialVerifier;
pub use profile::{ProfileOutput, ProfileUseCase};
pub use register::{RegisterInput, RegisterUseCase};
pub use session_manager::{RevocationOutcome, SessionManager, TokenPair};
pub use token_codec::{AccessClaims, RefreshClaims, TokenCodec, TokenError};
pub use update_identity::{IdentityChanges, UpdateIdentityUseCase};
