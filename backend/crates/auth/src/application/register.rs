//! Register Use Case
//!
//! Creates a new identity, either self-service (always USER) or by an admin
//! with an explicit role.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::identity::Identity;
use crate::domain::repository::IdentityRepository;
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub email: String,
    pub full_name: String,
    pub password: String,
}

/// Register use case
pub struct RegisterUseCase<I>
where
    I: IdentityRepository,
{
    identity_repo: Arc<I>,
    config: Arc<AuthConfig>,
}

impl<I> RegisterUseCase<I>
where
    I: IdentityRepository,
{
    pub fn new(identity_repo: Arc<I>, config: Arc<AuthConfig>) -> Self {
        Self {
            identity_repo,
            config,
        }
    }

    /// Self-service registration
    pub async fn execute(&self, input: RegisterInput) -> AuthResult<Identity> {
        self.create(input, UserRole::User).await
    }

    /// Admin creation with an explicit role
    ///
    /// The new role must rank strictly below the caller's.
    pub async fn force_create(
        &self,
        caller_role: UserRole,
        input: RegisterInput,
        role: UserRole,
    ) -> AuthResult<Identity> {
        if !role.is_descendant_of(caller_role) {
            tracing::warn!(%caller_role, %role, "Force create rejected: insufficient privileges");
            return Err(AuthError::InsufficientPrivileges);
        }
        self.create(input, role).await
    }

    async fn create(&self, input: RegisterInput, role: UserRole) -> AuthResult<Identity> {
        let email = Email::new(input.email)?;

        if self.identity_repo.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let full_name = input.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(AuthError::InvalidInput("Full name cannot be empty".to_string()));
        }

        let raw_password = RawPassword::new(input.password)?;
        let password_hash = UserPassword::from_raw(&raw_password, self.config.pepper())?;

        let identity = Identity::new(email, full_name, role, password_hash);
        self.identity_repo.insert(&identity).await?;

        tracing::info!(email = %identity.email, role = %identity.role, "Identity registered");

        Ok(identity)
    }
}
