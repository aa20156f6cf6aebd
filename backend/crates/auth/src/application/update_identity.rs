//! Update Identity Use Case
//!
//! Admin edits of another identity: display name, password, ban flag.

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

/// Requested changes; `None` leaves the field as is
#[derive(Default)]
pub struct IdentityChanges {
    pub full_name: Option<String>,
    pub password: Option<String>,
    pub banned: Option<bool>,
}

pub struct UpdateIdentityUseCase<I>
where
    I: IdentityRepository,
{
    identity_repo: Arc<I>,
    config: Arc<AuthConfig>,
}

impl<I> UpdateIdentityUseCase<I>
where
    I: IdentityRepository,
{
    pub fn new(identity_repo: Arc<I>, config: Arc<AuthConfig>) -> Self {
        Self {
            identity_repo,
            config,
        }
    }

    /// The target must rank strictly below the caller
    pub async fn execute(
        &self,
        caller_role: UserRole,
        email: &str,
        changes: IdentityChanges,
    ) -> AuthResult<Identity> {
        let email = Email::new(email).map_err(|_| AuthError::NotFound)?;
        let mut identity = self
            .identity_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::NotFound)?;

        if !identity.role.is_descendant_of(caller_role) {
            tracing::warn!(
                email = %identity.email,
                %caller_role,
                "Update rejected: insufficient privileges"
            );
            return Err(AuthError::InsufficientPrivileges);
        }

        if let Some(full_name) = changes.full_name {
            let full_name = full_name.trim().to_string();
            if full_name.is_empty() {
                return Err(AuthError::InvalidInput("Full name cannot be empty".to_string()));
            }
            identity.set_full_name(full_name);
        }

        if let Some(password) = changes.password {
            let raw_password = RawPassword::new(password)?;
            identity.set_password(UserPassword::from_raw(&raw_password, self.config.pepper())?);
        }

        if let Some(banned) = changes.banned {
            identity.set_banned(banned);
        }

        self.identity_repo.update(&identity).await?;

        tracing::info!(email = %identity.email, banned = identity.is_banned, "Identity updated");

        Ok(identity)
    }
}
