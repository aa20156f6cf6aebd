//! Credential Verifier
//!
//! Checks an email/password pair against the stored identity. Read-only.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::identity::Identity;
use crate::domain::repository::IdentityRepository;
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

pub struct CredentialVerifier<I>
where
    I: IdentityRepository,
{
    identity_repo: Arc<I>,
    config: Arc<AuthConfig>,
}

impl<I> CredentialVerifier<I>
where
    I: IdentityRepository,
{
    pub fn new(identity_repo: Arc<I>, config: Arc<AuthConfig>) -> Self {
        Self {
            identity_repo,
            config,
        }
    }

    /// The identity, if it exists and the password verifies
    ///
    /// A malformed email is treated like an unknown one.
    pub async fn authenticate(&self, email: &str, password: String) -> AuthResult<Option<Identity>> {
        let Ok(email) = Email::new(email) else {
            return Ok(None);
        };

        let Some(identity) = self.identity_repo.find_by_email(&email).await? else {
            return Ok(None);
        };

        let raw_password = RawPassword::for_verification(password);
        if !identity
            .password_hash
            .verify(&raw_password, self.config.pepper())
        {
            return Ok(None);
        }

        Ok(Some(identity))
    }

    /// Must follow a successful [`authenticate`](Self::authenticate)
    pub fn check_not_banned(identity: &Identity) -> AuthResult<()> {
        if identity.is_banned {
            return Err(AuthError::AccountBanned);
        }
        Ok(())
    }
}
