//! Profile Use Case

use std::sync::Arc;

use crate::domain::repository::IdentityRepository;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Profile output
pub struct ProfileOutput {
    pub email: String,
    pub full_name: String,
}

pub struct ProfileUseCase<I>
where
    I: IdentityRepository,
{
    identity_repo: Arc<I>,
}

impl<I> ProfileUseCase<I>
where
    I: IdentityRepository,
{
    pub fn new(identity_repo: Arc<I>) -> Self {
        Self { identity_repo }
    }

    /// `email` comes from verified claims; the record may have vanished since issuance
    pub async fn execute(&self, email: &str) -> AuthResult<ProfileOutput> {
        let identity = self
            .identity_repo
            .find_by_email(&Email::from_db(email))
            .await?
            .ok_or(AuthError::NotFound)?;

        Ok(ProfileOutput {
            email: identity.email.as_str().to_string(),
            full_name: identity.full_name,
        })
    }
}
