//! Bootstrap
//!
//! Seeds the privileged account on startup.

use crate::application::config::AuthConfig;
use crate::domain::entity::identity::Identity;
use crate::domain::repository::IdentityRepository;
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
    user_role::UserRole,
};
use crate::error::AuthResult;

/// Credentials for the initial SUPERUSER
pub struct SuperuserSeed {
    pub email: String,
    pub password: String,
}

/// Create the SUPERUSER from `seed` unless a privileged identity exists
///
/// Returns whether an identity was created. An existing identity under the
/// seed email is left untouched.
pub async fn ensure_superuser<I>(
    identity_repo: &I,
    config: &AuthConfig,
    seed: SuperuserSeed,
) -> AuthResult<bool>
where
    I: IdentityRepository,
{
    if let Some(existing) = identity_repo.find_privileged().await? {
        tracing::debug!(email = %existing.email, "Privileged identity present");
        return Ok(false);
    }

    let email = Email::new(seed.email)?;
    if let Some(existing) = identity_repo.find_by_email(&email).await? {
        tracing::warn!(
            email = %existing.email,
            role = %existing.role,
            "Superuser seed email belongs to an unprivileged identity, skipping seed"
        );
        return Ok(false);
    }

    let raw_password = RawPassword::new(seed.password)?;
    let password_hash = UserPassword::from_raw(&raw_password, config.pepper())?;

    let identity = Identity::new(email, "Superuser".to_string(), UserRole::SuperUser, password_hash);
    identity_repo.insert(&identity).await?;

    tracing::info!(email = %identity.email, "Superuser created");

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::application::session_manager::SessionManager;
    use crate::infra::memory::InMemoryAuthRepository;

    fn seed() -> SuperuserSeed {
        SuperuserSeed {
            email: "root@x.com".to_string(),
            password: "Superuser#Pass1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_ensure_superuser_is_idempotent() {
        let repo = InMemoryAuthRepository::new();
        let config = AuthConfig::with_random_secret();

        assert!(ensure_superuser(&repo, &config, seed()).await.unwrap());
        assert!(!ensure_superuser(&repo, &config, seed()).await.unwrap());

        let root = repo.find_privileged().await.unwrap().unwrap();
        assert_eq!(root.email.as_str(), "root@x.com");
        assert_eq!(root.role, UserRole::SuperUser);
        assert!(root.is_privileged);
    }

    #[tokio::test]
    async fn test_seeded_superuser_can_login() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let config = Arc::new(AuthConfig::with_random_secret());
        ensure_superuser(repo.as_ref(), &config, seed()).await.unwrap();

        let manager = SessionManager::new(repo.clone(), repo, config);
        assert!(manager.login("root@x.com", "Superuser#Pass1".to_string()).await.is_ok());
    }

    #[tokio::test]
    async fn test_seed_email_taken_by_plain_user() {
        let repo = InMemoryAuthRepository::new();
        let config = AuthConfig::with_random_secret();
        let raw = RawPassword::new("Correct#Horse42".to_string()).unwrap();
        let user = Identity::new(
            Email::new("root@x.com").unwrap(),
            "Plain".to_string(),
            UserRole::User,
            UserPassword::from_raw(&raw, None).unwrap(),
        );
        repo.insert(&user).await.unwrap();

        assert!(!ensure_superuser(&repo, &config, seed()).await.unwrap());

        assert!(repo.find_privileged().await.unwrap().is_none());
        let stored = repo.find_by_email(&user.email).await.unwrap().unwrap();
        assert_eq!(stored.role, UserRole::User);
        assert_eq!(stored.full_name, "Plain");
    }
}
