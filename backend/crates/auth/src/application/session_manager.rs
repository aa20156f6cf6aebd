//! Session Manager
//!
//! Login, refresh and revocation over the single session record of an
//! identity:
//!
//! - `NoSession -> ActiveSession` on login
//! - `ActiveSession -> ActiveSession` on login or refresh (token pair replaced in place)
//! - `ActiveSession -> NoSession` on revoke
//!
//! Expiry is not tracked here. The presented access token is only a lookup
//! key during refresh and revoke; its signature and expiry are checked by the
//! request authenticator alone.

use std::sync::Arc;

use chrono::Utc;
use derive_more::Display;

use crate::application::config::AuthConfig;
use crate::application::credentials::CredentialVerifier;
use crate::application::token_codec::TokenCodec;
use crate::domain::entity::{identity::Identity, session::SessionRecord};
use crate::domain::repository::{IdentityRepository, SessionRepository};
use crate::error::{AuthError, AuthResult};

/// Freshly issued access and refresh tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Result of a logout; both outcomes are reported to the caller as success
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RevocationOutcome {
    /// The session record was deleted
    #[display("Logout Successfully")]
    Revoked,
    /// Nothing matched the presented tokens
    #[display("Logout Successfully")]
    NoActiveSession,
}

pub struct SessionManager<I, S>
where
    I: IdentityRepository,
    S: SessionRepository,
{
    identity_repo: Arc<I>,
    session_repo: Arc<S>,
    verifier: CredentialVerifier<I>,
    codec: TokenCodec,
    config: Arc<AuthConfig>,
}

impl<I, S> SessionManager<I, S>
where
    I: IdentityRepository,
    S: SessionRepository,
{
    pub fn new(identity_repo: Arc<I>, session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            verifier: CredentialVerifier::new(identity_repo.clone(), config.clone()),
            codec: TokenCodec::new(&config.secret_key),
            identity_repo,
            session_repo,
            config,
        }
    }

    pub async fn login(&self, email: &str, password: String) -> AuthResult<TokenPair> {
        let Some(identity) = self.verifier.authenticate(email, password).await? else {
            tracing::warn!("Login rejected: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        };

        if let Err(e) = CredentialVerifier::<I>::check_not_banned(&identity) {
            tracing::warn!(email = %identity.email, "Login rejected: account banned");
            return Err(e);
        }

        let rotated = self
            .session_repo
            .find_by_identity(&identity.email)
            .await?
            .is_some();

        self.identity_repo
            .record_login(&identity.email, Utc::now())
            .await?;

        let pair = self.rotate(&identity).await?;

        tracing::info!(email = %identity.email, rotated, "User logged in");

        Ok(pair)
    }

    pub async fn refresh(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> AuthResult<TokenPair> {
        let (Some(access_token), Some(refresh_token)) =
            (non_empty(access_token), non_empty(refresh_token))
        else {
            return Err(AuthError::InvalidRefreshToken);
        };

        let record = self
            .session_repo
            .find_by_access_token(access_token)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        if !record.matches_refresh(refresh_token) {
            tracing::warn!(email = %record.email, "Refresh rejected: refresh token mismatch");
            return Err(AuthError::InvalidRefreshToken);
        }

        let identity = self
            .identity_repo
            .find_by_email(&record.email)
            .await?
            .ok_or(AuthError::NotFound)?;

        let pair = self.rotate(&identity).await?;

        tracing::info!(email = %identity.email, "Session refreshed");

        Ok(pair)
    }

    /// Never fails on bad input or a failed lookup; only a delete that misses a
    /// just-found session surfaces as an error
    pub async fn revoke(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> AuthResult<RevocationOutcome> {
        let (Some(access_token), Some(refresh_token)) =
            (non_empty(access_token), non_empty(refresh_token))
        else {
            return Ok(RevocationOutcome::NoActiveSession);
        };

        let record = match self.session_repo.find_by_access_token(access_token).await {
            Ok(Some(record)) => record,
            Ok(None) => return Ok(RevocationOutcome::NoActiveSession),
            Err(e) => {
                tracing::warn!(error = %e, "Revoke lookup failed, reporting logout");
                return Ok(RevocationOutcome::NoActiveSession);
            }
        };

        if !record.matches_refresh(refresh_token) {
            tracing::debug!(email = %record.email, "Revoke ignored: refresh token mismatch");
            return Ok(RevocationOutcome::NoActiveSession);
        }

        self.session_repo
            .delete_by_identity(&record.email)
            .await?
            .ok_or(AuthError::RevocationInconsistency)?;

        tracing::info!(email = %record.email, "Session revoked");

        Ok(RevocationOutcome::Revoked)
    }

    /// Issue a new pair and store it as the identity's only session
    async fn rotate(&self, identity: &Identity) -> AuthResult<TokenPair> {
        let access_token = self
            .codec
            .issue_access_token(identity, ttl(self.config.access_token_ttl)?)?;
        let refresh_token = self
            .codec
            .issue_refresh_token(identity, ttl(self.config.refresh_token_ttl)?)?;

        let record = SessionRecord::new(
            identity.email.clone(),
            access_token.clone(),
            refresh_token.clone(),
        );
        self.session_repo.put(&record).await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}

fn non_empty(token: Option<&str>) -> Option<&str> {
    token.filter(|t| !t.is_empty())
}

fn ttl(duration: std::time::Duration) -> AuthResult<chrono::Duration> {
    chrono::Duration::from_std(duration).map_err(|e| AuthError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{
        email::Email,
        user_password::{RawPassword, UserPassword},
        user_role::UserRole,
    };
    use crate::error::SOMETHING_WENT_WRONG;
    use crate::infra::memory::InMemoryAuthRepository;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use chrono::DateTime;

    const PASSWORD: &str = "Correct#Horse42";

    async fn setup() -> (
        SessionManager<InMemoryAuthRepository, InMemoryAuthRepository>,
        Arc<InMemoryAuthRepository>,
        Arc<AuthConfig>,
    ) {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let config = Arc::new(AuthConfig::with_random_secret());
        let manager = SessionManager::new(repo.clone(), repo.clone(), config.clone());
        (manager, repo, config)
    }

    async fn seed(repo: &InMemoryAuthRepository, email: &str, banned: bool) -> Identity {
        let raw = RawPassword::new(PASSWORD.to_string()).unwrap();
        let mut identity = Identity::new(
            Email::new(email).unwrap(),
            "Test".to_string(),
            UserRole::User,
            UserPassword::from_raw(&raw, None).unwrap(),
        );
        identity.set_banned(banned);
        repo.insert(&identity).await.unwrap();
        identity
    }

    #[tokio::test]
    async fn test_login_issues_pair_and_stores_session() {
        let (manager, repo, _) = setup().await;
        let identity = seed(&repo, "a@x.com", false).await;

        let pair = manager.login("a@x.com", PASSWORD.to_string()).await.unwrap();

        let record = repo.find_by_identity(&identity.email).await.unwrap().unwrap();
        assert_eq!(record.access_token, pair.access_token);
        assert_eq!(record.refresh_token, pair.refresh_token);

        let stored = repo.find_by_email(&identity.email).await.unwrap().unwrap();
        assert!(stored.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_login_is_case_insensitive_on_email() {
        let (manager, repo, _) = setup().await;
        seed(&repo, "a@x.com", false).await;

        assert!(manager.login("A@X.com", PASSWORD.to_string()).await.is_ok());
    }

    #[tokio::test]
    async fn test_login_twice_keeps_one_session() {
        let (manager, repo, _) = setup().await;
        seed(&repo, "a@x.com", false).await;

        let first = manager.login("a@x.com", PASSWORD.to_string()).await.unwrap();
        let second = manager.login("a@x.com", PASSWORD.to_string()).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(repo.session_count().await, 1);
        assert!(repo.find_by_access_token(&first.access_token).await.unwrap().is_none());
        assert!(repo.find_by_access_token(&second.access_token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_login_invalid_credentials() {
        let (manager, repo, _) = setup().await;
        seed(&repo, "a@x.com", false).await;

        let err = manager.login("a@x.com", "Wrong#Horse42".to_string()).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let err = manager.login("nobody@x.com", PASSWORD.to_string()).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let err = manager.login("not-an-email", PASSWORD.to_string()).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        assert_eq!(repo.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_login_banned_with_correct_password() {
        let (manager, repo, _) = setup().await;
        seed(&repo, "banned@x.com", true).await;

        let err = manager.login("banned@x.com", PASSWORD.to_string()).await.unwrap_err();
        assert!(matches!(err, AuthError::AccountBanned));
        assert_eq!(repo.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_refresh_rotates_pair() {
        let (manager, repo, _) = setup().await;
        seed(&repo, "a@x.com", false).await;
        let p1 = manager.login("a@x.com", PASSWORD.to_string()).await.unwrap();

        let p2 = manager
            .refresh(Some(&p1.access_token), Some(&p1.refresh_token))
            .await
            .unwrap();

        assert_ne!(p1.access_token, p2.access_token);
        assert_ne!(p1.refresh_token, p2.refresh_token);
        assert_eq!(repo.session_count().await, 1);

        // The old pair is no longer a lookup key
        let err = manager
            .refresh(Some(&p1.access_token), Some(&p1.refresh_token))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidRefreshToken));
    }

    #[tokio::test]
    async fn test_refresh_rejects_mismatched_refresh_token() {
        let (manager, repo, _) = setup().await;
        seed(&repo, "a@x.com", false).await;
        let pair = manager.login("a@x.com", PASSWORD.to_string()).await.unwrap();

        let err = manager
            .refresh(Some(&pair.access_token), Some("forged"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidRefreshToken));

        // Session untouched
        let record = repo.find_by_access_token(&pair.access_token).await.unwrap();
        assert!(record.is_some());
    }

    #[tokio::test]
    async fn test_refresh_missing_or_empty_input() {
        let (manager, _, _) = setup().await;

        for (access, refresh) in [
            (None, None),
            (Some("a"), None),
            (None, Some("r")),
            (Some(""), Some("r")),
            (Some("a"), Some("")),
        ] {
            let err = manager.refresh(access, refresh).await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidRefreshToken));
        }
    }

    #[tokio::test]
    async fn test_refresh_does_not_check_access_token_expiry() {
        let (_, repo, config) = setup().await;
        let identity = seed(&repo, "a@x.com", false).await;

        let codec = TokenCodec::new(&config.secret_key);
        let stale = codec
            .issue_access_token(&identity, chrono::Duration::seconds(-60))
            .unwrap();
        repo.put(&SessionRecord::new(
            identity.email.clone(),
            stale.clone(),
            "refresh".to_string(),
        ))
        .await
        .unwrap();

        let manager = SessionManager::new(repo.clone(), repo.clone(), config);
        assert!(manager.refresh(Some(&stale), Some("refresh")).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_identity_removed() {
        let (manager, repo, _) = setup().await;
        repo.put(&SessionRecord::new(
            Email::from_db("gone@x.com"),
            "access".to_string(),
            "refresh".to_string(),
        ))
        .await
        .unwrap();

        let err = manager.refresh(Some("access"), Some("refresh")).await.unwrap_err();
        assert!(matches!(err, AuthError::NotFound));
    }

    #[tokio::test]
    async fn test_revoke_deletes_session() {
        let (manager, repo, _) = setup().await;
        seed(&repo, "a@x.com", false).await;
        let pair = manager.login("a@x.com", PASSWORD.to_string()).await.unwrap();

        let outcome = manager
            .revoke(Some(&pair.access_token), Some(&pair.refresh_token))
            .await
            .unwrap();
        assert_eq!(outcome, RevocationOutcome::Revoked);
        assert_eq!(outcome.to_string(), "Logout Successfully");
        assert_eq!(repo.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let (manager, repo, _) = setup().await;
        seed(&repo, "a@x.com", false).await;
        let pair = manager.login("a@x.com", PASSWORD.to_string()).await.unwrap();

        manager
            .revoke(Some(&pair.access_token), Some(&pair.refresh_token))
            .await
            .unwrap();
        let again = manager
            .revoke(Some(&pair.access_token), Some(&pair.refresh_token))
            .await
            .unwrap();
        assert_eq!(again, RevocationOutcome::NoActiveSession);
        assert_eq!(again.to_string(), "Logout Successfully");

        assert_eq!(
            manager.revoke(None, None).await.unwrap(),
            RevocationOutcome::NoActiveSession
        );
        assert_eq!(
            manager.revoke(Some("junk"), Some("junk")).await.unwrap(),
            RevocationOutcome::NoActiveSession
        );
    }

    #[tokio::test]
    async fn test_revoke_with_wrong_refresh_keeps_session() {
        let (manager, repo, _) = setup().await;
        seed(&repo, "a@x.com", false).await;
        let pair = manager.login("a@x.com", PASSWORD.to_string()).await.unwrap();

        let outcome = manager
            .revoke(Some(&pair.access_token), Some("forged"))
            .await
            .unwrap();
        assert_eq!(outcome, RevocationOutcome::NoActiveSession);
        assert_eq!(repo.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let (manager, repo, _) = setup().await;
        seed(&repo, "a@x.com", false).await;

        let p1 = manager.login("a@x.com", PASSWORD.to_string()).await.unwrap();
        let p2 = manager
            .refresh(Some(&p1.access_token), Some(&p1.refresh_token))
            .await
            .unwrap();
        assert_ne!(p1, p2);

        manager
            .revoke(Some(&p2.access_token), Some(&p2.refresh_token))
            .await
            .unwrap();

        let err = manager
            .refresh(Some(&p2.access_token), Some(&p2.refresh_token))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidRefreshToken));
    }

    /// Identity store where an admin bans the account right after the
    /// credential read, before the login write lands
    #[derive(Default)]
    struct BanDuringLogin {
        inner: InMemoryAuthRepository,
    }

    impl IdentityRepository for BanDuringLogin {
        async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Identity>> {
            let found = self.inner.find_by_email(email).await?;
            if let Some(identity) = &found {
                let mut banned = identity.clone();
                banned.set_banned(true);
                self.inner.update(&banned).await?;
            }
            Ok(found)
        }

        async fn find_privileged(&self) -> AuthResult<Option<Identity>> {
            self.inner.find_privileged().await
        }

        async fn insert(&self, identity: &Identity) -> AuthResult<()> {
            self.inner.insert(identity).await
        }

        async fn update(&self, identity: &Identity) -> AuthResult<()> {
            self.inner.update(identity).await
        }

        async fn record_login(&self, email: &Email, at: DateTime<Utc>) -> AuthResult<()> {
            self.inner.record_login(email, at).await
        }
    }

    /// Identity store whose record is gone once the credentials are checked
    struct VanishingIdentity {
        snapshot: Identity,
    }

    impl IdentityRepository for VanishingIdentity {
        async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Identity>> {
            Ok((*email == self.snapshot.email).then(|| self.snapshot.clone()))
        }

        async fn find_privileged(&self) -> AuthResult<Option<Identity>> {
            Ok(None)
        }

        async fn insert(&self, _identity: &Identity) -> AuthResult<()> {
            Ok(())
        }

        async fn update(&self, _identity: &Identity) -> AuthResult<()> {
            Err(AuthError::NotFound)
        }

        async fn record_login(&self, _email: &Email, _at: DateTime<Utc>) -> AuthResult<()> {
            Err(AuthError::NotFound)
        }
    }

    #[derive(Clone, Copy)]
    enum SessionFault {
        DeleteMisses,
        LookupFails,
    }

    struct FaultySessions {
        inner: InMemoryAuthRepository,
        fault: SessionFault,
    }

    impl SessionRepository for FaultySessions {
        async fn find_by_identity(&self, email: &Email) -> AuthResult<Option<SessionRecord>> {
            self.inner.find_by_identity(email).await
        }

        async fn find_by_access_token(&self, access_token: &str) -> AuthResult<Option<SessionRecord>> {
            match self.fault {
                SessionFault::LookupFails => {
                    Err(AuthError::Internal("session store unavailable".to_string()))
                }
                SessionFault::DeleteMisses => self.inner.find_by_access_token(access_token).await,
            }
        }

        async fn put(&self, record: &SessionRecord) -> AuthResult<()> {
            self.inner.put(record).await
        }

        async fn delete_by_identity(&self, email: &Email) -> AuthResult<Option<SessionRecord>> {
            match self.fault {
                SessionFault::DeleteMisses => Ok(None),
                SessionFault::LookupFails => self.inner.delete_by_identity(email).await,
            }
        }
    }

    fn faulty_manager(
        repo: &Arc<InMemoryAuthRepository>,
        fault: SessionFault,
    ) -> SessionManager<InMemoryAuthRepository, FaultySessions> {
        let sessions = Arc::new(FaultySessions {
            inner: repo.as_ref().clone(),
            fault,
        });
        SessionManager::new(repo.clone(), sessions, Arc::new(AuthConfig::with_random_secret()))
    }

    #[tokio::test]
    async fn test_login_keeps_concurrent_ban() {
        let identities = Arc::new(BanDuringLogin::default());
        seed(&identities.inner, "a@x.com", false).await;
        let manager = SessionManager::new(
            identities.clone(),
            Arc::new(InMemoryAuthRepository::new()),
            Arc::new(AuthConfig::with_random_secret()),
        );

        manager.login("a@x.com", PASSWORD.to_string()).await.unwrap();

        let stored = identities
            .inner
            .find_by_email(&Email::from_db("a@x.com"))
            .await
            .unwrap()
            .unwrap();
        assert!(stored.is_banned);
        assert!(stored.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_login_failing_to_record_keeps_old_session() {
        let scratch = InMemoryAuthRepository::new();
        let snapshot = seed(&scratch, "a@x.com", false).await;

        let sessions = Arc::new(InMemoryAuthRepository::new());
        let old = SessionRecord::new(snapshot.email.clone(), "old-a".to_string(), "old-r".to_string());
        sessions.put(&old).await.unwrap();

        let manager = SessionManager::new(
            Arc::new(VanishingIdentity { snapshot }),
            sessions.clone(),
            Arc::new(AuthConfig::with_random_secret()),
        );

        let err = manager.login("a@x.com", PASSWORD.to_string()).await.unwrap_err();
        assert!(matches!(err, AuthError::NotFound));

        assert_eq!(sessions.session_count().await, 1);
        let record = sessions.find_by_access_token("old-a").await.unwrap().unwrap();
        assert_eq!(record.refresh_token, "old-r");
    }

    #[tokio::test]
    async fn test_revoke_reports_delete_that_missed() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        seed(&repo, "a@x.com", false).await;
        let manager = faulty_manager(&repo, SessionFault::DeleteMisses);
        let pair = manager.login("a@x.com", PASSWORD.to_string()).await.unwrap();

        let err = manager
            .revoke(Some(&pair.access_token), Some(&pair.refresh_token))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::RevocationInconsistency));

        let app_error = err.to_app_error();
        assert_eq!(app_error.status_code(), 500);
        assert_eq!(app_error.code(), "something_went_wrong");
        assert_eq!(app_error.message(), SOMETHING_WENT_WRONG);
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_revoke_lookup_failure_reports_logout() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        seed(&repo, "a@x.com", false).await;
        let manager = faulty_manager(&repo, SessionFault::LookupFails);
        let pair = manager.login("a@x.com", PASSWORD.to_string()).await.unwrap();

        let outcome = manager
            .revoke(Some(&pair.access_token), Some(&pair.refresh_token))
            .await
            .unwrap();
        assert_eq!(outcome, RevocationOutcome::NoActiveSession);
        assert_eq!(outcome.to_string(), "Logout Successfully");
    }
}
