//! In-Memory Repository Implementations
//!
//! Process-local stores for tests and database-less local runs.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::entity::{identity::Identity, session::SessionRecord};
use crate::domain::repository::{IdentityRepository, SessionRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// In-memory auth repository
///
/// Clones share the same maps.
#[derive(Clone, Default)]
pub struct InMemoryAuthRepository {
    identities: Arc<RwLock<HashMap<Email, Identity>>>,
    sessions: Arc<RwLock<HashMap<Email, SessionRecord>>>,
}

impl InMemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

// ============================================================================
// Identity Repository Implementation
// ============================================================================

impl IdentityRepository for InMemoryAuthRepository {
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Identity>> {
        let identities = self.identities.read().await;
        Ok(identities.get(email).cloned())
    }

    async fn find_privileged(&self) -> AuthResult<Option<Identity>> {
        let identities = self.identities.read().await;
        Ok(identities.values().find(|i| i.is_privileged).cloned())
    }

    async fn insert(&self, identity: &Identity) -> AuthResult<()> {
        let mut identities = self.identities.write().await;
        if identities.contains_key(&identity.email) {
            return Err(AuthError::EmailTaken);
        }
        identities.insert(identity.email.clone(), identity.clone());
        Ok(())
    }

    async fn update(&self, identity: &Identity) -> AuthResult<()> {
        let mut identities = self.identities.write().await;
        let stored = identities
            .get_mut(&identity.email)
            .ok_or(AuthError::NotFound)?;
        *stored = identity.clone();
        Ok(())
    }

    async fn record_login(&self, email: &Email, at: DateTime<Utc>) -> AuthResult<()> {
        let mut identities = self.identities.write().await;
        let stored = identities.get_mut(email).ok_or(AuthError::NotFound)?;
        stored.last_login_at = Some(at);
        Ok(())
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for InMemoryAuthRepository {
    async fn find_by_identity(&self, email: &Email) -> AuthResult<Option<SessionRecord>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(email).cloned())
    }

    async fn find_by_access_token(&self, access_token: &str) -> AuthResult<Option<SessionRecord>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .find(|s| s.access_token == access_token)
            .cloned())
    }

    async fn put(&self, record: &SessionRecord) -> AuthResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(record.email.clone(), record.clone());
        Ok(())
    }

    async fn delete_by_identity(&self, email: &Email) -> AuthResult<Option<SessionRecord>> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.remove(email))
    }
}
