//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infrastructure layer.
//! Each write is a single atomic statement; concurrent writes to the same
//! session are last-writer-wins.

use chrono::{DateTime, Utc};

use crate::domain::entity::{identity::Identity, session::SessionRecord};
use crate::domain::value_object::email::Email;
use crate::error::AuthResult;

/// Identity repository trait
#[trait_variant::make(IdentityRepository: Send)]
pub trait LocalIdentityRepository {
    /// Find identity by its key
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Identity>>;

    /// Find any privileged identity
    async fn find_privileged(&self) -> AuthResult<Option<Identity>>;

    /// Create a new identity; `EmailTaken` if the key exists
    async fn insert(&self, identity: &Identity) -> AuthResult<()>;

    /// Overwrite the mutable fields of an existing identity
    async fn update(&self, identity: &Identity) -> AuthResult<()>;

    /// Set `last_login_at` only, leaving concurrent edits to other fields intact
    async fn record_login(&self, email: &Email, at: DateTime<Utc>) -> AuthResult<()>;
}

/// Session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    async fn find_by_identity(&self, email: &Email) -> AuthResult<Option<SessionRecord>>;

    /// Exact match on the stored access token
    async fn find_by_access_token(&self, access_token: &str) -> AuthResult<Option<SessionRecord>>;

    /// Insert or replace, keyed by identity
    async fn put(&self, record: &SessionRecord) -> AuthResult<()>;

    /// Delete and return the removed record
    async fn delete_by_identity(&self, email: &Email) -> AuthResult<Option<SessionRecord>>;
}
