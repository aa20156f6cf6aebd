//! Identity Entity
//!
//! A registered account, keyed by its email.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{email::Email, user_password::UserPassword, user_role::UserRole};

/// Identity entity
#[derive(Debug, Clone)]
pub struct Identity {
    /// Unique identity key (immutable)
    pub email: Email,
    /// Display name
    pub full_name: String,
    pub role: UserRole,
    pub password_hash: UserPassword,
    pub is_banned: bool,
    /// Set for the bootstrap superuser account
    pub is_privileged: bool,
    pub created_at: DateTime<Utc>,
    /// Last successful login time
    pub last_login_at: Option<DateTime<Utc>>,
}

impl Identity {
    /// Create a new, unbanned identity
    ///
    /// Only the SUPERUSER role is privileged.
    pub fn new(email: Email, full_name: String, role: UserRole, password_hash: UserPassword) -> Self {
        Self {
            email,
            full_name,
            role,
            password_hash,
            is_banned: false,
            is_privileged: role == UserRole::SuperUser,
            created_at: Utc::now(),
            last_login_at: None,
        }
    }

    /// Record successful login
    pub fn set_full_name(&mut self, full_name: String) {
        self.full_name = full_name;
    }

    pub fn set_password(&mut self, password_hash: UserPassword) {
        self.password_hash = password_hash;
    }

    pub fn set_banned(&mut self, banned: bool) {
        self.is_banned = banned;
    }
}
