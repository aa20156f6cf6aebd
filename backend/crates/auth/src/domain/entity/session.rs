//! Session Entity
//!
//! The single live token pair of an identity. Keyed by the identity's email,
//! so an identity has at most one session.

use platform::crypto::constant_time_eq;

use crate::domain::value_object::email::Email;

/// Session record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// Owning identity (also the record key)
    pub email: Email,
    pub access_token: String,
    pub refresh_token: String,
}

impl SessionRecord {
    pub fn new(email: Email, access_token: String, refresh_token: String) -> Self {
        Self {
            email,
            access_token,
            refresh_token,
        }
    }

    /// Exact comparison of the stored refresh token with a presented one
    pub fn matches_refresh(&self, presented: &str) -> bool {
        constant_time_eq(self.refresh_token.as_bytes(), presented.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_refresh() {
        let record = SessionRecord::new(
            Email::from_db("a@x.com"),
            "access".to_string(),
            "refresh".to_string(),
        );

        assert!(record.matches_refresh("refresh"));
        assert!(!record.matches_refresh("refresh "));
        assert!(!record.matches_refresh("access"));
        assert!(!record.matches_refresh(""));
    }
}
