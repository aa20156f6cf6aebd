use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum UserRole {
    #[default]
    User = 0,
    Admin = 1,
    SuperUser = 2,
}

impl UserRole {
    /// Roles from lowest to highest privilege
    pub const ORDER: [UserRole; 3] = [UserRole::User, UserRole::Admin, UserRole::SuperUser];

    /// Position in [`UserRole::ORDER`]
    #[inline]
    pub fn rank(&self) -> usize {
        Self::ORDER
            .iter()
            .position(|role| role == self)
            .unwrap_or_default()
    }

    /// Strictly lower in the hierarchy than `other`
    ///
    /// The relation is strict, so no role descends from itself.
    #[inline]
    pub fn is_descendant_of(&self, other: UserRole) -> bool {
        self.rank() < other.rank()
    }

    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        use UserRole::*;
        match self {
            User => "user",
            Admin => "admin",
            SuperUser => "superuser",
        }
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        Self::ORDER.into_iter().find(|role| role.id() == id)
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ORDER.into_iter().find(|role| role.code() == code)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_from_id() {
        assert_eq!(UserRole::from_id(0), Some(UserRole::User));
        assert_eq!(UserRole::from_id(1), Some(UserRole::Admin));
        assert_eq!(UserRole::from_id(2), Some(UserRole::SuperUser));
        assert_eq!(UserRole::from_id(7), None);
    }

    #[test]
    fn test_user_role_from_code() {
        assert_eq!(UserRole::from_code("user"), Some(UserRole::User));
        assert_eq!(UserRole::from_code("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_code("superuser"), Some(UserRole::SuperUser));
        assert_eq!(UserRole::from_code("root"), None);
    }

    #[test]
    fn test_user_role_display() {
        assert_eq!(UserRole::User.to_string(), "user");
        assert_eq!(UserRole::Admin.to_string(), "admin");
        assert_eq!(UserRole::SuperUser.to_string(), "superuser");
    }

    #[test]
    fn test_is_descendant_of() {
        assert!(UserRole::User.is_descendant_of(UserRole::Admin));
        assert!(UserRole::User.is_descendant_of(UserRole::SuperUser));
        assert!(UserRole::Admin.is_descendant_of(UserRole::SuperUser));
        assert!(!UserRole::SuperUser.is_descendant_of(UserRole::Admin));
        assert!(!UserRole::Admin.is_descendant_of(UserRole::User));

        for role in UserRole::ORDER {
            assert!(!role.is_descendant_of(role), "{role} must not descend from itself");
        }
    }

    #[test]
    fn test_rank_follows_order() {
        assert_eq!(UserRole::User.rank(), 0);
        assert_eq!(UserRole::Admin.rank(), 1);
        assert_eq!(UserRole::SuperUser.rank(), 2);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&UserRole::SuperUser).unwrap(), "\"superuser\"");
        let role: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, UserRole::Admin);
    }
}
