//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::entity::{identity::Identity, session::SessionRecord};
use crate::domain::repository::{IdentityRepository, SessionRepository};
use crate::domain::value_object::{
    email::Email, user_password::UserPassword, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Identity Repository Implementation
// ============================================================================

impl IdentityRepository for PgAuthRepository {
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT
                email,
                full_name,
                role,
                password_hash,
                is_banned,
                is_privileged,
                created_at,
                last_login_at
            FROM identities
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_identity()).transpose()
    }

    async fn find_privileged(&self) -> AuthResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT
                email,
                full_name,
                role,
                password_hash,
                is_banned,
                is_privileged,
                created_at,
                last_login_at
            FROM identities
            WHERE is_privileged
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_identity()).transpose()
    }

    async fn insert(&self, identity: &Identity) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO identities (
                email,
                full_name,
                role,
                password_hash,
                is_banned,
                is_privileged,
                created_at,
                last_login_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(identity.email.as_str())
        .bind(&identity.full_name)
        .bind(identity.role.id())
        .bind(identity.password_hash.as_phc_string())
        .bind(identity.is_banned)
        .bind(identity.is_privileged)
        .bind(identity.created_at)
        .bind(identity.last_login_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AuthError::EmailTaken,
            other => AuthError::Database(other),
        })?;

        Ok(())
    }

    async fn update(&self, identity: &Identity) -> AuthResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE identities SET
                full_name = $2,
                role = $3,
                password_hash = $4,
                is_banned = $5,
                is_privileged = $6,
                last_login_at = $7
            WHERE email = $1
            "#,
        )
        .bind(identity.email.as_str())
        .bind(&identity.full_name)
        .bind(identity.role.id())
        .bind(identity.password_hash.as_phc_string())
        .bind(identity.is_banned)
        .bind(identity.is_privileged)
        .bind(identity.last_login_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::NotFound);
        }

        Ok(())
    }
    async fn record_login(&self, email: &Email, at: DateTime<Utc>) -> AuthResult<()> {
        let result = sqlx::query("UPDATE identities SET last_login_at = $2 WHERE email = $1")
            .bind(email.as_str())
            .bind(at)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::NotFound);
        }

        Ok(())
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthRepository {
    async fn find_by_identity(&self, email: &Email) -> AuthResult<Option<SessionRecord>> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT email, access_token, refresh_token FROM sessions WHERE email = $1",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SessionRow::into_record))
    }

    async fn find_by_access_token(&self, access_token: &str) -> AuthResult<Option<SessionRecord>> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT email, access_token, refresh_token FROM sessions WHERE access_token = $1",
        )
        .bind(access_token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SessionRow::into_record))
    }

    async fn put(&self, record: &SessionRecord) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (email, access_token, refresh_token)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE SET
                access_token = EXCLUDED.access_token,
                refresh_token = EXCLUDED.refresh_token
            "#,
        )
        .bind(record.email.as_str())
        .bind(&record.access_token)
        .bind(&record.refresh_token)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_by_identity(&self, email: &Email) -> AuthResult<Option<SessionRecord>> {
        let row = sqlx::query_as::<_, SessionRow>(
            "DELETE FROM sessions WHERE email = $1 RETURNING email, access_token, refresh_token",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SessionRow::into_record))
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct IdentityRow {
    email: String,
    full_name: String,
    role: i16,
    password_hash: String,
    is_banned: bool,
    is_privileged: bool,
    created_at: DateTime<Utc>,
    last_login_at: Option<DateTime<Utc>>,
}

impl IdentityRow {
    fn into_identity(self) -> AuthResult<Identity> {
        let role = UserRole::from_id(self.role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid role id: {}", self.role)))?;

        Ok(Identity {
            email: Email::from_db(self.email),
            full_name: self.full_name,
            role,
            password_hash: UserPassword::from_phc_string(self.password_hash)?,
            is_banned: self.is_banned,
            is_privileged: self.is_privileged,
            created_at: self.created_at,
            last_login_at: self.last_login_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    email: String,
    access_token: String,
    refresh_token: String,
}

impl SessionRow {
    fn into_record(self) -> SessionRecord {
        SessionRecord::new(Email::from_db(self.email), self.access_token, self.refresh_token)
    }
}
