//! Application Configuration
//!
//! Configuration for the Auth application layer. Built once at startup and
//! shared read-only.

use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::crypto::{SECRET_LEN, random_secret};
use thiserror::Error;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Longest accepted token lifetime (10 years)
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 3600);

/// A configured token lifetime is zero or above [`MAX_TOKEN_TTL`]
#[derive(Debug, Error)]
#[error("Token lifetime must be positive and at most {} days", MAX_TOKEN_TTL.as_secs() / 86_400)]
pub struct TtlOutOfRange;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret (32 bytes)
    pub secret_key: [u8; SECRET_LEN],
    /// Access token lifetime (30 minutes)
    pub access_token_ttl: Duration,
    /// Refresh token lifetime (1 week)
    pub refresh_token_ttl: Duration,
    /// Access token cookie name
    pub access_cookie_name: String,
    /// Refresh token cookie name
    pub refresh_cookie_name: String,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: [0u8; SECRET_LEN],
            access_token_ttl: Duration::from_secs(30 * 60),
            refresh_token_ttl: Duration::from_secs(7 * 24 * 3600),
            access_cookie_name: "jwt-access".to_string(),
            refresh_cookie_name: "jwt-refresh".to_string(),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            password_pepper: None,
        }
    }
}

impl AuthConfig {
    /// Config with the given signing secret and default lifetimes
    pub fn new(secret_key: [u8; SECRET_LEN]) -> Self {
        Self {
            secret_key,
            ..Default::default()
        }
    }

    /// Create config with a random signing secret (for development)
    pub fn with_random_secret() -> Self {
        Self::new(random_secret())
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    pub fn with_access_token_ttl_minutes(mut self, minutes: u64) -> Result<Self, TtlOutOfRange> {
        self.access_token_ttl = bounded_ttl(minutes, 60)?;
        Ok(self)
    }

    pub fn with_refresh_token_ttl_days(mut self, days: u64) -> Result<Self, TtlOutOfRange> {
        self.refresh_token_ttl = bounded_ttl(days, 24 * 3600)?;
        Ok(self)
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    /// Cookie carrying the access token; lives as long as the token
    pub fn access_cookie(&self) -> CookieConfig {
        self.cookie(&self.access_cookie_name, self.access_token_ttl)
    }

    /// Cookie carrying the refresh token; lives as long as the token
    pub fn refresh_cookie(&self) -> CookieConfig {
        self.cookie(&self.refresh_cookie_name, self.refresh_token_ttl)
    }

    fn cookie(&self, name: &str, ttl: Duration) -> CookieConfig {
        CookieConfig {
            secure: self.cookie_secure,
            same_site: self.cookie_same_site,
            max_age_secs: Some(ttl.as_secs()),
            ..CookieConfig::named(name)
        }
    }
}

fn bounded_ttl(count: u64, unit_secs: u64) -> Result<Duration, TtlOutOfRange> {
    let ttl = count
        .checked_mul(unit_secs)
        .map(Duration::from_secs)
        .ok_or(TtlOutOfRange)?;
    if ttl.is_zero() || ttl > MAX_TOKEN_TTL {
        return Err(TtlOutOfRange);
    }
    Ok(ttl)
}
