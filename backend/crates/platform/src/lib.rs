//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing (Argon2id, NIST SP 800-63B compliant)
//! - Cookie building and extraction
//! - Secret handling (random bytes, base64 secrets, constant-time comparison)

pub mod cookie;
pub mod crypto;
pub mod password;
