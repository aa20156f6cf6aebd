//! Cryptographic Utilities

use base64::{Engine, engine::general_purpose};
use rand::{RngCore, rngs::OsRng};
use thiserror::Error;

/// Length of signing secrets in bytes
pub const SECRET_LEN: usize = 32;

/// Errors when loading a configured secret
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Secret is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Secret must be {expected} bytes (got {actual})")]
    WrongLength { expected: usize, actual: usize },
}

/// Generate a random signing secret
pub fn random_secret() -> [u8; SECRET_LEN] {
    let mut secret = [0u8; SECRET_LEN];
    OsRng.fill_bytes(&mut secret);
    secret
}

/// Decode a base64 (standard alphabet) signing secret of exactly [`SECRET_LEN`] bytes
pub fn decode_secret(encoded: &str) -> Result<[u8; SECRET_LEN], SecretError> {
    let bytes = general_purpose::STANDARD.decode(encoded.trim())?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| SecretError::WrongLength {
            expected: SECRET_LEN,
            actual: bytes.len(),
        })
}

/// Constant-time comparison to prevent timing attacks
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_secret() {
        let secret = random_secret();
        // Should not be all zeros (statistically)
        assert!(secret.iter().any(|&b| b != 0));
        assert_ne!(secret, random_secret());
    }

    #[test]
    fn test_decode_secret() {
        let encoded = general_purpose::STANDARD.encode([7u8; SECRET_LEN]);
        assert_eq!(decode_secret(&encoded).unwrap(), [7u8; SECRET_LEN]);

        let short = general_purpose::STANDARD.encode([7u8; 16]);
        assert!(matches!(
            decode_secret(&short),
            Err(SecretError::WrongLength { expected: 32, actual: 16 })
        ));

        assert!(matches!(
            decode_secret("not base64!"),
            Err(SecretError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abcd", b"abcd"));
        assert!(!constant_time_eq(b"abcd", b"abce"));
        assert!(!constant_time_eq(b"abcd", b"abc"));
        assert!(constant_time_eq(b"", b""));
    }
}
