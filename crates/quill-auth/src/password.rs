//! Password hashing.
//!
//! argon2id with a per-password random salt. The hash cost is what resists
//! offline brute force; plaintext passwords are never persisted or logged
//! anywhere in the workspace.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{AuthError, AuthResult};

/// Hashes a password for storage.
pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Verifies a password against a stored hash.
///
/// A malformed stored hash verifies as false rather than erroring; the
/// caller's response must be indistinguishable from a wrong password.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("pw12345678").unwrap();

        assert!(verify_password("pw12345678", &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("pw12345678").unwrap();
        let second = hash_password("pw12345678").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_is_false() {
        assert!(!verify_password("pw12345678", "not-a-phc-string"));
    }
}
