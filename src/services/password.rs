//! Password hashing
//!
//! Secure password hashing and verification using Argon2id with the
//! argon2 crate's default parameters and a random salt per hash.

use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password using Argon2id with secure defaults.
///
/// Returns the hash in PHC string format (algorithm, parameters, salt,
/// and hash).
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
        .context("Password hashing failed")?;

    Ok(password_hash.to_string())
}

/// Verify a password against a stored hash.
///
/// Returns `false` for a wrong password and also for a malformed or
/// unparseable stored hash. A corrupt digest in the database must read
/// as a failed login, never as an infrastructure error.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
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
    fn test_hash_password_produces_argon2id_hash() {
        let password = "test_password_123";
        let hash = hash_password(password).expect("Failed to hash password");

        assert!(hash.starts_with("$argon2id$"), "Hash should use Argon2id");
    }

    #[test]
    fn test_hash_password_produces_different_hashes() {
        let password = "same_password";
        let hash1 = hash_password(password).expect("Failed to hash password");
        let hash2 = hash_password(password).expect("Failed to hash password");

        // Different salts should produce different hashes
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_correct() {
        let password = "correct_password";
        let hash = hash_password(password).expect("Failed to hash password");

        assert!(verify_password(password, &hash));
    }

    #[test]
    fn test_verify_password_incorrect() {
        let password = "correct_password";
        let hash = hash_password(password).expect("Failed to hash password");

        assert!(!verify_password("wrong_password", &hash));
    }

    #[test]
    fn test_verify_password_malformed_hash_is_false() {
        assert!(!verify_password("password", "invalid_hash_format"));
        assert!(!verify_password("password", ""));
        assert!(!verify_password("password", "$argon2id$garbage"));
    }

    #[test]
    fn test_hash_password_empty_password() {
        // Empty passwords still hash; validation happens elsewhere
        let hash = hash_password("").expect("Failed to hash empty password");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("", &hash));
    }

    #[test]
    fn test_hash_password_unicode() {
        let password = "пароль测试🔐";
        let hash = hash_password(password).expect("Failed to hash unicode password");

        assert!(verify_password(password, &hash));
    }

    #[test]
    fn test_hash_password_long_password() {
        let password = "a".repeat(1000);
        let hash = hash_password(&password).expect("Failed to hash long password");

        assert!(verify_password(&password, &hash));
    }

    #[test]
    fn test_password_hash_not_equal_to_password() {
        let password = "my_secret_password";
        let hash = hash_password(password).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(!hash.contains(password));
    }
}
