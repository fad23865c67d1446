//! Password Hashing Service
//!
//! Argon2id with a fresh random salt per hash. The verify contract
//! answers yes/no only; the caller collapses every credential failure
//! into one error shape.

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;

use crate::error::{PlatformError, Result};

#[derive(Default)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PlatformError::Hash { message: e.to_string() })?;
        Ok(hash.to_string())
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| PlatformError::Hash { message: e.to_string() })?;
        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let svc = PasswordService::new();
        let hash = svc.hash_password("TestPassword123").unwrap();

        assert_ne!(hash, "TestPassword123");
        assert!(svc.verify_password("TestPassword123", &hash).unwrap());
        assert!(!svc.verify_password("WrongPassword", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let svc = PasswordService::new();
        let a = svc.hash_password("same-password").unwrap();
        let b = svc.hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let svc = PasswordService::new();
        assert!(svc.verify_password("anything", "not-a-phc-string").is_err());
    }
}
