//! Password hashing with Argon2

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use identity_shared::config::SecuritySettings;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Hash error: {0}")]
    HashError(String),
    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),
}

/// One-way, salted credential hashing.
///
/// `verify` must compare in constant time and must never error: a malformed
/// stored hash simply does not match.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError>;
    fn verify(&self, hash: &str, plaintext: &str) -> bool;
}

/// Argon2id hasher. Also verifies bcrypt hashes (`$2a$`/`$2b$`/`$2y$`)
/// carried over from older deployments.
#[derive(Clone)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    pub fn new(settings: &SecuritySettings) -> Result<Self, PasswordError> {
        let params = Params::new(
            settings.argon2_memory_kib,
            settings.argon2_iterations,
            settings.argon2_parallelism,
            None,
        )
        .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl Default for PasswordService {
    fn default() -> Self {
        Self { argon2: Argon2::default() }
    }
}

impl CredentialHasher for PasswordService {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| PasswordError::HashError(e.to_string()))
    }

    fn verify(&self, hash: &str, plaintext: &str) -> bool {
        if is_bcrypt_hash(hash) {
            return bcrypt::verify(plaintext, hash).unwrap_or(false);
        }

        match PasswordHash::new(hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

fn is_bcrypt_hash(hash: &str) -> bool {
    ["$2a$", "$2b$", "$2y$"].iter().any(|p| hash.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_service() -> PasswordService {
        PasswordService::new(&SecuritySettings {
            argon2_memory_kib: 1024,
            argon2_iterations: 1,
            argon2_parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let service = fast_service();
        let hash = service.hash("SecurePass123!").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(service.verify(&hash, "SecurePass123!"));
        assert!(!service.verify(&hash, "securepass123!"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let service = fast_service();
        let a = service.hash("same-password").unwrap();
        let b = service.hash("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_legacy_bcrypt() {
        let service = fast_service();
        let legacy = bcrypt::hash("SecurePass123!", 4).unwrap();

        assert!(service.verify(&legacy, "SecurePass123!"));
        assert!(!service.verify(&legacy, "wrong"));
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        let service = fast_service();
        assert!(!service.verify("not-a-hash", "anything"));
        assert!(!service.verify("", ""));
    }

    #[test]
    fn test_rejects_invalid_params() {
        let result = PasswordService::new(&SecuritySettings {
            argon2_memory_kib: 1,
            argon2_iterations: 0,
            argon2_parallelism: 1,
        });
        assert!(matches!(result, Err(PasswordError::InvalidParams(_))));
    }
}
