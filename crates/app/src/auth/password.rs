//! Password hashing and verification using Argon2id.

use std::fmt;

use argon2::{
    Argon2,
    password_hash::{
        Error as HashError, PasswordHash as ParsedHash, PasswordHasher, PasswordVerifier,
        SaltString, rand_core::OsRng,
    },
};
use thiserror::Error;
use tokio::task;

/// Shortest password accepted when an account is created.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Password hashing or verification failures.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hashing(HashError),

    #[error("stored password hash is malformed: {0}")]
    InvalidHashFormat(HashError),

    #[error("password worker stopped unexpectedly")]
    Worker(#[from] task::JoinError),
}

/// PHC-formatted Argon2 hash as stored in the `users` table.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a PHC string read from storage.
    #[must_use]
    pub fn from_phc(phc: String) -> Self {
        Self(phc)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(**redacted**)")
    }
}

/// Hash a password on the blocking pool.
pub async fn hash_password(password: String) -> Result<PasswordHash, PasswordError> {
    task::spawn_blocking(move || hash_password_blocking(&password)).await?
}

/// Verify a password against a stored hash on the blocking pool.
///
/// Returns `Ok(false)` when the password does not match.
pub async fn verify_password(password: String, hash: PasswordHash) -> Result<bool, PasswordError> {
    task::spawn_blocking(move || verify_password_blocking(&password, &hash)).await?
}

fn hash_password_blocking(password: &str) -> Result<PasswordHash, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| PasswordHash(hash.to_string()))
        .map_err(PasswordError::Hashing)
}

fn verify_password_blocking(password: &str, hash: &PasswordHash) -> Result<bool, PasswordError> {
    let parsed = ParsedHash::new(hash.as_str()).map_err(PasswordError::InvalidHashFormat)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(error) => Err(PasswordError::InvalidHashFormat(error)),
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn hash_then_verify_accepts_the_same_password() -> TestResult {
        let hash = hash_password("secret1".to_string()).await?;

        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(verify_password("secret1".to_string(), hash.clone()).await?);
        assert!(!verify_password("secret2".to_string(), hash).await?);

        Ok(())
    }

    #[tokio::test]
    async fn verify_rejects_malformed_hash() {
        let result =
            verify_password("secret1".to_string(), PasswordHash::from_phc("nope".into())).await;

        assert!(matches!(result, Err(PasswordError::InvalidHashFormat(_))));
    }

    #[test]
    fn debug_output_is_redacted() {
        let hash = PasswordHash::from_phc("$argon2id$v=19$secret".to_string());

        assert_eq!(format!("{hash:?}"), "PasswordHash(**redacted**)");
    }
}
