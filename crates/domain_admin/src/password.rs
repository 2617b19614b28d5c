//! Argon2 password hashing

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::fmt;

use crate::error::AdminError;

/// Plain-text password; `Debug` never prints the value
#[derive(Clone)]
pub struct Password(String);

impl Password {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Hashes a password with Argon2id and a random salt
pub fn hash_password(password: &Password) -> Result<String, AdminError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_str().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AdminError::PasswordHash(e.to_string()))
}

/// Checks a password against a stored PHC hash string
///
/// Returns `Ok(false)` on mismatch and an error only when the hash is malformed.
pub fn verify_password(password: &Password, hash: &str) -> Result<bool, AdminError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AdminError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_str().as_bytes(), &parsed)
        .is_ok())
}

/// Runs [`hash_password`] on the blocking thread pool
///
/// Argon2 is deliberately slow; calling it inline would stall an async worker.
///
/// # Errors
///
/// Returns `AdminError::PasswordHash` if hashing fails or the blocking task is cancelled
pub async fn hash_password_task(password: Password) -> Result<String, AdminError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AdminError::PasswordHash(e.to_string()))?
}

/// Runs [`verify_password`] on the blocking thread pool
pub async fn verify_password_task(password: Password, hash: String) -> Result<bool, AdminError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AdminError::PasswordHash(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_phc_string() {
        let hash = hash_password(&Password::new("s3cret!")).unwrap();
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn test_verify() {
        let password = Password::new("s3cret!");
        let hash = hash_password(&password).unwrap();
        assert!(verify_password(&password, &hash).unwrap());
        assert!(!verify_password(&Password::new("guess"), &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let password = Password::new("s3cret!");
        assert_ne!(hash_password(&password).unwrap(), hash_password(&password).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_password(&Password::new("x"), "not-a-hash").is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_hash_and_verify_on_blocking_pool() {
        let hash = hash_password_task(Password::new("s3cret!")).await.unwrap();
        assert!(verify_password_task(Password::new("s3cret!"), hash.clone()).await.unwrap());
        assert!(!verify_password_task(Password::new("guess"), hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_blocking_verify_reports_malformed_hash() {
        let result = verify_password_task(Password::new("x"), "not-a-hash".to_string()).await;
        assert!(matches!(result, Err(AdminError::PasswordHash(_))));
    }

    #[test]
    fn test_debug_hides_value() {
        assert_eq!(format!("{:?}", Password::new("s3cret!")), "Password(***)");
    }
}
