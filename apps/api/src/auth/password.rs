//! Argon2id password hashing. Hashes are stored as PHC strings.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use super::AuthError;

/// Hash a password using Argon2id with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored PHC hash.
/// A malformed stored hash is an error; a wrong password is `Ok(false)`.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AuthError::Hash(format!("Invalid password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// `hash_password` on the blocking pool.
pub async fn hash_password_blocking(password: &str) -> Result<String, AuthError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::Hash(format!("spawn_blocking failed in password hashing: {e}")))?
}

/// `verify_password` on the blocking pool.
pub async fn verify_password_blocking(password: &str, stored_hash: &str) -> Result<bool, AuthError> {
    let password = password.to_owned();
    let stored_hash = stored_hash.to_owned();
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| AuthError::Hash(format!("spawn_blocking failed in password check: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing_and_verification() {
        let password = "test_password123";
        let hashed = hash_password(password).unwrap();

        assert!(hashed.starts_with("$argon2id$"));
        assert!(verify_password(password, &hashed).unwrap());
        assert!(!verify_password("wrong_password", &hashed).unwrap());
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        assert_ne!(hash_password("pw").unwrap(), hash_password("pw").unwrap());
    }

    #[test]
    fn test_verify_with_invalid_hash() {
        assert!(matches!(
            verify_password("test_password123", "invalidhashformat"),
            Err(AuthError::Hash(_))
        ));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_blocking_variants_agree_with_sync_ones() {
        let hashed = hash_password_blocking("s3cret").await.unwrap();

        assert!(verify_password("s3cret", &hashed).unwrap());
        assert!(verify_password_blocking("s3cret", &hashed).await.unwrap());
        assert!(!verify_password_blocking("nope", &hashed).await.unwrap());
        assert!(matches!(
            verify_password_blocking("s3cret", "garbage").await,
            Err(AuthError::Hash(_))
        ));
    }
}
