//! Password hashing and verification.

use scrypt::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Scrypt,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed")]
    Hash,
    #[error("stored password hash is malformed")]
    MalformedHash,
}

/// Hash a password using scrypt
pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|_| PasswordError::Hash)?
        .to_string();
    Ok(hash)
}

/// Verify a password against a stored hash.
///
/// A mismatch is `Ok(false)`. A stored hash that cannot be parsed is an
/// error, so callers can report infrastructure failures separately from a
/// plain wrong password.
pub fn verify_password(hash: &str, plain: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::MalformedHash)?;
    Ok(Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok())
}
