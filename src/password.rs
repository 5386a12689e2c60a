//! Argon2id password hashing for local accounts.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$...`) in the
//! `users.password_hash` column.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{NotesError, Result};

/// Hashes starting with this marker never match any password.
pub const UNUSABLE_PASSWORD_PREFIX: char = '!';

/// Hash a password with a fresh random salt. Returns a PHC-format string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| NotesError::Password(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Check `password` against a stored PHC hash.
///
/// `Ok(false)` means a mismatch or an unusable hash; `Err` means the stored
/// hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    if hash.starts_with(UNUSABLE_PASSWORD_PREFIX) {
        return Ok(false);
    }
    let parsed = PasswordHash::new(hash)
        .map_err(|e| NotesError::Password(format!("Invalid password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
