//! Argon2id password hashing.
use anyhow::anyhow;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

/// Stored for accounts created without a password. Never verifies.
pub const UNUSABLE_PASSWORD: &str = "!unusable";

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| anyhow!("hash password: {err}"))
}

/// `true` only when `password` matches the PHC string in `hash`.
pub fn verify_password(password: &str, hash: &str) -> bool {
    if hash.starts_with('!') {
        return false;
    }
    let Ok(parsed) = PasswordHash::new(hash) else {
        tracing::warn!("stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
