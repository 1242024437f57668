//! Password hashing and verification.
//!
//! Argon2id with the crate's recommended defaults. Hashes are PHC strings
//! carrying their own salt and parameters, so verification needs no extra
//! state and parameter upgrades only affect new hashes.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password with a freshly generated salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow!("failed to hash password: {e}"))
}

/// Verify a password against a stored PHC hash.
///
/// Returns `Ok(false)` on mismatch; the comparison itself is constant-time.
/// `Err` means the stored hash is malformed, which is a storage defect rather
/// than a credential failure.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow!("invalid password hash: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
