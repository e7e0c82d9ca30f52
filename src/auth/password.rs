use crate::error::AppError;
use bcrypt::{hash, verify};

// Work factor for bcrypt; high enough to resist brute force, low enough
// to keep registration and login interactive.
const BCRYPT_COST: u32 = 10;

/// Hashes a plaintext password with a fresh random salt.
/// Equal inputs produce different hashes that both verify.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    Ok(hash(password, BCRYPT_COST)?)
}

/// Checks a plaintext password against a stored hash.
/// A mismatch is `Ok(false)`, not an error.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    Ok(verify(password, hashed_password)?)
}
