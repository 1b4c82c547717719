/// Password Hashing and Verification
///
/// bcrypt output embeds its own salt and cost (`$2b$12$...`), so a stored
/// hash is all `verify_password` needs.

use bcrypt::{hash, verify};

use crate::error::AppError;

/// Hash a plaintext password with bcrypt at the given cost
///
/// # Errors
/// Returns error if the cost is out of range or bcrypt fails
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost).map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a plaintext password against a stored bcrypt hash
///
/// A malformed hash never raises; it simply does not match.
pub fn verify_password(password: &str, hashed: &str) -> bool {
    match verify(password, hashed) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash could not be parsed");
            false
        }
    }
}
