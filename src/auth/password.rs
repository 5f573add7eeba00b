//! Password hashing and verification.
//!
//! Credentials are hashed with bcrypt. Hashing is a pure function of its
//! input plus a fresh salt; verification compares in constant time inside
//! bcrypt and never exposes how much of the candidate matched.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AppError;

/// Hash a plaintext password with bcrypt.
///
/// Any plaintext is accepted, including the empty string and multi-byte
/// unicode. Fails only if bcrypt itself cannot produce a hash.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))
}

/// Verify a plaintext password against its stored hash.
///
/// A stored hash that cannot be parsed counts as a mismatch rather than
/// an error: the caller only ever learns pass/fail.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match verify(password, stored_hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!(error = %e, "stored credential hash could not be parsed");
            false
        }
    }
}
