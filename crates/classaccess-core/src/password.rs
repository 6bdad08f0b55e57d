//! Password hashing with bcrypt.
//!
//! A mismatch is a plain `Ok(false)`; only a malformed stored hash or a
//! hashing failure surfaces as an error.

use bcrypt::{hash, verify};

use crate::errors::AppError;

/// Work factor applied to every stored credential.
pub const HASH_COST: u32 = 12;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash_password_with_cost(password, HASH_COST)
}

/// Lower costs exist for fixtures; production paths go through [`hash_password`].
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost).map_err(AppError::internal)
}

pub fn verify_password(password: &str, hashed: &str) -> Result<bool, AppError> {
    verify(password, hashed).map_err(AppError::internal)
}
