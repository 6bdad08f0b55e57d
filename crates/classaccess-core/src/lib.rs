//! # ClassAccess Core
//!
//! Foundational types shared by every ClassAccess crate:
//!
//! - [`errors`]: the HTTP-mapped [`AppError`] and its response envelope
//! - [`password`]: bcrypt hashing and verification
//! - [`response`]: the `{success, message, data}` success envelope
//! - [`role`]: the closed [`Role`] enumeration (Student, Teacher, Admin)

pub mod errors;
pub mod password;
pub mod response;
pub mod role;

pub use errors::{AppError, set_expose_internal_errors};
pub use password::{hash_password, hash_password_with_cost, verify_password};
pub use response::ApiResponse;
pub use role::{Role, UnknownRole};
