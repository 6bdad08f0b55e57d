//! # ClassAccess Auth
//!
//! Signed, time-bounded credentials for the ClassAccess API.
//!
//! - [`claims`]: claim sets carried by access and refresh tokens
//! - [`jwt`]: the [`TokenIssuer`] that signs and verifies them
//!
//! Access tokens carry `{id, email, role}` and authorize individual calls.
//! Refresh tokens carry only the subject id and are signed with a different
//! secret, so neither token class can stand in for the other.

pub mod claims;
pub mod jwt;

pub use claims::{AccessClaims, RefreshClaims};
pub use jwt::{IssuedToken, TokenError, TokenIssuer};
