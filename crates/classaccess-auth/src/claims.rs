use classaccess_core::Role;
use serde::{Deserialize, Serialize};

/// Claims embedded in access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User id (subject claim)
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// Issued-at (Unix timestamp)
    pub iat: i64,
}

/// Claims embedded in refresh tokens. Identity only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    /// Unique per issuance so two logins in the same second yield distinct tokens.
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}

impl AccessClaims {
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

impl RefreshClaims {
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}
