//! Token issuing and verification.
//!
//! [`TokenIssuer`] owns the signing keys for both token classes. Keys are
//! derived once from [`JwtConfig`] and shared through application state.
//!
//! Verification distinguishes [`TokenError::Expired`] from
//! [`TokenError::InvalidSignature`] so callers can choose between a silent
//! refresh and a forced re-login. The HTTP layer collapses both into the same
//! 401 response.
//!
//! # Example
//!
//! ```ignore
//! use classaccess_auth::TokenIssuer;
//! use classaccess_config::JwtConfig;
//! use classaccess_core::Role;
//!
//! let issuer = TokenIssuer::new(&JwtConfig::from_env());
//! let access = issuer.issue_access_token(42, "ana@escuela.mx", Role::Teacher)?;
//! let claims = issuer.verify_access_token(&access.token)?;
//! assert_eq!(claims.user_id(), Some(42));
//! ```

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use classaccess_config::JwtConfig;
use classaccess_core::Role;

use crate::claims::{AccessClaims, RefreshClaims};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    /// Signature mismatch, wrong secret, or a malformed token.
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token lifetime of {0} seconds is out of range")]
    InvalidLifetime(i64),
    #[error("failed to sign token: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
}

/// A freshly signed token and the instant it stops verifying.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Seconds until expiry, floored at zero. Used for cookie max-age.
    pub fn max_age_secs(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds().max(0)
    }
}

#[derive(Clone)]
pub struct TokenIssuer {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: i64,
    refresh_ttl: i64,
    validation: Validation,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact: a token is rejected the second after `exp`.
        validation.leeway = 0;

        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            access_ttl: config.access_token_expiry,
            refresh_ttl: config.refresh_token_expiry,
            validation,
        }
    }

    pub fn issue_access_token(
        &self,
        user_id: i32,
        email: &str,
        role: Role,
    ) -> Result<IssuedToken, TokenError> {
        let (iat, expires_at) = lifetime(self.access_ttl)?;
        let claims = AccessClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            exp: expires_at.timestamp(),
            iat,
        };

        sign(&claims, &self.access_encoding, expires_at)
    }

    pub fn issue_refresh_token(&self, user_id: i32) -> Result<IssuedToken, TokenError> {
        let (iat, expires_at) = lifetime(self.refresh_ttl)?;
        let claims = RefreshClaims {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            exp: expires_at.timestamp(),
            iat,
        };

        sign(&claims, &self.refresh_encoding, expires_at)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.verify(token, &self.access_decoding)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        self.verify(token, &self.refresh_decoding)
    }

    fn verify<C: DeserializeOwned>(&self, token: &str, key: &DecodingKey) -> Result<C, TokenError> {
        decode::<C>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::InvalidSignature,
            })
    }
}

fn lifetime(ttl: i64) -> Result<(i64, DateTime<Utc>), TokenError> {
    let now = Utc::now();
    let delta = TimeDelta::try_seconds(ttl).ok_or(TokenError::InvalidLifetime(ttl))?;
    let expires_at = now
        .checked_add_signed(delta)
        .ok_or(TokenError::InvalidLifetime(ttl))?;
    Ok((now.timestamp(), expires_at))
}

fn sign<C: Serialize>(
    claims: &C,
    key: &EncodingKey,
    expires_at: DateTime<Utc>,
) -> Result<IssuedToken, TokenError> {
    let token = encode(&Header::new(Algorithm::HS256), claims, key).map_err(TokenError::Encoding)?;
    Ok(IssuedToken { token, expires_at })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            access_secret: "access-secret-for-unit-tests".to_string(),
            refresh_secret: "refresh-secret-for-unit-tests".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 604_800,
        }
    }

    #[test]
    fn access_token_round_trip() {
        let issuer = TokenIssuer::new(&config());
        let issued = issuer
            .issue_access_token(12, "prof@escuela.mx", Role::Teacher)
            .unwrap();

        let claims = issuer.verify_access_token(&issued.token).unwrap();
        assert_eq!(claims.user_id(), Some(12));
        assert_eq!(claims.email, "prof@escuela.mx");
        assert_eq!(claims.role, Role::Teacher);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn refresh_tokens_are_unique_per_issuance() {
        let issuer = TokenIssuer::new(&config());
        let first = issuer.issue_refresh_token(3).unwrap();
        let second = issuer.issue_refresh_token(3).unwrap();
        assert_ne!(first.token, second.token);
    }

    #[test]
    fn token_classes_do_not_cross_verify() {
        let issuer = TokenIssuer::new(&config());
        let access = issuer.issue_access_token(1, "a@b.mx", Role::Admin).unwrap();
        let refresh = issuer.issue_refresh_token(1).unwrap();

        assert!(matches!(
            issuer.verify_refresh_token(&access.token),
            Err(TokenError::InvalidSignature)
        ));
        assert!(matches!(
            issuer.verify_access_token(&refresh.token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn elapsed_token_reports_expired() {
        let mut expired = config();
        expired.access_token_expiry = -5;
        let issuer = TokenIssuer::new(&expired);
        let issued = issuer.issue_access_token(1, "a@b.mx", Role::Student).unwrap();

        assert!(matches!(
            issuer.verify_access_token(&issued.token),
            Err(TokenError::Expired)
        ));
        assert_eq!(issued.max_age_secs(), 0);
    }

    #[test]
    fn garbage_reports_invalid_signature() {
        let issuer = TokenIssuer::new(&config());
        assert!(matches!(
            issuer.verify_access_token("not.a.jwt"),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn absurd_lifetime_is_rejected() {
        let mut broken = config();
        broken.refresh_token_expiry = i64::MAX;
        let issuer = TokenIssuer::new(&broken);
        assert!(matches!(
            issuer.issue_refresh_token(1),
            Err(TokenError::InvalidLifetime(_))
        ));
    }
}
