use std::env;

use crate::env_or;

pub const DEFAULT_ACCESS_SECRET: &str = "classaccess-access-secret-change-me";
pub const DEFAULT_REFRESH_SECRET: &str = "classaccess-refresh-secret-change-me";

/// Access and refresh tokens are signed with separate secrets.
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    /// Seconds.
    pub access_token_expiry: i64,
    /// Seconds.
    pub refresh_token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let config = Self {
            access_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| DEFAULT_ACCESS_SECRET.to_string()),
            refresh_secret: env::var("JWT_REFRESH_SECRET")
                .unwrap_or_else(|_| DEFAULT_REFRESH_SECRET.to_string()),
            access_token_expiry: env_or("JWT_ACCESS_EXPIRY", 86_400), // 24 hours
            refresh_token_expiry: env_or("JWT_REFRESH_EXPIRY", 604_800), // 7 days
        };

        if config.access_secret == DEFAULT_ACCESS_SECRET
            || config.refresh_secret == DEFAULT_REFRESH_SECRET
        {
            tracing::warn!("JWT secrets are using built-in defaults; set JWT_SECRET and JWT_REFRESH_SECRET");
        }
        if config.secrets_are_shared() {
            tracing::warn!("JWT_SECRET and JWT_REFRESH_SECRET are identical");
        }

        config
    }

    pub fn secrets_are_shared(&self) -> bool {
        self.access_secret == self.refresh_secret
    }
}
