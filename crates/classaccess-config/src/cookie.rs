//! Cookie delivery policy.
//!
//! Session tokens reach the client either as cookies or inside the JSON
//! body. When cookies are used, every attribute comes from this policy so
//! deployments can tune domain scope and same-site mode without code changes.

use std::env;
use std::str::FromStr;

use crate::{env_flag, env_or};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SameSitePolicy {
    None,
    Lax,
    Strict,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenDelivery {
    Cookie,
    Body,
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognized value `{0}`")]
pub struct UnrecognizedValue(String);

impl FromStr for SameSitePolicy {
    type Err = UnrecognizedValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(SameSitePolicy::None),
            "lax" => Ok(SameSitePolicy::Lax),
            "strict" => Ok(SameSitePolicy::Strict),
            _ => Err(UnrecognizedValue(s.to_string())),
        }
    }
}

impl FromStr for TokenDelivery {
    type Err = UnrecognizedValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cookie" | "cookies" => Ok(TokenDelivery::Cookie),
            "body" | "bearer" => Ok(TokenDelivery::Body),
            _ => Err(UnrecognizedValue(s.to_string())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CookieConfig {
    /// `None` keeps cookies host-only.
    pub domain: Option<String>,
    pub secure: bool,
    pub same_site: SameSitePolicy,
    /// Emit the client-readable `userData` cookie alongside the tokens.
    pub user_data: bool,
    pub delivery: TokenDelivery,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            domain: None,
            secure: true,
            same_site: SameSitePolicy::None,
            user_data: true,
            delivery: TokenDelivery::Cookie,
        }
    }
}

impl CookieConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            domain: env::var("COOKIE_DOMAIN")
                .ok()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            secure: env_flag("COOKIE_SECURE", defaults.secure),
            same_site: env_or("COOKIE_SAME_SITE", defaults.same_site),
            user_data: env_flag("COOKIE_USER_DATA", defaults.user_data),
            delivery: env_or("TOKEN_DELIVERY", defaults.delivery),
        };

        if config.same_site == SameSitePolicy::None && !config.secure {
            tracing::warn!("COOKIE_SAME_SITE=none without COOKIE_SECURE; browsers will drop the cookies");
        }

        config
    }

    pub fn uses_cookies(&self) -> bool {
        self.delivery == TokenDelivery::Cookie
    }
}
