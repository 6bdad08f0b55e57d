//! # ClassAccess Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: token secrets and lifetimes
//! - [`cookie`]: cookie delivery policy for session tokens
//! - [`cors`]: allowed origins
//! - [`database`]: connection pool bounds
//! - [`rate_limit`]: per-client request limits
//! - [`server`]: bind address, environment and logging

pub mod cookie;
pub mod cors;
pub mod database;
pub mod jwt;
pub mod rate_limit;
pub mod server;

use std::env;
use std::str::FromStr;

pub use cookie::{CookieConfig, SameSitePolicy, TokenDelivery};
pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use jwt::JwtConfig;
pub use rate_limit::{IpGovernorConfig, RateLimitConfig};
pub use server::{Environment, ServerConfig};

/// Reads and parses `key`, falling back to `default` when unset or unparsable.
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

pub(crate) fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => !matches!(value.trim().to_lowercase().as_str(), "false" | "0" | "no" | "off"),
        Err(_) => default,
    }
}
