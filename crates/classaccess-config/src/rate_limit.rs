//! Per-client request limits.
//!
//! Limits use a token bucket keyed by client IP. The IP comes from
//! `X-Forwarded-For`, `X-Real-IP` or `Forwarded` when a proxy sets them, and
//! from the socket peer address otherwise.
//!
//! - `RATE_LIMIT_ENABLED`: default true
//! - `RATE_LIMIT_GENERAL_PER_SECOND`: seconds to replenish one request on `/api` (default 2)
//! - `RATE_LIMIT_GENERAL_BURST_SIZE`: bucket size on `/api` (default 30)
//! - `RATE_LIMIT_AUTH_PER_SECOND`: seconds to replenish one login attempt (default 10)
//! - `RATE_LIMIT_AUTH_BURST_SIZE`: bucket size on `/api/auth/login` (default 5)

use std::sync::Arc;

use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::SmartIpKeyExtractor;

use crate::{env_flag, env_or};

pub type IpGovernorConfig = GovernorConfig<SmartIpKeyExtractor, ::governor::middleware::NoOpMiddleware>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub general_per_second: u64,
    pub general_burst_size: u32,
    /// Stricter bucket for the login endpoint.
    pub auth_per_second: u64,
    pub auth_burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            general_per_second: 2,
            general_burst_size: 30,
            auth_per_second: 10,
            auth_burst_size: 5,
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_flag("RATE_LIMIT_ENABLED", defaults.enabled),
            general_per_second: env_or("RATE_LIMIT_GENERAL_PER_SECOND", defaults.general_per_second),
            general_burst_size: env_or("RATE_LIMIT_GENERAL_BURST_SIZE", defaults.general_burst_size),
            auth_per_second: env_or("RATE_LIMIT_AUTH_PER_SECOND", defaults.auth_per_second),
            auth_burst_size: env_or("RATE_LIMIT_AUTH_BURST_SIZE", defaults.auth_burst_size),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// `None` when limiting is off.
    pub fn general_governor_config(&self) -> Option<Arc<IpGovernorConfig>> {
        self.governor("general", self.general_per_second, self.general_burst_size)
    }

    /// `None` when limiting is off.
    pub fn auth_governor_config(&self) -> Option<Arc<IpGovernorConfig>> {
        self.governor("auth", self.auth_per_second, self.auth_burst_size)
    }

    fn governor(&self, scope: &str, per_second: u64, burst_size: u32) -> Option<Arc<IpGovernorConfig>> {
        if !self.enabled {
            return None;
        }

        let config = GovernorConfigBuilder::default()
            .per_second(per_second)
            .burst_size(burst_size)
            .key_extractor(SmartIpKeyExtractor)
            .finish();

        if config.is_none() {
            tracing::warn!(scope, per_second, burst_size, "Rate limit values must be non-zero; limiter disabled");
        }
        config.map(Arc::new)
    }
}
