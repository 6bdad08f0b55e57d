//! Database connection settings.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DB_MAX_CONNECTIONS`: pool upper bound (default 20)
//! - `DB_ACQUIRE_TIMEOUT_SECS`: how long a request waits for a connection (default 2)
//! - `DB_IDLE_TIMEOUT_SECS`: idle connection lifetime (default 30)

use std::env;
use std::time::Duration;

use anyhow::Context;

use crate::env_or;

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl DatabaseConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        Ok(Self {
            url,
            max_connections: env_or("DB_MAX_CONNECTIONS", 20),
            acquire_timeout: Duration::from_secs(env_or("DB_ACQUIRE_TIMEOUT_SECS", 2)),
            idle_timeout: Duration::from_secs(env_or("DB_IDLE_TIMEOUT_SECS", 30)),
        })
    }
}
