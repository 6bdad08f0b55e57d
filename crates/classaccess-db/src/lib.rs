//! # ClassAccess DB
//!
//! Storage for the ClassAccess API.
//!
//! - [`init_db_pool`] builds the bounded PostgreSQL pool owned by `main`
//! - [`store`] defines the contracts the HTTP layer consumes
//! - [`postgres::PgStore`] implements them over SQLx
//! - `memory::MemoryStore` (feature `test-utils`) implements them in process
//!
//! # Example
//!
//! ```ignore
//! use classaccess_config::DatabaseConfig;
//! use classaccess_db::{PgStore, init_db_pool};
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()?).await?;
//! let store = PgStore::new(pool.clone());
//! // ... serve ...
//! pool.close().await;
//! ```

pub mod postgres;
pub mod store;

#[cfg(feature = "test-utils")]
pub mod memory;

use classaccess_config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;

pub use postgres::PgStore;
pub use sqlx::PgPool;
pub use store::{
    AttendanceStore, ClassroomStore, CredentialStore, DeviceStore, Store, UserDirectory,
};

#[cfg(feature = "test-utils")]
pub use memory::MemoryStore;

/// Builds the connection pool. Requests beyond `max_connections` wait up to
/// `acquire_timeout` and then fail with a pool timeout.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .connect(&config.url)
        .await
}
