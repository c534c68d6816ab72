use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use crate::config::DatabaseConfig;
use anyhow::Result;

pub use operations::*;
pub use pool::*;

pub mod pool;
pub mod operations;

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = pool_options(config)
        .connect(&config.url)
        .await?;

    let latency = health_check(&pool).await?;
    tracing::info!(latency_ms = latency.as_millis() as u64, "Database connection established");

    Ok(pool)
}

/// A pool that connects on first use. Startup does not depend on the
/// database being reachable.
pub fn create_lazy_pool(config: &DatabaseConfig) -> Result<PgPool> {
    Ok(pool_options(config).connect_lazy(&config.url)?)
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    // A short acquire timeout keeps fail-open paths fast when the store is down
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
}
