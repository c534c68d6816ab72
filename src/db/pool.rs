use std::time::{Duration, Instant};

use sqlx::postgres::PgPool;

/// Round-trip a trivial query and report how long it took.
pub async fn health_check(pool: &PgPool) -> anyhow::Result<Duration> {
    let started = Instant::now();
    sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await?;
    Ok(started.elapsed())
}
