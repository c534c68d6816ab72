use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::Mutex;

use super::InquiryLimitRecord;

/// Persistence for per-address submission windows.
#[async_trait]
pub trait LimitStore: Send + Sync {
    /// Most recent record for `address` whose last submission is after `since`.
    async fn find_active(&self, address: &str, since: DateTime<Utc>) -> Result<Option<InquiryLimitRecord>>;

    /// Count one submission for `address` at `now` and return the new count.
    ///
    /// A record whose last submission is after `since` is incremented. A
    /// missing or stale record is (re)started with a count of one. There is at
    /// most one record per address.
    async fn upsert(&self, address: &str, now: DateTime<Utc>, since: DateTime<Utc>) -> Result<i32>;

    /// Delete every record whose last submission is before `cutoff`.
    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}

pub struct PgLimitStore {
    pool: PgPool,
}

impl PgLimitStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LimitStore for PgLimitStore {
    async fn find_active(&self, address: &str, since: DateTime<Utc>) -> Result<Option<InquiryLimitRecord>> {
        let record = sqlx::query_as::<_, InquiryLimitRecord>(
            r#"
            SELECT id, address, count, first_submission_at, last_submission_at
            FROM inquiry_limits
            WHERE address = $1
              AND last_submission_at > $2
            ORDER BY last_submission_at DESC
            LIMIT 1
            "#,
        )
        .bind(address)
        .bind(since)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn upsert(&self, address: &str, now: DateTime<Utc>, since: DateTime<Utc>) -> Result<i32> {
        let count = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO inquiry_limits (address, count, first_submission_at, last_submission_at)
            VALUES ($1, 1, $2, $2)
            ON CONFLICT (address) DO UPDATE
            SET count = CASE
                    WHEN inquiry_limits.last_submission_at > $3 THEN inquiry_limits.count + 1
                    ELSE 1
                END,
                first_submission_at = CASE
                    WHEN inquiry_limits.last_submission_at > $3 THEN inquiry_limits.first_submission_at
                    ELSE EXCLUDED.first_submission_at
                END,
                last_submission_at = EXCLUDED.last_submission_at
            RETURNING count
            "#,
        )
        .bind(address)
        .bind(now)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM inquiry_limits WHERE last_submission_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// In-memory store with the same semantics as the Postgres table, for tests.
#[derive(Default, Clone)]
pub struct MemoryLimitStore {
    records: Arc<Mutex<Vec<InquiryLimitRecord>>>,
}

impl MemoryLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Vec<InquiryLimitRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl LimitStore for MemoryLimitStore {
    async fn find_active(&self, address: &str, since: DateTime<Utc>) -> Result<Option<InquiryLimitRecord>> {
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .filter(|r| r.address == address && r.last_submission_at > since)
            .max_by_key(|r| r.last_submission_at)
            .cloned())
    }

    async fn upsert(&self, address: &str, now: DateTime<Utc>, since: DateTime<Utc>) -> Result<i32> {
        let mut records = self.records.lock().await;

        if let Some(record) = records.iter_mut().find(|r| r.address == address) {
            if record.last_submission_at > since {
                record.count += 1;
            } else {
                record.count = 1;
                record.first_submission_at = now;
            }
            record.last_submission_at = now;
            return Ok(record.count);
        }

        let id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        records.push(InquiryLimitRecord {
            id,
            address: address.to_string(),
            count: 1,
            first_submission_at: now,
            last_submission_at: now,
        });
        Ok(1)
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| r.last_submission_at >= cutoff);
        Ok((before - records.len()) as u64)
    }
}

#[cfg(test)]
pub(crate) struct FailingLimitStore;

#[cfg(test)]
#[async_trait]
impl LimitStore for FailingLimitStore {
    async fn find_active(&self, _address: &str, _since: DateTime<Utc>) -> Result<Option<InquiryLimitRecord>> {
        Err(anyhow::anyhow!("connection refused"))
    }

    async fn upsert(&self, _address: &str, _now: DateTime<Utc>, _since: DateTime<Utc>) -> Result<i32> {
        Err(anyhow::anyhow!("connection refused"))
    }

    async fn purge_before(&self, _cutoff: DateTime<Utc>) -> Result<u64> {
        Err(anyhow::anyhow!("connection refused"))
    }
}
