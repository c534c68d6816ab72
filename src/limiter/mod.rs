//! Inquiry admission gate
//!
//! Decides whether a new inquiry from a network address is admitted, given a
//! rolling quota of `max_submissions` per `window` anchored to the address's
//! last submission. All quota state lives behind [`LimitStore`]; nothing is
//! kept in process memory between requests.
//!
//! Both operations degrade toward "admit": a failing store makes `check`
//! allow the submission and makes `record` a no-op.

pub mod store;

pub use store::*;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::LimitConfig;

pub const DEFAULT_MAX_SUBMISSIONS: i32 = 2;
pub const DEFAULT_WINDOW_HOURS: i64 = 24;

/// One row of `inquiry_limits`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct InquiryLimitRecord {
    pub id: i64,
    pub address: String,
    pub count: i32,
    pub first_submission_at: DateTime<Utc>,
    pub last_submission_at: DateTime<Utc>,
}

/// Result of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitDecision {
    pub allowed: bool,
    pub count: i32,
    pub hours_remaining: Option<i64>,
}

impl LimitDecision {
    pub fn allow(count: i32) -> Self {
        Self {
            allowed: true,
            count,
            hours_remaining: None,
        }
    }

    pub fn deny(count: i32, hours_remaining: i64) -> Self {
        Self {
            allowed: false,
            count,
            hours_remaining: Some(hours_remaining),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitPolicy {
    pub max_submissions: i32,
    pub window: Duration,
}

impl Default for LimitPolicy {
    fn default() -> Self {
        Self {
            max_submissions: DEFAULT_MAX_SUBMISSIONS,
            window: Duration::hours(DEFAULT_WINDOW_HOURS),
        }
    }
}

impl From<&LimitConfig> for LimitPolicy {
    fn from(config: &LimitConfig) -> Self {
        Self {
            max_submissions: config.max_submissions,
            window: Duration::hours(config.window_hours),
        }
    }
}

impl LimitPolicy {
    /// Earliest `last_submission_at` that still counts as active at `now`.
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.window
    }

    /// Decide admission from the record the store returned.
    ///
    /// The store already filtered on the window, but the elapsed time is
    /// recomputed here so a record the store considered active is never
    /// allowed to block past the window boundary.
    pub fn evaluate(&self, record: Option<&InquiryLimitRecord>, now: DateTime<Utc>) -> LimitDecision {
        let Some(record) = record else {
            return LimitDecision::allow(0);
        };

        if record.count < self.max_submissions {
            return LimitDecision::allow(record.count);
        }

        let elapsed = now - record.last_submission_at;
        let hours_elapsed = elapsed.num_milliseconds() as f64 / 3_600_000.0;
        let window_hours = self.window.num_milliseconds() as f64 / 3_600_000.0;

        if hours_elapsed < window_hours {
            let remaining = (window_hours - hours_elapsed).ceil() as i64;
            LimitDecision::deny(record.count, remaining)
        } else {
            LimitDecision::allow(record.count)
        }
    }
}

/// Admission gate over a shared [`LimitStore`].
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn LimitStore>,
    policy: LimitPolicy,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn LimitStore>, policy: LimitPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &LimitPolicy {
        &self.policy
    }

    pub async fn check(&self, address: &str) -> LimitDecision {
        self.check_at(address, Utc::now()).await
    }

    /// Admission check at an explicit instant. Never fails: a store error
    /// admits the submission.
    pub async fn check_at(&self, address: &str, now: DateTime<Utc>) -> LimitDecision {
        let since = self.policy.window_start(now);

        match self.store.find_active(address, since).await {
            Ok(record) => {
                let decision = self.policy.evaluate(record.as_ref(), now);
                debug!(
                    address,
                    allowed = decision.allowed,
                    count = decision.count,
                    "Admission check"
                );
                decision
            }
            Err(e) => {
                warn!(address, error = %e, "Limit lookup failed, admitting submission");
                LimitDecision::allow(0)
            }
        }
    }

    pub async fn record(&self, address: &str) {
        self.record_at(address, Utc::now()).await
    }

    /// Count an admitted submission at an explicit instant. Best effort: a
    /// store error is logged and swallowed.
    pub async fn record_at(&self, address: &str, now: DateTime<Utc>) {
        if let Err(e) = self.try_record(address, now).await {
            warn!(address, error = %e, "Failed to record inquiry submission");
        }
    }

    async fn try_record(&self, address: &str, now: DateTime<Utc>) -> anyhow::Result<()> {
        let since = self.policy.window_start(now);

        let count = self.store.upsert(address, now, since).await?;
        debug!(address, count, "Recorded inquiry submission");

        // Garbage collection only; failure here must not undo the count above
        match self.store.purge_before(since).await {
            Ok(0) => {}
            Ok(purged) => info!(purged, "Purged expired inquiry limit records"),
            Err(e) => warn!(error = %e, "Failed to purge expired inquiry limit records"),
        }

        Ok(())
    }
}
