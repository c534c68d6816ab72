use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::config::Config;
use crate::limiter::{LimitPolicy, LimitStore, RateLimiter};
use crate::storage::Storage;
use crate::utils::format_kst;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub limiter: RateLimiter,
    /// `None` when no bucket is configured.
    pub storage: Option<Arc<Storage>>,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        config: Config,
        limit_store: Arc<dyn LimitStore>,
        storage: Option<Arc<Storage>>,
    ) -> Self {
        let limiter = RateLimiter::new(limit_store, LimitPolicy::from(&config.limits));
        Self {
            pool,
            config,
            limiter,
            storage,
        }
    }
}

// Inquiries

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InquiryStatus {
    New,
    Processing,
    Completed,
}

impl InquiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InquiryStatus::New => "new",
            InquiryStatus::Processing => "processing",
            InquiryStatus::Completed => "completed",
        }
    }

    /// Next status in the admin workflow; `Completed` wraps around to `New`.
    pub fn next(self) -> Self {
        match self {
            InquiryStatus::New => InquiryStatus::Processing,
            InquiryStatus::Processing => InquiryStatus::Completed,
            InquiryStatus::Completed => InquiryStatus::New,
        }
    }

    /// Stored values predate the enum; anything unrecognized reads as `New`.
    pub fn from_stored(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or(InquiryStatus::New)
    }
}

impl std::fmt::Display for InquiryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InquiryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(InquiryStatus::New),
            "processing" => Ok(InquiryStatus::Processing),
            "completed" => Ok(InquiryStatus::Completed),
            other => Err(format!("Unknown inquiry status: {}", other)),
        }
    }
}

/// Row shape of `inquiries`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InquiryRow {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub affiliation: Option<String>,
    pub vehicle_type: Option<String>,
    pub car_name: Option<String>,
    pub status: Option<String>,
    pub memo: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Inquiry {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub affiliation: Option<String>,
    pub vehicle_type: Option<String>,
    pub car_name: Option<String>,
    pub status: InquiryStatus,
    pub memo: Option<String>,
    pub created_at: DateTime<Utc>,
    /// `created_at` in UTC+9 for the dashboard.
    pub created_at_kst: String,
}

impl From<InquiryRow> for Inquiry {
    fn from(row: InquiryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            phone: row.phone,
            affiliation: row.affiliation,
            vehicle_type: row.vehicle_type,
            car_name: row.car_name,
            status: InquiryStatus::from_stored(row.status.as_deref()),
            memo: row.memo,
            created_at: row.created_at,
            created_at_kst: format_kst(row.created_at),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInquiryRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub affiliation: Option<String>,
    pub vehicle_type: Option<String>,
    pub car_name: Option<String>,
    #[serde(alias = "ip")]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInquiryRequest {
    pub status: Option<String>,
    pub memo: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckLimitRequest {
    #[serde(alias = "ip")]
    pub address: Option<String>,
}

// Reviews

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: i64,
    pub image_url: String,
    pub title: Option<String>,
    pub text_content: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveReviewRequest {
    pub id: Option<i64>,
    pub image_url: Option<String>,
    pub title: Option<String>,
    pub text_content: Option<String>,
    pub display_order: Option<i32>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReviewListQuery {
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReviewIdQuery {
    pub id: Option<i64>,
}

// Statistics

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CategoryCount {
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryStatistics {
    pub total: i64,
    pub new: i64,
    pub processing: i64,
    pub completed: i64,
    pub affiliation: Vec<CategoryCount>,
    pub vehicle_type: Vec<CategoryCount>,
}

// Admin

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub database: String,
    pub storage: String,
}
