use axum::{
    Router,
    routing::{get, patch, post},
    Json,
    extract::{rejection::JsonRejection, Path, State},
};
use serde::Serialize;
use tracing::{info, warn};

use crate::db::DatabaseOperations;
use crate::limiter::LimitDecision;
use crate::middleware::{AdminSession, ClientAddress};
use crate::models::{
    AppState, CheckLimitRequest, CreateInquiryRequest, Inquiry, InquiryStatistics, InquiryStatus,
    UpdateInquiryRequest,
};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/inquiries", get(list_inquiries).post(create_inquiry))
        .route("/api/inquiries/check-limit", post(check_limit))
        .route("/api/inquiries/{id}", patch(update_inquiry).delete(delete_inquiry))
        .route("/api/inquiries/{id}/advance", post(advance_inquiry))
        .route("/api/statistics", get(statistics))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct CheckLimitResponse {
    success: bool,
    #[serde(flatten)]
    decision: LimitDecision,
}

/// POST /api/inquiries/check-limit - advisory pre-check for the public form
async fn check_limit(
    State(state): State<AppState>,
    client: ClientAddress,
    payload: Result<Json<CheckLimitRequest>, JsonRejection>,
) -> AppResult<Json<CheckLimitResponse>> {
    // The body is optional; the address usually comes from the connection
    let body = payload.map(|Json(body)| body).unwrap_or_default();

    let address = client
        .or_reported(body.address.as_deref())
        .ok_or_else(|| AppError::InvalidRequest("Could not determine client address".to_string()))?;

    let decision = state.limiter.check(&address).await;

    Ok(Json(CheckLimitResponse {
        success: true,
        decision,
    }))
}

/// POST /api/inquiries - public submission, gated by the rate limiter
async fn create_inquiry(
    State(state): State<AppState>,
    client: ClientAddress,
    payload: Result<Json<CreateInquiryRequest>, JsonRejection>,
) -> AppResult<Json<serde_json::Value>> {
    let Json(request) = payload?;
    let address = client.or_reported(request.address.as_deref());
    let inquiry = request.into_new_inquiry()?;

    match address.as_deref() {
        Some(address) => {
            let decision = state.limiter.check(address).await;
            if !decision.allowed {
                warn!(address, count = decision.count, "Inquiry rejected by rate limit");
                return Err(AppError::RateLimited {
                    hours_remaining: decision.hours_remaining,
                });
            }
        }
        None => warn!("Submitter address unknown, admitting inquiry without quota"),
    }

    let id = DatabaseOperations::create_inquiry(&state.pool, &inquiry).await?;

    if let Some(address) = address.as_deref() {
        state.limiter.record(address).await;
    }

    info!(id, "Inquiry created");

    Ok(Json(serde_json::json!({
        "success": true,
        "id": id,
    })))
}

/// GET /api/inquiries - all inquiries, newest first
async fn list_inquiries(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let inquiries: Vec<Inquiry> = DatabaseOperations::list_inquiries(&state.pool).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "inquiries": inquiries,
    })))
}

/// PATCH /api/inquiries/{id} - set status and/or memo
async fn update_inquiry(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateInquiryRequest>, JsonRejection>,
) -> AppResult<Json<serde_json::Value>> {
    let Json(request) = payload?;

    if request.status.is_none() && request.memo.is_none() {
        return Err(AppError::InvalidRequest("Nothing to update".to_string()));
    }

    let status = request
        .status
        .as_deref()
        .map(str::parse::<InquiryStatus>)
        .transpose()
        .map_err(|_| AppError::InvalidRequest("Invalid status value".to_string()))?;

    let updated =
        DatabaseOperations::update_inquiry(&state.pool, id, status, request.memo.as_deref()).await?;
    if !updated {
        return Err(AppError::NotFound(format!("Inquiry {} not found", id)));
    }

    info!(id, status = ?status, "Inquiry updated");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Inquiry updated",
    })))
}

/// POST /api/inquiries/{id}/advance - move to the next status in the cycle
async fn advance_inquiry(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    let current = DatabaseOperations::get_inquiry_status(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Inquiry {} not found", id)))?;

    let next = current.next();
    if !DatabaseOperations::update_inquiry(&state.pool, id, Some(next), None).await? {
        return Err(AppError::NotFound(format!("Inquiry {} not found", id)));
    }

    info!(id, from = %current, to = %next, "Inquiry status advanced");

    Ok(Json(serde_json::json!({
        "success": true,
        "status": next,
    })))
}

/// DELETE /api/inquiries/{id}
async fn delete_inquiry(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    if !DatabaseOperations::delete_inquiry(&state.pool, id).await? {
        return Err(AppError::NotFound(format!("Inquiry {} not found", id)));
    }

    info!(id, "Inquiry deleted");

    Ok(Json(serde_json::json!({ "success": true })))
}

#[derive(Debug, Serialize)]
struct StatisticsResponse {
    success: bool,
    #[serde(flatten)]
    statistics: InquiryStatistics,
}

/// GET /api/statistics - dashboard counters
async fn statistics(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> AppResult<Json<StatisticsResponse>> {
    let statistics = DatabaseOperations::inquiry_statistics(&state.pool).await?;

    Ok(Json(StatisticsResponse {
        success: true,
        statistics,
    }))
}
