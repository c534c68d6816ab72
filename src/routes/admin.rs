//! Admin login and password management
//!
//! - POST /api/login - exchange the admin password for a session token
//! - POST /api/password - change the admin password (requires a session)

use axum::{
    Router,
    routing::post,
    Json,
    extract::{rejection::JsonRejection, State},
};
use tracing::{info, warn};

use crate::credentials::{hash_password, verify_password};
use crate::db::DatabaseOperations;
use crate::middleware::{issue_token, AdminSession};
use crate::models::{AppState, ChangePasswordRequest, LoginRequest, LoginResponse};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/password", post(change_password))
        .with_state(state)
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Stored digest, seeding the configured initial password on first use.
async fn current_password_hash(state: &AppState) -> AppResult<String> {
    if let Some(hash) = DatabaseOperations::get_admin_password_hash(&state.pool).await? {
        return Ok(hash);
    }

    info!("No admin password stored, seeding the initial password");
    let hash = hash_password(&state.config.auth.initial_admin_password)?;
    DatabaseOperations::set_admin_password_hash(&state.pool, &hash).await?;
    Ok(hash)
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let Json(request) = payload?;
    let password = required(request.password)
        .ok_or_else(|| AppError::InvalidRequest("Password is required".to_string()))?;

    let stored = current_password_hash(&state).await?;
    if !verify_password(&password, &stored) {
        warn!("Admin login failed");
        return Err(AppError::Auth("Incorrect password".to_string()));
    }

    let token = issue_token(&state.config.auth)?;
    info!("Admin logged in");

    Ok(Json(LoginResponse {
        success: true,
        token,
        expires_in: state.config.auth.token_ttl_secs,
    }))
}

async fn change_password(
    _admin: AdminSession,
    State(state): State<AppState>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> AppResult<Json<serde_json::Value>> {
    let Json(request) = payload?;
    let (Some(current), Some(new)) = (required(request.current_password), required(request.new_password)) else {
        return Err(AppError::InvalidRequest(
            "Both the current and the new password are required".to_string(),
        ));
    };

    let message = match DatabaseOperations::get_admin_password_hash(&state.pool).await? {
        None => "Password set",
        Some(stored) if verify_password(&current, &stored) => "Password changed",
        Some(_) => {
            warn!("Admin password change rejected");
            return Err(AppError::Auth("Current password is incorrect".to_string()));
        }
    };

    let hash = hash_password(&new)?;
    DatabaseOperations::set_admin_password_hash(&state.pool, &hash).await?;
    info!("Admin password updated");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": message,
    })))
}
