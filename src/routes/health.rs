use axum::{Router, routing::get, Json, extract::State};
use tracing::{debug, warn};

use crate::db::health_check;
use crate::middleware::{ClientAddress, UNKNOWN_ADDRESS};
use crate::models::{AppState, HealthResponse};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/get-ip", get(get_ip))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match health_check(&state.pool).await {
        Ok(latency) => {
            debug!(latency_ms = latency.as_millis() as u64, "Database health check");
            "connected"
        }
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            "unavailable"
        }
    };

    let response = HealthResponse {
        status: if database == "connected" { "ok" } else { "degraded" }.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        database: database.to_string(),
        storage: if state.storage.is_some() { "configured" } else { "disabled" }.to_string(),
    };

    Json(response)
}

/// GET /api/get-ip - the address the admission gate will see
async fn get_ip(client: ClientAddress) -> Json<serde_json::Value> {
    let ip = client.0.unwrap_or_else(|| UNKNOWN_ADDRESS.to_string());
    Json(serde_json::json!({ "ip": ip }))
}
