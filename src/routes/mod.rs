//! API Routes
//!
//! Public endpoints used by the marketing site:
//! - `POST /api/inquiries` - submit an inquiry (rate limited per address)
//! - `POST /api/inquiries/check-limit` - advisory quota pre-check
//! - `GET /api/reviews?active=true` - review carousel
//! - `GET /api/get-ip`, `GET /api/health`
//!
//! Admin endpoints (bearer token from `POST /api/login`):
//! - `/api/inquiries`, `/api/inquiries/{id}`, `/api/statistics`
//! - `/api/reviews`, `/api/upload-image`, `/api/password`

pub mod admin;
pub mod health;
pub mod inquiries;
pub mod reviews;

use axum::Router;
use tower_http::trace::TraceLayer;
use crate::middleware::apply_cors;
use crate::models::AppState;
use tracing::info;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let server_config = state.config.server.clone();

    let router = Router::new()
        .merge(inquiries::router(state.clone()))
        .merge(reviews::router(state.clone()))
        .merge(admin::router(state.clone()))
        .merge(health::router(state))
        .layer(TraceLayer::new_for_http());

    apply_cors(router, &server_config)
}
