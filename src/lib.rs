// carplatform - inquiry and review API for the car lease marketing site

pub mod config;
pub mod credentials;
pub mod db;
pub mod limiter;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod storage;
pub mod types;
pub mod utils;
pub mod validation;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
