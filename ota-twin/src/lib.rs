//! ota-twin library - OT Assurance Twin HTTP service
//!
//! Serves CSV ingest, record reconciliation, and security-tier
//! classification from `ota-common` over a JSON API.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use ota_common::config::ServiceConfig;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod cli;
pub mod error;
pub mod extract;

pub use error::{ApiError, ApiResult};
pub use extract::ApiJson;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved service configuration (read-only after startup)
    pub config: Arc<ServiceConfig>,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config: Arc::new(config),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/api/buildinfo", get(api::get_build_info))
        .route("/api/strategies", get(api::list_strategies))
        .route("/api/industries", get(api::list_industries))
        .route("/api/normalize", post(api::normalize_csv))
        .route("/api/classify", post(api::classify_csv))
        .route("/api/analyze", post(api::analyze))
        .merge(api::health_routes())
        .fallback(api::not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
