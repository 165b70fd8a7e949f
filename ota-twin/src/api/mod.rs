//! HTTP API handlers for ota-twin

pub mod analyze;
pub mod buildinfo;
pub mod catalog;
pub mod health;
pub mod records;

use axum::http::Uri;
use ota_common::industry::Industry;

use crate::error::{ApiError, ApiResult};

pub use analyze::analyze;
pub use buildinfo::get_build_info;
pub use catalog::{list_industries, list_strategies};
pub use health::health_routes;
pub use records::{classify_csv, normalize_csv};

/// Fallback for unmatched routes
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}

/// Absent or blank selects the generic profile
fn parse_industry(raw: Option<&str>) -> ApiResult<Industry> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(name) => Ok(name.parse()?),
        None => Ok(Industry::default()),
    }
}
