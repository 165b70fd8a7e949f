//! Strategy and industry listings

use axum::Json;
use ota_common::industry::{Industry, IndustryProfile};
use ota_common::MatchType;
use serde::Serialize;

/// One reconciliation strategy as advertised to clients
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyInfo {
    pub match_type: MatchType,
    pub confidence: u8,
    /// 1 runs first
    pub priority: usize,
    pub enabled_by_default: bool,
}

/// GET /api/strategies
pub async fn list_strategies() -> Json<Vec<StrategyInfo>> {
    let strategies = MatchType::STRATEGIES
        .iter()
        .enumerate()
        .map(|(i, &match_type)| StrategyInfo {
            match_type,
            confidence: match_type.confidence(),
            priority: i + 1,
            enabled_by_default: match_type.enabled_by_default(),
        })
        .collect();
    Json(strategies)
}

/// GET /api/industries
pub async fn list_industries() -> Json<Vec<&'static IndustryProfile>> {
    Json(Industry::ALL.iter().map(|i| i.profile()).collect())
}
