//! Full inventory analysis
//!
//! Loads the engineering baseline and every discovery source, merges and
//! deduplicates discovery, reconciles, then scores the result against the
//! requested industry profile.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use ota_common::classify::TierClassifier;
use ota_common::dedup::dedup_records;
use ota_common::industry::Industry;
use ota_common::ingest::load_records;
use ota_common::metrics::{build_report, AssetAssessment, Metrics, MetricsConfig};
use ota_common::{AssetRecord, MatchCandidate, MatchType, Reconciler};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::parse_industry;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::AppState;

pub const ENGINEERING_SOURCE: &str = "engineering";
pub const OT_DISCOVERY_SOURCE: &str = "ot_discovery";

/// Extra discovery export appended after `otDiscoveryCsv`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCsv {
    pub source_id: String,
    pub csv: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Missing is treated like empty and rejected by the reconciler
    #[serde(default)]
    pub engineering_csv: String,
    pub ot_discovery_csv: Option<String>,
    #[serde(default)]
    pub additional_sources: Vec<SourceCsv>,
    pub industry: Option<String>,
    pub threshold_months: Option<u32>,
    /// Enabled strategy names; defaults apply when absent
    pub strategies: Option<Vec<String>>,
    #[serde(default)]
    pub synthetic_fill: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub analysis_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub industry: Industry,
    /// Strategies that ran, in order
    pub strategies: Vec<MatchType>,
    pub matched: Vec<MatchCandidate>,
    pub blind_spots: Vec<AssetRecord>,
    pub orphans: Vec<AssetRecord>,
    pub coverage_percentage: u32,
    pub assessments: Vec<AssetAssessment>,
    pub metrics: Metrics,
    pub duplicates_removed: usize,
}

/// POST /api/analyze
pub async fn analyze(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AnalyzeRequest>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let industry = parse_industry(request.industry.as_deref())?;
    let reconciler = build_reconciler(request.strategies.as_deref(), request.synthetic_fill)?;

    let engineering = load_records(&request.engineering_csv, ENGINEERING_SOURCE)?;
    let discovery = load_discovery(&request)?;
    let merged = dedup_records(discovery);
    debug!(
        discovery = merged.records.len(),
        duplicates = merged.removed,
        "Merged discovery sources"
    );

    let result = reconciler.reconcile(&engineering, &merged.records)?;

    let profile = industry.profile();
    let classifier = TierClassifier::for_industry(profile);
    let metrics_config = MetricsConfig {
        weights: state.config.scoring.clone(),
        high_risk_threshold: state.config.high_risk_threshold,
        stale_threshold_months: request
            .threshold_months
            .unwrap_or(state.config.default_threshold_months),
        reference_date: Utc::now().date_naive(),
    };
    let report = build_report(
        &engineering,
        merged.records.len(),
        &result,
        &classifier,
        profile,
        &metrics_config,
    );

    let analysis_id = Uuid::new_v4();
    info!(
        %analysis_id,
        %industry,
        engineering = engineering.len(),
        discovery = merged.records.len(),
        matched = result.matched.len(),
        coverage = result.coverage_percentage,
        "Analysis complete"
    );

    Ok(Json(AnalyzeResponse {
        analysis_id,
        generated_at: Utc::now(),
        industry,
        strategies: reconciler.strategies().to_vec(),
        matched: result.matched,
        blind_spots: result.blind_spots,
        orphans: result.orphans,
        coverage_percentage: result.coverage_percentage,
        assessments: report.assessments,
        metrics: report.metrics,
        duplicates_removed: merged.removed,
    }))
}

/// Reconciler for the requested strategy names
///
/// Names parse case-insensitively (`ip-match` and `IP_MATCH` both work).
/// An explicit empty list is rejected rather than silently matching nothing.
pub fn build_reconciler(names: Option<&[String]>, synthetic_fill: bool) -> ApiResult<Reconciler> {
    let reconciler = match names {
        None => Reconciler::new(),
        Some([]) => {
            return Err(ApiError::BadRequest(
                "strategies must name at least one match strategy".to_string(),
            ))
        }
        Some(names) => {
            let parsed = names
                .iter()
                .map(|name| name.parse::<MatchType>())
                .collect::<ota_common::Result<Vec<_>>>()?;
            Reconciler::with_strategies(parsed)?
        }
    };

    Ok(if synthetic_fill {
        reconciler.with_synthetic_fill()
    } else {
        reconciler
    })
}

fn load_discovery(request: &AnalyzeRequest) -> ApiResult<Vec<AssetRecord>> {
    let mut discovery = Vec::new();

    if let Some(csv) = &request.ot_discovery_csv {
        discovery.extend(load_records(csv, OT_DISCOVERY_SOURCE)?);
    }

    for source in &request.additional_sources {
        let source_id = source.source_id.trim();
        if source_id.is_empty() {
            return Err(ApiError::BadRequest(
                "additionalSources entries need a non-empty sourceId".to_string(),
            ));
        }
        discovery.extend(load_records(&source.csv, source_id)?);
    }

    Ok(discovery)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_reconciler_when_no_names() {
        let reconciler = build_reconciler(None, false).unwrap();
        assert_eq!(reconciler.strategies(), MatchType::default_strategies().as_slice());
    }

    #[test]
    fn test_names_run_in_priority_order() {
        let list = names(&["mac_match", "IP-MATCH", "exact_tag_id"]);
        let reconciler = build_reconciler(Some(&list), false).unwrap();
        assert_eq!(
            reconciler.strategies(),
            &[MatchType::ExactTagId, MatchType::IpMatch, MatchType::MacMatch]
        );
    }

    #[test]
    fn test_synthetic_fill_appends_pairing() {
        let reconciler = build_reconciler(None, true).unwrap();
        assert_eq!(reconciler.strategies().last(), Some(&MatchType::IntelligentPairing));
    }

    #[test]
    fn test_unknown_and_empty_names_rejected() {
        let list = names(&["exact_tag_id", "telepathy"]);
        assert!(matches!(
            build_reconciler(Some(&list), false),
            Err(ApiError::Common(ota_common::Error::InvalidInput(_)))
        ));
        assert!(matches!(
            build_reconciler(Some(&[]), false),
            Err(ApiError::BadRequest(_))
        ));
        let list = names(&["none"]);
        assert!(build_reconciler(Some(&list), false).is_err());
    }
}
