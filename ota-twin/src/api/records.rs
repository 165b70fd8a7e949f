//! Single-file endpoints: normalize or classify one uploaded CSV

use axum::Json;
use ota_common::classify::{SecurityClassification, TierClassifier};
use ota_common::industry::Industry;
use ota_common::ingest::load_records;
use ota_common::AssetRecord;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::parse_industry;
use crate::error::ApiResult;
use crate::extract::ApiJson;

/// Source id used when an upload does not name one
pub const DEFAULT_UPLOAD_SOURCE: &str = "upload";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeRequest {
    #[serde(default)]
    pub csv: String,
    pub source_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeResponse {
    pub source_id: String,
    pub count: usize,
    pub records: Vec<AssetRecord>,
}

/// POST /api/normalize
pub async fn normalize_csv(ApiJson(request): ApiJson<NormalizeRequest>) -> ApiResult<Json<NormalizeResponse>> {
    let source_id = upload_source(request.source_id);
    let records = load_records(&request.csv, &source_id)?;

    info!(source = %source_id, count = records.len(), "Normalized upload");

    Ok(Json(NormalizeResponse {
        source_id,
        count: records.len(),
        records,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyRequest {
    #[serde(default)]
    pub csv: String,
    pub source_id: Option<String>,
    pub industry: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedAsset {
    pub record: AssetRecord,
    pub classification: SecurityClassification,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierCounts {
    pub tier1: usize,
    pub tier2: usize,
    pub tier3: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyResponse {
    pub industry: Industry,
    pub count: usize,
    pub tier_counts: TierCounts,
    pub assets: Vec<ClassifiedAsset>,
}

/// POST /api/classify
pub async fn classify_csv(ApiJson(request): ApiJson<ClassifyRequest>) -> ApiResult<Json<ClassifyResponse>> {
    let industry = parse_industry(request.industry.as_deref())?;
    let source_id = upload_source(request.source_id);
    let records = load_records(&request.csv, &source_id)?;
    let classifier = TierClassifier::for_industry(industry.profile());

    let mut tier_counts = TierCounts::default();
    let assets: Vec<ClassifiedAsset> = records
        .into_iter()
        .map(|record| {
            let classification = classifier.classify(&record);
            match classification.tier {
                1 => tier_counts.tier1 += 1,
                2 => tier_counts.tier2 += 1,
                _ => tier_counts.tier3 += 1,
            }
            ClassifiedAsset {
                record,
                classification,
            }
        })
        .collect();

    info!(
        source = %source_id,
        %industry,
        count = assets.len(),
        tier1 = tier_counts.tier1,
        "Classified upload"
    );

    Ok(Json(ClassifyResponse {
        industry,
        count: assets.len(),
        tier_counts,
        assets,
    }))
}

fn upload_source(source_id: Option<String>) -> String {
    source_id
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_UPLOAD_SOURCE.to_string())
}
