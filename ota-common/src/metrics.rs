//! Coverage and risk metrics
//!
//! Aggregates one reconciliation run into per-asset assessments and
//! inventory-wide numbers: counts, tier coverage, per-unit coverage, risk
//! scores, and stale network observations.
//!
//! Risk scores are weighted sums with configurable, uncalibrated weights.
//! They rank assets for attention; they are not probabilities.

use std::collections::BTreeMap;

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::classify::{SecurityClassification, TierClassifier};
use crate::industry::IndustryProfile;
use crate::model::{coverage_percentage, AssetRecord, MatchCandidate, MatchType, ReconciliationResult};

/// Weights for the per-asset risk score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub tier1_base: u32,
    pub tier2_base: u32,
    pub tier3_base: u32,
    /// Added for Tier 1/2 assets without security patches
    pub unpatched: u32,
    /// Added for Tier 1/2 assets not behind a firewall
    pub no_firewall: u32,
    /// Added for any asset no discovery tool sees
    pub unmonitored: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            tier1_base: 40,
            tier2_base: 25,
            tier3_base: 5,
            unpatched: 20,
            no_firewall: 20,
            unmonitored: 20,
        }
    }
}

impl ScoringWeights {
    /// Largest value any single weight may take
    pub const MAX_WEIGHT: u32 = 100;

    /// Name and value of every weight, for validation
    pub fn entries(&self) -> [(&'static str, u32); 6] {
        [
            ("tier1_base", self.tier1_base),
            ("tier2_base", self.tier2_base),
            ("tier3_base", self.tier3_base),
            ("unpatched", self.unpatched),
            ("no_firewall", self.no_firewall),
            ("unmonitored", self.unmonitored),
        ]
    }

    fn tier_base(&self, tier: u8) -> u32 {
        match tier {
            1 => self.tier1_base,
            2 => self.tier2_base,
            _ => self.tier3_base,
        }
    }
}

/// Knobs for one metrics run
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    pub weights: ScoringWeights,
    /// Risk score at or above which an asset counts as high risk
    pub high_risk_threshold: u32,
    /// Observations older than this many months are stale
    pub stale_threshold_months: u32,
    /// "Today" for staleness
    pub reference_date: NaiveDate,
}

/// Everything known about one engineering asset after reconciliation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetAssessment {
    pub engineering_index: usize,
    pub record: AssetRecord,
    pub classification: SecurityClassification,
    /// `none` with confidence 0 when nothing matched
    pub match_type: MatchType,
    pub confidence: u8,
    /// Source of the matching discovery record, empty when unmatched
    pub matched_source_id: String,
    pub risk_score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierSummary {
    pub tier: u8,
    pub total: usize,
    /// Assets in this tier that some discovery tool sees
    pub monitored: usize,
    pub coverage_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitCoverage {
    /// Canonical process-unit name when the industry taxonomy knows it,
    /// otherwise the unit as written
    pub unit: String,
    pub total: usize,
    pub matched: usize,
    pub coverage_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaleAsset {
    pub tag_id: String,
    pub ip_address: String,
    pub source_id: String,
    pub last_seen: NaiveDate,
}

/// Inventory-wide numbers for one run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub engineering_count: usize,
    pub discovery_count: usize,
    pub matched_count: usize,
    pub blind_spot_count: usize,
    pub orphan_count: usize,
    pub coverage_percentage: u32,
    /// Keyed by match type wire name
    pub matches_by_type: BTreeMap<String, usize>,
    pub tiers: Vec<TierSummary>,
    pub units: Vec<UnitCoverage>,
    pub average_risk_score: u32,
    pub high_risk_count: usize,
    pub stale_threshold_months: u32,
    pub stale_assets: Vec<StaleAsset>,
}

/// Assessments plus aggregate metrics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryReport {
    pub assessments: Vec<AssetAssessment>,
    pub metrics: Metrics,
}

/// Build the report for a finished reconciliation
pub fn build_report(
    engineering: &[AssetRecord],
    discovery_count: usize,
    result: &ReconciliationResult,
    classifier: &TierClassifier,
    profile: &IndustryProfile,
    config: &MetricsConfig,
) -> InventoryReport {
    let mut by_engineering: Vec<Option<&MatchCandidate>> = vec![None; engineering.len()];
    for candidate in &result.matched {
        if let Some(slot) = by_engineering.get_mut(candidate.engineering_index) {
            *slot = Some(candidate);
        }
    }

    let assessments: Vec<AssetAssessment> = engineering
        .iter()
        .zip(by_engineering.iter())
        .enumerate()
        .map(|(i, (record, candidate))| assess(i, record, *candidate, classifier, &config.weights))
        .collect();

    let mut matches_by_type = BTreeMap::new();
    for candidate in &result.matched {
        *matches_by_type
            .entry(candidate.match_type.as_str().to_string())
            .or_insert(0) += 1;
    }

    let total_risk: u64 = assessments.iter().map(|a| u64::from(a.risk_score)).sum();
    let average_risk_score = if assessments.is_empty() {
        0
    } else {
        (total_risk as f64 / assessments.len() as f64).round() as u32
    };
    let high_risk_count = assessments
        .iter()
        .filter(|a| a.risk_score >= config.high_risk_threshold)
        .count();

    let metrics = Metrics {
        engineering_count: engineering.len(),
        discovery_count,
        matched_count: result.matched.len(),
        blind_spot_count: result.blind_spots.len(),
        orphan_count: result.orphans.len(),
        coverage_percentage: result.coverage_percentage,
        matches_by_type,
        tiers: tier_summaries(&assessments),
        units: unit_coverage(&assessments, profile),
        average_risk_score,
        high_risk_count,
        stale_threshold_months: config.stale_threshold_months,
        stale_assets: stale_assets(result, config),
    };

    InventoryReport {
        assessments,
        metrics,
    }
}

fn assess(
    index: usize,
    record: &AssetRecord,
    candidate: Option<&MatchCandidate>,
    classifier: &TierClassifier,
    weights: &ScoringWeights,
) -> AssetAssessment {
    let classification = classifier.classify(record);
    let risk_score = risk_score(classification.tier, record, candidate.map(|c| &c.discovery), weights);

    AssetAssessment {
        engineering_index: index,
        record: record.clone(),
        match_type: candidate.map_or(MatchType::None, |c| c.match_type),
        confidence: candidate.map_or(0, |c| c.confidence),
        matched_source_id: candidate
            .map(|c| c.discovery.source_id.clone())
            .unwrap_or_default(),
        classification,
        risk_score,
    }
}

/// Weighted risk for one asset, clamped to 100
///
/// `observed` is the matching discovery record; posture flags count as set
/// when either side reports them.
pub fn risk_score(
    tier: u8,
    record: &AssetRecord,
    observed: Option<&AssetRecord>,
    weights: &ScoringWeights,
) -> u32 {
    let mut score = weights.tier_base(tier);

    if tier <= 2 {
        let patched =
            record.has_security_patches || observed.is_some_and(|o| o.has_security_patches);
        let firewalled =
            record.firewall_protected || observed.is_some_and(|o| o.firewall_protected);
        if !patched {
            score = score.saturating_add(weights.unpatched);
        }
        if !firewalled {
            score = score.saturating_add(weights.no_firewall);
        }
    }
    if observed.is_none() {
        score = score.saturating_add(weights.unmonitored);
    }

    score.min(100)
}

fn tier_summaries(assessments: &[AssetAssessment]) -> Vec<TierSummary> {
    (1..=3u8)
        .map(|tier| {
            let in_tier = assessments.iter().filter(|a| a.classification.tier == tier);
            let (total, monitored) = in_tier.fold((0, 0), |(total, monitored), a| {
                (total + 1, monitored + usize::from(a.match_type != MatchType::None))
            });
            TierSummary {
                tier,
                total,
                monitored,
                coverage_percentage: coverage_percentage(monitored, total),
            }
        })
        .collect()
}

fn unit_coverage(assessments: &[AssetAssessment], profile: &IndustryProfile) -> Vec<UnitCoverage> {
    let mut units: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for a in assessments {
        let raw = a.record.unit.trim();
        if raw.is_empty() {
            continue;
        }
        let unit = profile
            .canonical_unit(raw)
            .map(str::to_string)
            .unwrap_or_else(|| raw.to_string());
        let entry = units.entry(unit).or_insert((0, 0));
        entry.0 += 1;
        if a.match_type != MatchType::None {
            entry.1 += 1;
        }
    }

    units
        .into_iter()
        .map(|(unit, (total, matched))| UnitCoverage {
            unit,
            total,
            matched,
            coverage_percentage: coverage_percentage(matched, total),
        })
        .collect()
}

fn stale_assets(result: &ReconciliationResult, config: &MetricsConfig) -> Vec<StaleAsset> {
    let Some(cutoff) = config
        .reference_date
        .checked_sub_months(Months::new(config.stale_threshold_months))
    else {
        return Vec::new();
    };

    result
        .matched
        .iter()
        .map(|m| &m.discovery)
        .chain(result.orphans.iter())
        .filter_map(|record| {
            let last_seen = parse_observation_date(&record.last_seen)?;
            (last_seen < cutoff).then(|| StaleAsset {
                tag_id: record.tag_id.clone(),
                ip_address: record.ip_address.clone(),
                source_id: record.source_id.clone(),
                last_seen,
            })
        })
        .collect()
}

/// Parse the date formats discovery tools commonly export
///
/// Unknown formats yield `None`, which never counts as stale.
pub fn parse_observation_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}
