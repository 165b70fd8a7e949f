//! Security-tier classification
//!
//! Assigns each asset a coarse tier describing how strongly it needs active
//! security management. Rules are evaluated top-down and the first match
//! wins:
//!
//! 1. Programmable or network-infrastructure device type → Tier 1 / MUST
//! 2. Has an IP or MAC, or a networkable/smart device type → Tier 2 / SHOULD
//! 3. Passive/analog device type with no IP/MAC → Tier 3 / NONE
//! 4. Fallback: IP/MAC → Tier 2, otherwise Tier 3

use serde::{Deserialize, Serialize};

use crate::industry::IndustryProfile;
use crate::model::AssetRecord;

/// Programmable or network-infrastructure device types
pub const TIER1_KEYWORDS: &[&str] = &[
    "plc",
    "dcs",
    "hmi",
    "scada",
    "rtu",
    "controller",
    "server",
    "workstation",
    "historian",
    "switch",
    "router",
    "firewall",
];

/// Networkable or smart device types
pub const TIER2_KEYWORDS: &[&str] = &[
    "smart", "ip", "ethernet", "profinet", "modbus", "dnp3", "bacnet", "camera", "analyzer",
    "vfd", "drive",
];

/// Passive or analog device types
pub const TIER3_KEYWORDS: &[&str] = &[
    "4-20",
    "analog",
    "transmitter",
    "pressure",
    "temperature",
    "flow",
    "level",
    "valve",
    "sensor",
    "gauge",
    "instrument",
];

/// Obligation to apply security controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SecurityRequirement {
    Must,
    Should,
    None,
}

/// Tier assignment for one asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityClassification {
    /// 1 (highest obligation) through 3
    pub tier: u8,
    pub classification: String,
    pub security_required: SecurityRequirement,
    pub rationale: String,
}

impl SecurityClassification {
    fn tier1(rationale: String) -> Self {
        Self {
            tier: 1,
            classification: "Programmable / Network Infrastructure".to_string(),
            security_required: SecurityRequirement::Must,
            rationale,
        }
    }

    fn tier2(rationale: String) -> Self {
        Self {
            tier: 2,
            classification: "Networkable / Smart Device".to_string(),
            security_required: SecurityRequirement::Should,
            rationale,
        }
    }

    fn tier3(rationale: String) -> Self {
        Self {
            tier: 3,
            classification: "Passive / Analog Device".to_string(),
            security_required: SecurityRequirement::None,
            rationale,
        }
    }
}

/// Keyword sets driving classification
///
/// The base sets are always present; an industry profile appends its own
/// vocabulary after them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierClassifier {
    tier1: Vec<String>,
    tier2: Vec<String>,
    tier3: Vec<String>,
}

impl Default for TierClassifier {
    fn default() -> Self {
        Self {
            tier1: owned(TIER1_KEYWORDS),
            tier2: owned(TIER2_KEYWORDS),
            tier3: owned(TIER3_KEYWORDS),
        }
    }
}

impl TierClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base keywords extended with an industry's vocabulary
    pub fn for_industry(profile: &IndustryProfile) -> Self {
        let mut classifier = Self::default();
        classifier.tier1.extend(owned(profile.tier1_keywords));
        classifier.tier2.extend(owned(profile.tier2_keywords));
        classifier
    }

    /// Classify one record. Total: every record gets a tier.
    pub fn classify(&self, record: &AssetRecord) -> SecurityClassification {
        let device_type = record.device_type.to_lowercase();
        let networked = record.has_network_identity();

        if let Some(keyword) = find_keyword(&device_type, &self.tier1) {
            return SecurityClassification::tier1(format!(
                "Device type '{}' is programmable or network infrastructure ('{}')",
                record.device_type, keyword
            ));
        }

        if networked {
            return SecurityClassification::tier2(format!(
                "Asset is network-addressable ({})",
                network_evidence(record)
            ));
        }

        if let Some(keyword) = find_keyword(&device_type, &self.tier2) {
            return SecurityClassification::tier2(format!(
                "Device type '{}' indicates a networkable or smart device ('{}')",
                record.device_type, keyword
            ));
        }

        if let Some(keyword) = find_keyword(&device_type, &self.tier3) {
            return SecurityClassification::tier3(format!(
                "Device type '{}' is a passive or analog device ('{}') with no network address",
                record.device_type, keyword
            ));
        }

        // Fallback; `networked` was handled above, so only the no-address case remains
        SecurityClassification::tier3(
            "No recognized device type and no network address".to_string(),
        )
    }
}

/// Classify with the base keyword sets
pub fn classify(record: &AssetRecord) -> SecurityClassification {
    TierClassifier::default().classify(record)
}

fn find_keyword<'a>(device_type: &str, keywords: &'a [String]) -> Option<&'a str> {
    if device_type.is_empty() {
        return None;
    }
    keywords
        .iter()
        .find(|k| device_type.contains(k.as_str()))
        .map(String::as_str)
}

fn network_evidence(record: &AssetRecord) -> String {
    match (record.ip_address.is_empty(), record.mac_address.is_empty()) {
        (false, false) => format!("IP {}, MAC {}", record.ip_address, record.mac_address),
        (false, true) => format!("IP {}", record.ip_address),
        (true, false) => format!("MAC {}", record.mac_address),
        (true, true) => "no address".to_string(),
    }
}

fn owned(keywords: &[&str]) -> Vec<String> {
    keywords.iter().map(|k| k.to_string()).collect()
}
