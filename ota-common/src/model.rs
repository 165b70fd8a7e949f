//! Asset data model shared by ingest, reconciliation, and reporting
//!
//! Every value here is created fresh per reconciliation run and lives only
//! for the duration of one request.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Normalized asset row from an engineering baseline or a discovery tool
///
/// Missing values are empty strings or `false`, never absent, so every
/// comparison in the reconciler is total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetRecord {
    /// Asset tag, upper-cased
    pub tag_id: String,
    pub ip_address: String,
    /// MAC address, upper-cased
    pub mac_address: String,
    /// Hostname as reported; compared case-insensitively
    pub hostname: String,

    pub plant: String,
    pub unit: String,
    pub device_type: String,
    pub manufacturer: String,
    pub model: String,

    pub has_security_patches: bool,
    pub firewall_protected: bool,
    /// Last time a tool observed the asset, as reported (empty when unknown)
    pub last_seen: String,

    /// Input collection that produced this record
    pub source_id: String,
}

impl AssetRecord {
    /// Record carrying only a tag id
    pub fn with_tag(tag_id: &str) -> Self {
        Self {
            tag_id: tag_id.to_string(),
            ..Default::default()
        }
    }

    /// True when the asset exposes an IP or MAC address
    pub fn has_network_identity(&self) -> bool {
        !self.ip_address.is_empty() || !self.mac_address.is_empty()
    }

    /// True when at least one join-eligible field is populated
    pub fn has_identity(&self) -> bool {
        !self.tag_id.is_empty() || !self.hostname.is_empty() || self.has_network_identity()
    }
}

/// Strategy that produced a match
///
/// Declaration order is the pass priority order. `None` is never produced by
/// the reconciler itself; it labels unmatched assets in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    ExactTagId,
    IpMatch,
    HostnameMatch,
    MacMatch,
    PartialTagId,
    FuzzyTypeManufacturer,
    IntelligentPairing,
    None,
}

impl MatchType {
    /// Every strategy the reconciler can run, in priority order
    pub const STRATEGIES: [MatchType; 7] = [
        MatchType::ExactTagId,
        MatchType::IpMatch,
        MatchType::HostnameMatch,
        MatchType::MacMatch,
        MatchType::PartialTagId,
        MatchType::FuzzyTypeManufacturer,
        MatchType::IntelligentPairing,
    ];

    /// Fixed confidence attached to every match of this type
    pub fn confidence(self) -> u8 {
        match self {
            MatchType::ExactTagId => 100,
            MatchType::IpMatch => 95,
            MatchType::HostnameMatch => 90,
            MatchType::MacMatch => 85,
            MatchType::PartialTagId => 80,
            MatchType::FuzzyTypeManufacturer => 60,
            MatchType::IntelligentPairing => 50,
            MatchType::None => 0,
        }
    }

    /// Whether the strategy runs when the caller does not choose strategies
    pub fn enabled_by_default(self) -> bool {
        !matches!(
            self,
            MatchType::PartialTagId | MatchType::IntelligentPairing | MatchType::None
        )
    }

    /// Strategies enabled when the caller does not choose
    pub fn default_strategies() -> Vec<MatchType> {
        Self::STRATEGIES
            .into_iter()
            .filter(|s| s.enabled_by_default())
            .collect()
    }

    /// Wire name (same as the serde representation)
    pub fn as_str(self) -> &'static str {
        match self {
            MatchType::ExactTagId => "exact_tag_id",
            MatchType::PartialTagId => "partial_tag_id",
            MatchType::IpMatch => "ip_match",
            MatchType::HostnameMatch => "hostname_match",
            MatchType::MacMatch => "mac_match",
            MatchType::FuzzyTypeManufacturer => "fuzzy_type_manufacturer",
            MatchType::IntelligentPairing => "intelligent_pairing",
            MatchType::None => "none",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::STRATEGIES
            .into_iter()
            .chain(std::iter::once(MatchType::None))
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown match strategy: {}", s)))
    }
}

/// One engineering record paired with one discovery record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    pub match_type: MatchType,
    /// 0-100, fixed per match type
    pub confidence: u8,
    /// Position of the engineering record in the reconciler input
    pub engineering_index: usize,
    /// Position of the discovery record in the reconciler input
    pub discovery_index: usize,
    pub engineering: AssetRecord,
    pub discovery: AssetRecord,
}

/// Output of one reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
    /// Matches in pass order, engineering input order within a pass
    pub matched: Vec<MatchCandidate>,
    /// Engineering records nothing on the network side accounts for
    pub blind_spots: Vec<AssetRecord>,
    /// Discovery records with no engineering counterpart
    pub orphans: Vec<AssetRecord>,
    pub coverage_percentage: u32,
}

/// `round(matched / total * 100)`, or 0 for an empty total
pub fn coverage_percentage(matched: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((matched as f64 / total as f64) * 100.0).round() as u32
}
