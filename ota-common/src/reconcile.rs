//! Record Reconciler
//!
//! Pairs engineering-baseline records with discovery-tool records using an
//! ordered pipeline of match strategies, strongest identity first.
//!
//! # Algorithm
//! 1. Enabled strategies run strictly in priority order (see
//!    [`MatchType::STRATEGIES`]).
//! 2. Within a pass, unmatched engineering records are visited in input
//!    order; the first unconsumed discovery record satisfying the predicate
//!    wins.
//! 3. A consumed discovery record is out of play for every later pass, and
//!    an engineering record is matched at most once.
//! 4. `fuzzy_type_manufacturer` only runs when no pass has matched anything;
//!    `intelligent_pairing` only runs when that still holds.
//!
//! Identity passes look up discovery records through a hash index
//! (`key -> indices in input order`), which picks the same record a nested
//! scan would while staying linear in the input size.
//!
//! # Synthetic fill
//! `intelligent_pairing` pairs records positionally with no field-level
//! evidence. It is never enabled by default and its matches always carry
//! confidence 50, so callers can tell fabricated coverage apart.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::model::{coverage_percentage, AssetRecord, MatchCandidate, MatchType, ReconciliationResult};
use crate::{Error, Result};

/// Length of the tag prefix compared by `partial_tag_id`
pub const PARTIAL_TAG_PREFIX_LEN: usize = 6;

/// Share of the engineering set `intelligent_pairing` may pair, as a ratio
const SYNTHETIC_FILL_NUMERATOR: usize = 2;
const SYNTHETIC_FILL_DENOMINATOR: usize = 5;

/// Configured reconciliation pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciler {
    strategies: Vec<MatchType>,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self {
            strategies: MatchType::default_strategies(),
        }
    }
}

impl Reconciler {
    /// Reconciler running the default strategies (everything except the
    /// opt-in `partial_tag_id` and `intelligent_pairing` passes)
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciler running exactly the given strategies
    ///
    /// Order and duplicates in `strategies` do not matter: enabled passes
    /// always run in priority order. `none` is not a strategy and is
    /// rejected.
    pub fn with_strategies<I>(strategies: I) -> Result<Self>
    where
        I: IntoIterator<Item = MatchType>,
    {
        let mut enabled: Vec<MatchType> = strategies.into_iter().collect();
        if enabled.contains(&MatchType::None) {
            return Err(Error::InvalidInput(
                "'none' is an outcome, not a match strategy".to_string(),
            ));
        }
        enabled.sort();
        enabled.dedup();
        Ok(Self { strategies: enabled })
    }

    /// Add the synthetic-fill pass to the pipeline
    pub fn with_synthetic_fill(mut self) -> Self {
        if !self.strategies.contains(&MatchType::IntelligentPairing) {
            self.strategies.push(MatchType::IntelligentPairing);
        }
        self
    }

    /// Enabled strategies in the order they run
    pub fn strategies(&self) -> &[MatchType] {
        &self.strategies
    }

    /// Reconcile `engineering` against `discovery`
    ///
    /// # Errors
    /// [`Error::EmptyEngineering`] when there are no engineering records.
    /// Missing or empty fields are never errors; such records end up as
    /// blind spots or orphans.
    pub fn reconcile(
        &self,
        engineering: &[AssetRecord],
        discovery: &[AssetRecord],
    ) -> Result<ReconciliationResult> {
        if engineering.is_empty() {
            return Err(Error::EmptyEngineering);
        }

        let mut ledger = MatchLedger::new(engineering.len(), discovery.len());

        for &strategy in &self.strategies {
            let before = ledger.pairings.len();
            match strategy {
                MatchType::ExactTagId => {
                    keyed_pass(&mut ledger, engineering, discovery, strategy, tag_key)
                }
                MatchType::IpMatch => {
                    keyed_pass(&mut ledger, engineering, discovery, strategy, ip_key)
                }
                MatchType::HostnameMatch => {
                    keyed_pass(&mut ledger, engineering, discovery, strategy, hostname_key)
                }
                MatchType::MacMatch => {
                    keyed_pass(&mut ledger, engineering, discovery, strategy, mac_key)
                }
                MatchType::PartialTagId => {
                    keyed_pass(&mut ledger, engineering, discovery, strategy, tag_prefix_key)
                }
                MatchType::FuzzyTypeManufacturer => {
                    if ledger.pairings.is_empty() {
                        fuzzy_pass(&mut ledger, engineering, discovery);
                    }
                }
                MatchType::IntelligentPairing => {
                    if ledger.pairings.is_empty() {
                        synthetic_fill_pass(&mut ledger, engineering.len());
                    }
                }
                MatchType::None => {}
            }
            debug!(
                strategy = %strategy,
                new_matches = ledger.pairings.len() - before,
                total_matches = ledger.pairings.len(),
                "Reconciliation pass complete"
            );
        }

        let result = ledger.into_result(engineering, discovery);
        debug!(
            engineering = engineering.len(),
            discovery = discovery.len(),
            matched = result.matched.len(),
            blind_spots = result.blind_spots.len(),
            orphans = result.orphans.len(),
            coverage = result.coverage_percentage,
            "Reconciliation complete"
        );
        Ok(result)
    }
}

/// Reconcile with the default strategies
pub fn reconcile(
    engineering: &[AssetRecord],
    discovery: &[AssetRecord],
) -> Result<ReconciliationResult> {
    Reconciler::default().reconcile(engineering, discovery)
}

/// Which records have been paired so far, owned by one reconciliation run
/// and threaded through every pass
struct MatchLedger {
    engineering_matched: Vec<bool>,
    discovery_consumed: Vec<bool>,
    pairings: Vec<(MatchType, usize, usize)>,
}

impl MatchLedger {
    fn new(engineering_len: usize, discovery_len: usize) -> Self {
        Self {
            engineering_matched: vec![false; engineering_len],
            discovery_consumed: vec![false; discovery_len],
            pairings: Vec::new(),
        }
    }

    fn pair(&mut self, match_type: MatchType, engineering_index: usize, discovery_index: usize) {
        debug_assert!(!self.engineering_matched[engineering_index]);
        debug_assert!(!self.discovery_consumed[discovery_index]);
        self.engineering_matched[engineering_index] = true;
        self.discovery_consumed[discovery_index] = true;
        self.pairings.push((match_type, engineering_index, discovery_index));
    }

    fn unmatched_engineering(&self) -> impl Iterator<Item = usize> + '_ {
        self.engineering_matched
            .iter()
            .enumerate()
            .filter(|(_, matched)| !**matched)
            .map(|(i, _)| i)
    }

    fn unconsumed_discovery(&self) -> impl Iterator<Item = usize> + '_ {
        self.discovery_consumed
            .iter()
            .enumerate()
            .filter(|(_, consumed)| !**consumed)
            .map(|(i, _)| i)
    }

    fn into_result(
        self,
        engineering: &[AssetRecord],
        discovery: &[AssetRecord],
    ) -> ReconciliationResult {
        let blind_spots = self
            .unmatched_engineering()
            .map(|i| engineering[i].clone())
            .collect();
        let orphans = self
            .unconsumed_discovery()
            .map(|i| discovery[i].clone())
            .collect();
        let coverage = coverage_percentage(self.pairings.len(), engineering.len());

        let matched = self
            .pairings
            .into_iter()
            .map(|(match_type, e, d)| MatchCandidate {
                match_type,
                confidence: match_type.confidence(),
                engineering_index: e,
                discovery_index: d,
                engineering: engineering[e].clone(),
                discovery: discovery[d].clone(),
            })
            .collect();

        ReconciliationResult {
            matched,
            blind_spots,
            orphans,
            coverage_percentage: coverage,
        }
    }
}

fn tag_key(record: &AssetRecord) -> Option<String> {
    non_empty(&record.tag_id).map(str::to_string)
}

fn ip_key(record: &AssetRecord) -> Option<String> {
    non_empty(&record.ip_address).map(str::to_string)
}

fn hostname_key(record: &AssetRecord) -> Option<String> {
    non_empty(&record.hostname).map(str::to_lowercase)
}

fn mac_key(record: &AssetRecord) -> Option<String> {
    non_empty(&record.mac_address).map(str::to_string)
}

fn tag_prefix_key(record: &AssetRecord) -> Option<String> {
    let tag = non_empty(&record.tag_id)?;
    if tag.chars().count() < PARTIAL_TAG_PREFIX_LEN {
        return None;
    }
    Some(tag.chars().take(PARTIAL_TAG_PREFIX_LEN).collect())
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Equality join on a derived key
fn keyed_pass(
    ledger: &mut MatchLedger,
    engineering: &[AssetRecord],
    discovery: &[AssetRecord],
    match_type: MatchType,
    key: fn(&AssetRecord) -> Option<String>,
) {
    let mut index: HashMap<String, VecDeque<usize>> = HashMap::new();
    for d in ledger.unconsumed_discovery() {
        if let Some(k) = key(&discovery[d]) {
            index.entry(k).or_default().push_back(d);
        }
    }
    if index.is_empty() {
        return;
    }

    let candidates: Vec<usize> = ledger.unmatched_engineering().collect();
    for e in candidates {
        let Some(k) = key(&engineering[e]) else {
            continue;
        };
        // Buckets only hold records unconsumed at pass start, and only this
        // pass consumes from them, so the front is always the first eligible
        if let Some(d) = index.get_mut(&k).and_then(VecDeque::pop_front) {
            ledger.pair(match_type, e, d);
        }
    }
}

/// Last evidence-based pass: device type containment plus manufacturer
fn fuzzy_pass(ledger: &mut MatchLedger, engineering: &[AssetRecord], discovery: &[AssetRecord]) {
    let candidates: Vec<usize> = ledger.unmatched_engineering().collect();
    for e in candidates {
        let found = ledger
            .unconsumed_discovery()
            .find(|&d| fuzzy_type_manufacturer(&engineering[e], &discovery[d]));
        if let Some(d) = found {
            ledger.pair(MatchType::FuzzyTypeManufacturer, e, d);
        }
    }
}

/// Device types overlap by substring (either direction) and manufacturers
/// agree, both case-insensitively
pub fn fuzzy_type_manufacturer(a: &AssetRecord, b: &AssetRecord) -> bool {
    let (Some(type_a), Some(type_b)) = (non_empty(&a.device_type), non_empty(&b.device_type))
    else {
        return false;
    };
    let (Some(mfr_a), Some(mfr_b)) = (non_empty(&a.manufacturer), non_empty(&b.manufacturer))
    else {
        return false;
    };

    let type_a = type_a.to_lowercase();
    let type_b = type_b.to_lowercase();
    let types_overlap = type_a.contains(&type_b) || type_b.contains(&type_a);

    types_overlap && mfr_a.to_lowercase() == mfr_b.to_lowercase()
}

/// Positional pairing with no field-level justification
fn synthetic_fill_pass(ledger: &mut MatchLedger, engineering_count: usize) {
    let limit = engineering_count * SYNTHETIC_FILL_NUMERATOR / SYNTHETIC_FILL_DENOMINATOR;
    let pairs: Vec<(usize, usize)> = ledger
        .unmatched_engineering()
        .zip(ledger.unconsumed_discovery())
        .take(limit)
        .collect();

    debug!(limit, pairs = pairs.len(), "Synthetic fill pairing");
    for (e, d) in pairs {
        ledger.pair(MatchType::IntelligentPairing, e, d);
    }
}
