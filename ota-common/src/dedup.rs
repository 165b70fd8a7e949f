//! Cross-source deduplication of discovery records
//!
//! Several discovery tools often report the same device. Records sharing an
//! identity signature collapse onto the first one seen.

use std::collections::HashSet;

use tracing::debug;

use crate::model::AssetRecord;

/// Identity fields that make two records the same asset
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct IdentitySignature {
    tag_id: String,
    ip_address: String,
    mac_address: String,
    hostname: String,
}

impl IdentitySignature {
    /// `None` when the record carries no identity at all; such records are
    /// never treated as duplicates of each other
    fn of(record: &AssetRecord) -> Option<Self> {
        if !record.has_identity() {
            return None;
        }
        Some(Self {
            tag_id: record.tag_id.trim().to_string(),
            ip_address: record.ip_address.trim().to_string(),
            mac_address: record.mac_address.trim().to_string(),
            hostname: record.hostname.trim().to_lowercase(),
        })
    }
}

/// Outcome of merging discovery sources
#[derive(Debug, Clone, Default)]
pub struct Deduplicated {
    /// Surviving records in first-seen order
    pub records: Vec<AssetRecord>,
    /// How many records were dropped as duplicates
    pub removed: usize,
}

/// Drop records whose identity signature was already seen
pub fn dedup_records(records: Vec<AssetRecord>) -> Deduplicated {
    let mut seen: HashSet<IdentitySignature> = HashSet::with_capacity(records.len());
    let mut kept = Vec::with_capacity(records.len());
    let mut removed = 0;

    for record in records {
        if let Some(signature) = IdentitySignature::of(&record) {
            if !seen.insert(signature) {
                debug!(
                    tag = %record.tag_id,
                    source = %record.source_id,
                    "Dropping duplicate discovery record"
                );
                removed += 1;
                continue;
            }
        }
        kept.push(record);
    }

    Deduplicated {
        records: kept,
        removed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from(source: &str, tag: &str, ip: &str, host: &str) -> AssetRecord {
        AssetRecord {
            tag_id: tag.to_string(),
            ip_address: ip.to_string(),
            hostname: host.to_string(),
            source_id: source.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_occurrence_kept() {
        let records = vec![
            from("nozomi", "PLC-1", "10.0.0.1", "plc1"),
            from("claroty", "PLC-1", "10.0.0.1", "PLC1"),
            from("claroty", "PLC-2", "10.0.0.2", ""),
        ];

        let result = dedup_records(records);

        assert_eq!(result.removed, 1);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].source_id, "nozomi");
    }

    #[test]
    fn test_repeated_duplicates_all_dropped_in_order() {
        let records = vec![
            from("a", "PLC-1", "10.0.0.1", ""),
            from("b", "PLC-2", "10.0.0.2", ""),
            from("c", "PLC-1", "10.0.0.1", ""),
            from("d", "PLC-1", "10.0.0.1", ""),
            from("e", "PLC-2", "10.0.0.2", ""),
        ];

        let result = dedup_records(records);

        assert_eq!(result.removed, 3);
        let sources: Vec<&str> = result.records.iter().map(|r| r.source_id.as_str()).collect();
        assert_eq!(sources, ["a", "b"]);
    }

    #[test]
    fn test_partial_overlap_is_not_duplicate() {
        let records = vec![
            from("a", "PLC-1", "10.0.0.1", ""),
            from("b", "PLC-1", "10.0.0.9", ""),
        ];
        assert_eq!(dedup_records(records).removed, 0);
    }

    #[test]
    fn test_identityless_records_are_all_kept() {
        let records = vec![AssetRecord::default(), AssetRecord::default()];
        let result = dedup_records(records);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.removed, 0);
    }
}
