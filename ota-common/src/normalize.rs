//! Record normalization
//!
//! Maps a raw CSV row onto an [`AssetRecord`] regardless of how the source
//! tool names its columns. Normalization never fails: anything it cannot
//! find becomes an empty string or `false`.

use std::collections::HashMap;

use crate::model::AssetRecord;

/// Accepted raw keys per canonical field, highest priority first
pub const TAG_ID_ALIASES: &[&str] = &["tag_id", "tag", "tagid", "asset_tag", "asset_id", "name"];
pub const IP_ADDRESS_ALIASES: &[&str] = &["ip_address", "ip", "ipaddress", "ip_addr", "address"];
pub const MAC_ADDRESS_ALIASES: &[&str] = &["mac_address", "mac", "macaddress", "mac_addr"];
pub const HOSTNAME_ALIASES: &[&str] = &["hostname", "host_name", "host", "device_name", "dns_name"];
pub const PLANT_ALIASES: &[&str] = &["plant", "site", "facility", "location"];
pub const UNIT_ALIASES: &[&str] = &["unit", "process_unit", "area", "zone"];
pub const DEVICE_TYPE_ALIASES: &[&str] = &[
    "device_type",
    "type",
    "asset_type",
    "devicetype",
    "category",
    "class",
];
pub const MANUFACTURER_ALIASES: &[&str] = &["manufacturer", "vendor", "make", "mfr"];
pub const MODEL_ALIASES: &[&str] = &["model", "model_number", "part_number"];
pub const SECURITY_PATCHES_ALIASES: &[&str] =
    &["has_security_patches", "security_patches", "patched"];
pub const FIREWALL_ALIASES: &[&str] = &["firewall_protected", "firewall", "behind_firewall"];
pub const LAST_SEEN_ALIASES: &[&str] = &[
    "last_seen",
    "lastseen",
    "last_seen_date",
    "last_contact",
    "last_update",
];

/// Canonicalize a raw column name: `"Tag ID"` becomes `tag_id`
///
/// Lower-cases, collapses every run of non-alphanumeric characters into a
/// single underscore, and strips leading/trailing underscores.
pub fn normalize_key(raw: &str) -> String {
    let mut key = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for c in raw.trim().chars() {
        if c.is_alphanumeric() {
            if pending_sep && !key.is_empty() {
                key.push('_');
            }
            pending_sep = false;
            key.extend(c.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    key
}

/// Permissive boolean: true/yes/1 in any case, everything else false
pub fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "1"
    )
}

/// Row with canonical keys and trimmed values
struct NormalizedRow(HashMap<String, String>);

impl NormalizedRow {
    fn new(raw: &HashMap<String, String>) -> Self {
        let mut fields: HashMap<String, String> = HashMap::with_capacity(raw.len());
        for (key, value) in raw {
            let value = value.trim();
            let slot = fields.entry(normalize_key(key)).or_default();
            // Two raw headers can collapse onto one key; keep a populated value
            if slot.is_empty() {
                *slot = value.to_string();
            }
        }
        Self(fields)
    }

    /// First non-empty value among `aliases`
    fn pick(&self, aliases: &[&str]) -> String {
        aliases
            .iter()
            .filter_map(|alias| self.0.get(*alias))
            .find(|value| !value.is_empty())
            .cloned()
            .unwrap_or_default()
    }

    fn pick_bool(&self, aliases: &[&str]) -> bool {
        parse_bool(&self.pick(aliases))
    }
}

/// Convert a raw CSV row into an [`AssetRecord`] tagged with `source_id`
pub fn normalize_record(raw: &HashMap<String, String>, source_id: &str) -> AssetRecord {
    let row = NormalizedRow::new(raw);

    AssetRecord {
        tag_id: row.pick(TAG_ID_ALIASES).to_uppercase(),
        ip_address: row.pick(IP_ADDRESS_ALIASES),
        mac_address: row.pick(MAC_ADDRESS_ALIASES).to_uppercase(),
        hostname: row.pick(HOSTNAME_ALIASES),
        plant: row.pick(PLANT_ALIASES),
        unit: row.pick(UNIT_ALIASES),
        device_type: row.pick(DEVICE_TYPE_ALIASES),
        manufacturer: row.pick(MANUFACTURER_ALIASES),
        model: row.pick(MODEL_ALIASES),
        has_security_patches: row.pick_bool(SECURITY_PATCHES_ALIASES),
        firewall_protected: row.pick_bool(FIREWALL_ALIASES),
        last_seen: row.pick(LAST_SEEN_ALIASES),
        source_id: source_id.to_string(),
    }
}
