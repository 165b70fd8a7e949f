//! Industry profiles
//!
//! Industry differences are data, not code: each profile contributes extra
//! classifier vocabulary and a process-unit taxonomy used to label unit
//! breakdowns. Everything else runs through the same pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Industries with dedicated profiles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Industry {
    #[default]
    Generic,
    OilGas,
    Pharma,
    Automotive,
    Utilities,
}

/// Per-industry configuration data
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryProfile {
    pub id: &'static str,
    pub name: &'static str,
    /// Appended to the base Tier 1 keywords
    pub tier1_keywords: &'static [&'static str],
    /// Appended to the base Tier 2 keywords
    pub tier2_keywords: &'static [&'static str],
    /// Canonical process-unit names
    pub process_units: &'static [&'static str],
}

static GENERIC: IndustryProfile = IndustryProfile {
    id: "generic",
    name: "Generic Industrial",
    tier1_keywords: &[],
    tier2_keywords: &[],
    process_units: &[],
};

static OIL_GAS: IndustryProfile = IndustryProfile {
    id: "oil_gas",
    name: "Oil & Gas",
    tier1_keywords: &["safety instrumented", "flow computer", "bpcs", "logic solver"],
    tier2_keywords: &["gas chromatograph", "wirelesshart", "isa100", "wellhead"],
    process_units: &[
        "Crude Distillation",
        "Hydrotreater",
        "FCC",
        "Reformer",
        "Tank Farm",
        "Flare",
        "Utilities",
    ],
};

static PHARMA: IndustryProfile = IndustryProfile {
    id: "pharma",
    name: "Pharmaceutical",
    tier1_keywords: &["bioreactor control", "batch control", "lims", "serialization"],
    tier2_keywords: &["chromatography", "hplc", "spectrometer", "autoclave"],
    process_units: &[
        "Upstream Processing",
        "Downstream Processing",
        "Fill Finish",
        "Packaging",
        "QC Lab",
        "Clean Utilities",
    ],
};

static AUTOMOTIVE: IndustryProfile = IndustryProfile {
    id: "automotive",
    name: "Automotive Manufacturing",
    tier1_keywords: &["robot", "andon", "safety relay"],
    tier2_keywords: &["servo", "vision", "torque tool", "io-link"],
    process_units: &[
        "Press Shop",
        "Body Shop",
        "Paint Shop",
        "General Assembly",
        "Powertrain",
    ],
};

static UTILITIES: IndustryProfile = IndustryProfile {
    id: "utilities",
    name: "Power & Water Utilities",
    tier1_keywords: &["ied", "protection relay", "energy management", "ami head"],
    tier2_keywords: &["smart meter", "recloser", "iec 61850", "pmu"],
    process_units: &[
        "Generation",
        "Transmission",
        "Distribution",
        "Substation",
        "Water Treatment",
    ],
};

impl Industry {
    pub const ALL: [Industry; 5] = [
        Industry::Generic,
        Industry::OilGas,
        Industry::Pharma,
        Industry::Automotive,
        Industry::Utilities,
    ];

    pub fn profile(self) -> &'static IndustryProfile {
        match self {
            Industry::Generic => &GENERIC,
            Industry::OilGas => &OIL_GAS,
            Industry::Pharma => &PHARMA,
            Industry::Automotive => &AUTOMOTIVE,
            Industry::Utilities => &UTILITIES,
        }
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().id)
    }
}

impl FromStr for Industry {
    type Err = Error;

    /// Accepts `oil_gas`, `oil-gas`, `Oil Gas`, `oilgas`, ...
    fn from_str(s: &str) -> Result<Self> {
        let compact: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        Industry::ALL
            .into_iter()
            .find(|i| i.profile().id.replace('_', "") == compact)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown industry: {}", s)))
    }
}

impl IndustryProfile {
    /// Map a free-text unit onto the taxonomy
    ///
    /// Exact (case-insensitive) names are preferred over containment.
    pub fn canonical_unit(&self, raw: &str) -> Option<&'static str> {
        let raw = raw.trim().to_lowercase();
        if raw.is_empty() {
            return None;
        }
        self.process_units
            .iter()
            .copied()
            .find(|u| u.to_lowercase() == raw)
            .or_else(|| {
                self.process_units
                    .iter()
                    .copied()
                    .find(|u| raw.contains(&u.to_lowercase()))
            })
    }
}
