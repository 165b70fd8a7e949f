//! CSV ingest
//!
//! Turns the raw CSV text of one source into header-keyed rows. Column names
//! are kept as written; key normalization belongs to [`crate::normalize`].

use std::collections::HashMap;

use tracing::debug;

use crate::model::AssetRecord;
use crate::normalize::normalize_record;
use crate::{Error, Result};

/// One CSV row keyed by its raw header names
pub type RawRow = HashMap<String, String>;

/// Parse CSV text with a header row into raw rows
///
/// Rows shorter than the header simply lack the trailing columns; extra
/// trailing fields without a header are dropped. Empty text yields no rows.
pub fn parse_csv(text: &str, source_id: &str) -> Result<Vec<RawRow>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| csv_error(source_id, e))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(source_id, e))?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }

    debug!(source = %source_id, rows = rows.len(), "Parsed CSV source");
    Ok(rows)
}

/// Parse and normalize one CSV source in a single step
pub fn load_records(text: &str, source_id: &str) -> Result<Vec<AssetRecord>> {
    let rows = parse_csv(text, source_id)?;
    Ok(rows
        .iter()
        .map(|row| normalize_record(row, source_id))
        .collect())
}

fn csv_error(source_id: &str, err: csv::Error) -> Error {
    Error::Csv {
        source_id: source_id.to_string(),
        message: err.to_string(),
    }
}
