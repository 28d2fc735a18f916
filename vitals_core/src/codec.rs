//! Backup import/export codec.
//!
//! Backups are a pretty-printed JSON array of records, every field
//! written, in a stable key order. Imports accept the same format, plus the
//! loose shapes older backups contain (empty strings for missing readings,
//! numbers as strings).

use crate::{Error, HealthRecord, Result};
use chrono::NaiveDate;
use serde_json::Value;

/// Outcome of a successful import
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImportSummary {
    /// Records merged into the store
    pub imported: usize,
    /// Elements skipped because they carried no date or were not records
    pub skipped: usize,
}

/// Records decoded from a backup, ready to merge
#[derive(Clone, Debug, Default)]
pub struct ParsedBackup {
    pub records: Vec<HealthRecord>,
    pub skipped: usize,
}

/// Serialize records as a backup document
pub fn export_records(records: &[HealthRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Decode a backup document
///
/// Fails if the text is not a JSON array, or if a dated element has an
/// unreadable date or reading. Elements with no date, including anything
/// that is not an object, are skipped.
pub fn parse_backup(text: &str) -> Result<ParsedBackup> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| Error::format(format!("backup is not valid JSON: {}", e)))?;

    let elements = match value {
        Value::Array(elements) => elements,
        _ => {
            return Err(Error::format(
                "Invalid data format: Expected an array of records.",
            ))
        }
    };

    let mut parsed = ParsedBackup::default();

    for (index, element) in elements.into_iter().enumerate() {
        let date = element.as_object().and_then(|fields| fields.get("date"));
        if !has_date(date) {
            tracing::debug!("Skipping backup element {} without a date", index);
            parsed.skipped += 1;
            continue;
        }

        let record: HealthRecord = serde_json::from_value(element)
            .map_err(|e| Error::format(format!("element {} is not a valid record: {}", index, e)))?;
        parsed.records.push(record);
    }

    tracing::debug!(
        "Parsed backup: {} records, {} skipped",
        parsed.records.len(),
        parsed.skipped
    );
    Ok(parsed)
}

/// Suggested file name for a backup taken on `date`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("health_data_backup_{}.json", date.format(crate::DATE_FORMAT))
}

fn has_date(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}
