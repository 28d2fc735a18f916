//! Core domain types for the Vitals health log.
//!
//! This module defines:
//! - The per-date health record and its field-level merge
//! - The metrics a record can carry
//! - Raw entry drafts as typed by the user, with their validation

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Date format used for record keys and on the wire
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Health Record
// ============================================================================

/// One calendar date's health entry
///
/// Every reading is optional: a morning blood-pressure entry can be saved
/// first and the post-meal sugar reading merged in later the same day.
/// A present reading of `0` is a real reading, not an absent one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    pub date: NaiveDate,

    #[serde(
        default,
        deserialize_with = "deserialize_reading",
        serialize_with = "serialize_reading"
    )]
    pub systolic: Option<f64>,

    #[serde(
        default,
        deserialize_with = "deserialize_reading",
        serialize_with = "serialize_reading"
    )]
    pub diastolic: Option<f64>,

    #[serde(
        default,
        deserialize_with = "deserialize_reading",
        serialize_with = "serialize_reading"
    )]
    pub sugar_before: Option<f64>,

    #[serde(
        default,
        deserialize_with = "deserialize_reading",
        serialize_with = "serialize_reading"
    )]
    pub sugar_after: Option<f64>,

    #[serde(default, deserialize_with = "deserialize_notes")]
    pub notes: Option<String>,
}

impl HealthRecord {
    /// Create an empty record for a date
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            systolic: None,
            diastolic: None,
            sugar_before: None,
            sugar_after: None,
            notes: None,
        }
    }

    /// Builder-style setter for the blood pressure pair
    pub fn with_bp(mut self, systolic: f64, diastolic: f64) -> Self {
        self.systolic = Some(systolic);
        self.diastolic = Some(diastolic);
        self
    }

    /// Builder-style setter for the fasting sugar reading
    pub fn with_sugar_before(mut self, value: f64) -> Self {
        self.sugar_before = Some(value);
        self
    }

    /// Builder-style setter for the post-meal sugar reading
    pub fn with_sugar_after(mut self, value: f64) -> Self {
        self.sugar_after = Some(value);
        self
    }

    /// Builder-style setter for notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = normalize_notes(Some(notes.into()));
        self
    }

    /// Value of a single metric, if recorded
    pub fn reading(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Systolic => self.systolic,
            Metric::Diastolic => self.diastolic,
            Metric::SugarBefore => self.sugar_before,
            Metric::SugarAfter => self.sugar_after,
        }
    }

    /// Both halves of the blood pressure pair, if both are recorded
    pub fn blood_pressure(&self) -> Option<(f64, f64)> {
        self.systolic.zip(self.diastolic)
    }

    /// True if at least one health metric is recorded
    pub fn has_readings(&self) -> bool {
        Metric::ALL.iter().any(|m| self.reading(*m).is_some())
    }

    /// Check readings are finite and non-negative
    pub fn validate(&self) -> Result<()> {
        for metric in Metric::ALL {
            if let Some(value) = self.reading(metric) {
                if !value.is_finite() {
                    return Err(Error::validation(format!(
                        "{} for {} is not a number",
                        metric, self.date
                    )));
                }
                if value < 0.0 {
                    return Err(Error::validation(format!(
                        "{} for {} cannot be negative ({})",
                        metric, self.date, value
                    )));
                }
            }
        }
        Ok(())
    }

    /// Merge another record for the same date into this one
    ///
    /// Fields present in `incoming` overwrite; absent fields keep their
    /// stored value. Blank notes count as absent. Merging the same record
    /// twice is a no-op.
    pub fn merge_from(&mut self, incoming: &HealthRecord) {
        debug_assert_eq!(self.date, incoming.date);

        if incoming.systolic.is_some() {
            self.systolic = incoming.systolic;
        }
        if incoming.diastolic.is_some() {
            self.diastolic = incoming.diastolic;
        }
        if incoming.sugar_before.is_some() {
            self.sugar_before = incoming.sugar_before;
        }
        if incoming.sugar_after.is_some() {
            self.sugar_after = incoming.sugar_after;
        }
        if let Some(notes) = normalize_notes(incoming.notes.clone()) {
            self.notes = Some(notes);
        }
    }
}

// ============================================================================
// Metrics
// ============================================================================

/// A numeric health metric carried by a record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Systolic,
    Diastolic,
    SugarBefore,
    SugarAfter,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Systolic,
        Metric::Diastolic,
        Metric::SugarBefore,
        Metric::SugarAfter,
    ];

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Systolic | Metric::Diastolic => "mmHg",
            Metric::SugarBefore | Metric::SugarAfter => "mg/dL",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Systolic => "systolic",
            Metric::Diastolic => "diastolic",
            Metric::SugarBefore => "sugar before meal",
            Metric::SugarAfter => "sugar after meal",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Entry Drafts
// ============================================================================

/// Raw user input for a single entry, exactly as typed
///
/// Blank strings are treated as "not entered".
#[derive(Clone, Debug, Default)]
pub struct EntryDraft {
    pub date: Option<String>,
    pub systolic: Option<String>,
    pub diastolic: Option<String>,
    pub sugar_before: Option<String>,
    pub sugar_after: Option<String>,
    pub notes: Option<String>,
}

impl EntryDraft {
    /// Validate the draft and turn it into a record ready to save
    ///
    /// Rejects a missing or malformed date, unparseable numbers, negative
    /// readings, and drafts with no health reading at all.
    pub fn into_record(self) -> Result<HealthRecord> {
        let date = match non_blank(self.date.as_deref()) {
            Some(raw) => parse_date(raw)?,
            None => return Err(Error::validation("Please select a date")),
        };

        let record = HealthRecord {
            date,
            systolic: parse_reading(Metric::Systolic, self.systolic.as_deref())?,
            diastolic: parse_reading(Metric::Diastolic, self.diastolic.as_deref())?,
            sugar_before: parse_reading(Metric::SugarBefore, self.sugar_before.as_deref())?,
            sugar_after: parse_reading(Metric::SugarAfter, self.sugar_after.as_deref())?,
            notes: normalize_notes(self.notes),
        };

        if !record.has_readings() {
            return Err(Error::validation(
                "Please enter at least one health reading (BP or Sugar)",
            ));
        }

        record.validate()?;
        Ok(record)
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|e| Error::validation(format!("Invalid date '{}': {}", raw.trim(), e)))
}

fn parse_reading(metric: Metric, raw: Option<&str>) -> Result<Option<f64>> {
    match non_blank(raw) {
        None => Ok(None),
        Some(text) => text.parse::<f64>().map(Some).map_err(|_| {
            Error::validation(format!("Invalid {} value '{}'", metric, text))
        }),
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

// ============================================================================
// Serde helpers
// ============================================================================

/// Accepts a number, a numeric string, `null` or `""` (absent)
fn deserialize_reading<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawReading {
        Number(f64),
        Text(String),
    }

    match Option::<RawReading>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawReading::Number(n)) => Ok(Some(n)),
        Some(RawReading::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                trimmed
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| D::Error::custom(format!("invalid reading {:?}", s)))
            }
        }
    }
}

/// Whole-number readings are written as integers (`120`, not `120.0`)
fn serialize_reading<S>(value: &Option<f64>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => serializer.serialize_i64(*v as i64),
        Some(v) => serializer.serialize_f64(*v),
        None => serializer.serialize_none(),
    }
}

fn deserialize_notes<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(normalize_notes(Option::<String>::deserialize(deserializer)?))
}
