//! Summary statistics and per-day health status.
//!
//! ## Day status thresholds
//!
//! | signal        | Warning        | Critical       |
//! |---------------|----------------|----------------|
//! | blood pressure| sys ≥ 120 or dia ≥ 80 | sys > 140 or dia > 90 |
//! | fasting sugar | > 110          | > 180          |
//! | post-meal     | > 140          | > 180          |
//!
//! Blood pressure is only judged when both halves are recorded. The day's
//! status is the worst signal.

use crate::{HealthRecord, Metric};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Averages over a set of records
///
/// Each average is `None` when no record carries that metric.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub avg_systolic: Option<u32>,
    pub avg_diastolic: Option<u32>,
    pub avg_sugar_before: Option<u32>,
    pub avg_sugar_after: Option<u32>,
    pub systolic_count: usize,
    pub diastolic_count: usize,
    pub sugar_before_count: usize,
    pub sugar_after_count: usize,
}

impl DerivedStats {
    pub fn average(&self, metric: Metric) -> Option<u32> {
        match metric {
            Metric::Systolic => self.avg_systolic,
            Metric::Diastolic => self.avg_diastolic,
            Metric::SugarBefore => self.avg_sugar_before,
            Metric::SugarAfter => self.avg_sugar_after,
        }
    }
}

/// Severity of a single signal or reading
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

/// Overall status of one day
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    NoEntry,
    Normal,
    Warning,
    Critical,
}

impl From<Severity> for HealthStatus {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Normal => HealthStatus::Normal,
            Severity::Warning => HealthStatus::Warning,
            Severity::Critical => HealthStatus::Critical,
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HealthStatus::NoEntry => "No entry",
            HealthStatus::Normal => "Normal",
            HealthStatus::Warning => "Warning",
            HealthStatus::Critical => "Critical",
        };
        f.write_str(label)
    }
}

/// Average every metric over `records`
///
/// Returns `None` for an empty slice.
pub fn aggregate(records: &[HealthRecord]) -> Option<DerivedStats> {
    if records.is_empty() {
        return None;
    }

    let (avg_systolic, systolic_count) = average_of(records, Metric::Systolic);
    let (avg_diastolic, diastolic_count) = average_of(records, Metric::Diastolic);
    let (avg_sugar_before, sugar_before_count) = average_of(records, Metric::SugarBefore);
    let (avg_sugar_after, sugar_after_count) = average_of(records, Metric::SugarAfter);

    Some(DerivedStats {
        avg_systolic,
        avg_diastolic,
        avg_sugar_before,
        avg_sugar_after,
        systolic_count,
        diastolic_count,
        sugar_before_count,
        sugar_after_count,
    })
}

fn average_of(records: &[HealthRecord], metric: Metric) -> (Option<u32>, usize) {
    let (sum, count) = records
        .iter()
        .filter_map(|r| r.reading(metric))
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    (rounded_mean(sum, count), count)
}

pub(crate) fn rounded_mean(sum: f64, count: usize) -> Option<u32> {
    if count == 0 {
        None
    } else {
        Some((sum / count as f64).round() as u32)
    }
}

/// Status of a day given its record, if any
pub fn classify_day(record: Option<&HealthRecord>) -> HealthStatus {
    let record = match record {
        Some(record) => record,
        None => return HealthStatus::NoEntry,
    };

    let bp = record
        .blood_pressure()
        .map(|(sys, dia)| bp_severity(sys, dia));
    let before = record
        .sugar_before
        .map(|v| threshold_severity(v, 110.0, 180.0));
    let after = record
        .sugar_after
        .map(|v| threshold_severity(v, 140.0, 180.0));

    [bp, before, after]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(Severity::Normal)
        .into()
}

/// Status of `date` within a record collection
pub fn status_for_date(records: &[HealthRecord], date: NaiveDate) -> HealthStatus {
    classify_day(records.iter().find(|r| r.date == date))
}

/// Colour tier of a single reading, as shown next to table values
///
/// These are the per-reading display bands, stricter than the day status.
pub fn reading_severity(metric: Metric, value: f64) -> Severity {
    let (normal_below, warning_below) = match metric {
        Metric::Systolic => (120.0, 130.0),
        Metric::Diastolic => (80.0, 80.0),
        Metric::SugarBefore => (100.0, 126.0),
        Metric::SugarAfter => (140.0, 200.0),
    };

    if value < normal_below {
        Severity::Normal
    } else if value < warning_below {
        Severity::Warning
    } else {
        Severity::Critical
    }
}

fn bp_severity(systolic: f64, diastolic: f64) -> Severity {
    if systolic > 140.0 || diastolic > 90.0 {
        Severity::Critical
    } else if systolic >= 120.0 || diastolic >= 80.0 {
        Severity::Warning
    } else {
        Severity::Normal
    }
}

// strictly-above thresholds
fn threshold_severity(value: f64, warning_above: f64, critical_above: f64) -> Severity {
    if value > critical_above {
        Severity::Critical
    } else if value > warning_above {
        Severity::Warning
    } else {
        Severity::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_date;

    fn day() -> HealthRecord {
        HealthRecord::new(parse_date("2024-03-10").unwrap())
    }

    #[test]
    fn test_aggregate_empty_is_none() {
        assert_eq!(aggregate(&[]), None);
    }

    #[test]
    fn test_aggregate_averages_present_fields_only() {
        let records = vec![
            day().with_bp(120.0, 80.0),
            day().with_bp(131.0, 85.0).with_sugar_before(100.0),
            day().with_sugar_after(150.0),
        ];

        let stats = aggregate(&records).unwrap();
        assert_eq!(stats.avg_systolic, Some(126)); // 125.5 rounds up
        assert_eq!(stats.avg_diastolic, Some(83)); // 82.5 rounds up
        assert_eq!(stats.avg_sugar_before, Some(100));
        assert_eq!(stats.avg_sugar_after, Some(150));
        assert_eq!(stats.systolic_count, 2);
        assert_eq!(stats.sugar_before_count, 1);
    }

    #[test]
    fn test_aggregate_no_data_sentinel_per_field() {
        let stats = aggregate(&[day().with_sugar_before(90.0)]).unwrap();
        assert_eq!(stats.avg_systolic, None);
        assert_eq!(stats.avg_sugar_after, None);
        assert_eq!(stats.average(Metric::SugarBefore), Some(90));
    }

    #[test]
    fn test_aggregate_counts_zero_readings() {
        let stats = aggregate(&[day().with_sugar_before(0.0), day().with_sugar_before(100.0)]).unwrap();
        assert_eq!(stats.avg_sugar_before, Some(50));
        assert_eq!(stats.sugar_before_count, 2);
    }

    #[test]
    fn test_classify_scenarios() {
        assert_eq!(classify_day(Some(&day().with_bp(145.0, 85.0))), HealthStatus::Critical);
        assert_eq!(classify_day(Some(&day().with_bp(125.0, 78.0))), HealthStatus::Warning);
        assert_eq!(classify_day(Some(&day().with_bp(110.0, 70.0))), HealthStatus::Normal);
        assert_eq!(classify_day(Some(&day().with_sugar_before(190.0))), HealthStatus::Critical);
        assert_eq!(classify_day(None), HealthStatus::NoEntry);
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify_day(Some(&day().with_bp(140.0, 90.0))), HealthStatus::Warning);
        assert_eq!(classify_day(Some(&day().with_bp(119.0, 80.0))), HealthStatus::Warning);
        assert_eq!(classify_day(Some(&day().with_bp(110.0, 91.0))), HealthStatus::Critical);
        assert_eq!(classify_day(Some(&day().with_sugar_before(110.0))), HealthStatus::Normal);
        assert_eq!(classify_day(Some(&day().with_sugar_before(111.0))), HealthStatus::Warning);
        assert_eq!(classify_day(Some(&day().with_sugar_after(140.0))), HealthStatus::Normal);
        assert_eq!(classify_day(Some(&day().with_sugar_after(141.0))), HealthStatus::Warning);
        assert_eq!(classify_day(Some(&day().with_sugar_after(181.0))), HealthStatus::Critical);
    }

    #[test]
    fn test_classify_takes_worst_signal() {
        let record = day().with_bp(110.0, 70.0).with_sugar_after(150.0);
        assert_eq!(classify_day(Some(&record)), HealthStatus::Warning);

        let record = day().with_bp(125.0, 82.0).with_sugar_before(200.0);
        assert_eq!(classify_day(Some(&record)), HealthStatus::Critical);
    }

    #[test]
    fn test_half_blood_pressure_is_not_judged() {
        let mut record = day();
        record.systolic = Some(180.0);
        assert_eq!(classify_day(Some(&record)), HealthStatus::Normal);
    }

    #[test]
    fn test_status_for_date() {
        let records = vec![day().with_bp(150.0, 95.0)];
        let today = parse_date("2024-03-10").unwrap();
        let tomorrow = parse_date("2024-03-11").unwrap();
        assert_eq!(status_for_date(&records, today), HealthStatus::Critical);
        assert_eq!(status_for_date(&records, tomorrow), HealthStatus::NoEntry);
    }

    #[test]
    fn test_reading_severity_bands() {
        assert_eq!(reading_severity(Metric::Systolic, 119.0), Severity::Normal);
        assert_eq!(reading_severity(Metric::Systolic, 125.0), Severity::Warning);
        assert_eq!(reading_severity(Metric::Systolic, 130.0), Severity::Critical);
        assert_eq!(reading_severity(Metric::Diastolic, 79.0), Severity::Normal);
        assert_eq!(reading_severity(Metric::Diastolic, 80.0), Severity::Critical);
        assert_eq!(reading_severity(Metric::SugarBefore, 110.0), Severity::Warning);
        assert_eq!(reading_severity(Metric::SugarAfter, 200.0), Severity::Critical);
    }
}
