//! Chart series for trend plots.

use crate::HealthRecord;
use chrono::NaiveDate;
use serde::Serialize;

/// Most recent records plotted on a trend chart
pub const CHART_POINT_LIMIT: usize = 30;

/// Oldest-first series, one value slot per label
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<NaiveDate>,
    pub systolic: Vec<Option<f64>>,
    pub diastolic: Vec<Option<f64>>,
    pub sugar_before: Vec<Option<f64>>,
    pub sugar_after: Vec<Option<f64>>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Build chart series from the latest [`CHART_POINT_LIMIT`] records
pub fn chart_series(records: &[HealthRecord]) -> ChartSeries {
    let mut sorted: Vec<&HealthRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.date);

    let start = sorted.len().saturating_sub(CHART_POINT_LIMIT);
    let recent = &sorted[start..];

    ChartSeries {
        labels: recent.iter().map(|r| r.date).collect(),
        systolic: recent.iter().map(|r| r.systolic).collect(),
        diastolic: recent.iter().map(|r| r.diastolic).collect(),
        sugar_before: recent.iter().map(|r| r.sugar_before).collect(),
        sugar_after: recent.iter().map(|r| r.sugar_after).collect(),
    }
}
