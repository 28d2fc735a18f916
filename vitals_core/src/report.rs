//! CSV health reports.
//!
//! A report has a short summary section (period, generation date and
//! averages) followed by one row per record, in the order given.

use crate::stats::rounded_mean;
use crate::{HealthRecord, Result};
use chrono::NaiveDate;
use std::io::Write;

/// Placeholder for values with no data
const NO_DATA: &str = "-";

/// Averages shown at the top of a report
///
/// Blood pressure is averaged over complete pairs only, so systolic and
/// diastolic always describe the same days.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub avg_systolic: Option<u32>,
    pub avg_diastolic: Option<u32>,
    pub avg_sugar_before: Option<u32>,
    pub avg_sugar_after: Option<u32>,
}

impl ReportSummary {
    pub fn from_records(records: &[HealthRecord]) -> Self {
        let mut sys_sum = 0.0;
        let mut dia_sum = 0.0;
        let mut bp_count = 0;
        let mut before_sum = 0.0;
        let mut before_count = 0;
        let mut after_sum = 0.0;
        let mut after_count = 0;

        for record in records {
            if let Some((sys, dia)) = record.blood_pressure() {
                sys_sum += sys;
                dia_sum += dia;
                bp_count += 1;
            }
            if let Some(v) = record.sugar_before {
                before_sum += v;
                before_count += 1;
            }
            if let Some(v) = record.sugar_after {
                after_sum += v;
                after_count += 1;
            }
        }

        Self {
            avg_systolic: rounded_mean(sys_sum, bp_count),
            avg_diastolic: rounded_mean(dia_sum, bp_count),
            avg_sugar_before: rounded_mean(before_sum, before_count),
            avg_sugar_after: rounded_mean(after_sum, after_count),
        }
    }
}

/// A detail row in the report
#[derive(Debug, serde::Serialize)]
struct ReportRow {
    date: String,
    blood_pressure: String,
    sugar_before: String,
    sugar_after: String,
    notes: String,
}

impl From<&HealthRecord> for ReportRow {
    fn from(record: &HealthRecord) -> Self {
        ReportRow {
            date: record.date.format(crate::DATE_FORMAT).to_string(),
            blood_pressure: record
                .blood_pressure()
                .map(|(sys, dia)| format!("{}/{}", sys, dia))
                .unwrap_or_else(|| NO_DATA.into()),
            sugar_before: display_reading(record.sugar_before),
            sugar_after: display_reading(record.sugar_after),
            notes: record.notes.clone().unwrap_or_else(|| NO_DATA.into()),
        }
    }
}

/// Write a CSV report for `records`
///
/// Returns the number of detail rows written.
pub fn write_report<W: Write>(
    records: &[HealthRecord],
    period_label: &str,
    generated_on: NaiveDate,
    writer: W,
) -> Result<usize> {
    let summary = ReportSummary::from_records(records);

    let mut csv = csv::WriterBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_writer(writer);

    let generated = generated_on.format(crate::DATE_FORMAT).to_string();
    let bp = format!(
        "{} / {} mmHg",
        display_average(summary.avg_systolic),
        display_average(summary.avg_diastolic)
    );
    let before = format!("{} mg/dL", display_average(summary.avg_sugar_before));
    let after = format!("{} mg/dL", display_average(summary.avg_sugar_after));

    csv.write_record(["Patient Health Report"])?;
    csv.write_record(["Metric", "Value"])?;
    csv.write_record(["Period", period_label])?;
    csv.write_record(["Generated", generated.as_str()])?;
    csv.write_record(["Avg Blood Pressure", bp.as_str()])?;
    csv.write_record(["Avg Sugar (Before Meal)", before.as_str()])?;
    csv.write_record(["Avg Sugar (After Meal)", after.as_str()])?;

    csv.write_record(["Detailed Records"])?;
    csv.write_record([
        "Date",
        "BP (mmHg)",
        "Sugar Fast (mg/dL)",
        "Sugar Post (mg/dL)",
        "Notes",
    ])?;
    for record in records {
        csv.serialize(ReportRow::from(record))?;
    }

    csv.flush()?;
    tracing::info!(
        "Wrote {} report rows for period {}",
        records.len(),
        period_label
    );
    Ok(records.len())
}

/// Suggested file name for a report
pub fn report_file_name(period_label: &str, generated_on: NaiveDate) -> String {
    format!(
        "Health_Report_{}_{}.csv",
        period_label.replace(char::is_whitespace, "_"),
        generated_on.format(crate::DATE_FORMAT)
    )
}

fn display_reading(value: Option<f64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NO_DATA.into())
}

fn display_average(value: Option<u32>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NO_DATA.into())
}
