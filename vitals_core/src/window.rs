//! Time-window filtering of the record collection.

use crate::{Error, HealthRecord, Result};
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Relative time filter applied to the record collection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    #[default]
    All,
    #[serde(alias = "week")]
    LastWeek,
    #[serde(alias = "month")]
    LastMonth,
}

impl Window {
    /// Largest day distance kept by this window, `None` for `All`
    pub fn max_days(&self) -> Option<i64> {
        match self {
            Window::All => None,
            Window::LastWeek => Some(7),
            Window::LastMonth => Some(30),
        }
    }

    /// Human-readable period name used in report titles and file names
    pub fn period_label(&self) -> &'static str {
        match self {
            Window::All => "All_Time",
            Window::LastWeek => "Last_7_Days",
            Window::LastMonth => "Last_30_Days",
        }
    }

    /// Whether a record falls inside the window as seen from `now`
    ///
    /// The distance is the absolute time between `now` and midnight UTC of
    /// the record date, rounded up to whole days. A record exactly at the
    /// limit is kept.
    pub fn contains(&self, record: &HealthRecord, now: DateTime<Utc>) -> bool {
        match self.max_days() {
            None => true,
            Some(limit) => day_distance(record, now) <= limit,
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Window::All => "all",
            Window::LastWeek => "week",
            Window::LastMonth => "month",
        };
        f.write_str(name)
    }
}

impl FromStr for Window {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Window::All),
            "week" | "last_week" => Ok(Window::LastWeek),
            "month" | "last_month" => Ok(Window::LastMonth),
            other => Err(Error::Validation(format!(
                "Unknown window '{}' (expected all, week or month)",
                other
            ))),
        }
    }
}

/// Keep the records inside `window`, preserving order
pub fn filter_by_window(
    records: &[HealthRecord],
    window: Window,
    now: DateTime<Utc>,
) -> Vec<HealthRecord> {
    records
        .iter()
        .filter(|r| window.contains(r, now))
        .cloned()
        .collect()
}

fn day_distance(record: &HealthRecord, now: DateTime<Utc>) -> i64 {
    let recorded_at = record.date.and_time(NaiveTime::MIN).and_utc();
    let millis = (now - recorded_at).num_milliseconds().abs();
    (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_date;
    use chrono::{Duration, TimeZone};

    fn record(s: &str) -> HealthRecord {
        HealthRecord::new(parse_date(s).unwrap()).with_bp(120.0, 80.0)
    }

    fn midnight(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_all_is_identity() {
        let records = vec![record("2024-03-10"), record("2001-01-01")];
        let now = midnight(2024, 3, 10);
        assert_eq!(filter_by_window(&records, Window::All, now), records);
    }

    #[test]
    fn test_week_boundary() {
        let now = midnight(2024, 3, 15);
        let records = vec![
            record("2024-03-15"),
            record("2024-03-08"), // exactly 7 days
            record("2024-03-07"), // 8 days
        ];

        let kept = filter_by_window(&records, Window::LastWeek, now);
        let dates: Vec<_> = kept.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-03-15", "2024-03-08"]);
    }

    #[test]
    fn test_month_boundary() {
        let now = midnight(2024, 3, 31);
        let records = vec![record("2024-03-01"), record("2024-02-29")];

        let kept = filter_by_window(&records, Window::LastMonth, now);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].date.to_string(), "2024-03-01");
    }

    #[test]
    fn test_partial_days_round_up() {
        // 7 days and one hour is rounded up to 8
        let now = midnight(2024, 3, 15) + Duration::hours(1);
        let records = vec![record("2024-03-08")];
        assert!(filter_by_window(&records, Window::LastWeek, now).is_empty());
    }

    #[test]
    fn test_future_dates_use_absolute_distance() {
        let now = midnight(2024, 3, 15);
        let records = vec![record("2024-03-20"), record("2024-04-30")];
        let kept = filter_by_window(&records, Window::LastWeek, now);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_parse_and_labels() {
        assert_eq!("Week".parse::<Window>().unwrap(), Window::LastWeek);
        assert_eq!("month".parse::<Window>().unwrap(), Window::LastMonth);
        assert!("year".parse::<Window>().is_err());

        assert_eq!(Window::All.period_label(), "All_Time");
        assert_eq!(Window::LastWeek.period_label(), "Last_7_Days");
        assert_eq!(Window::LastMonth.period_label(), "Last_30_Days");
    }
}
