#![forbid(unsafe_code)]

//! Core domain model and business logic for the Vitals health log.
//!
//! This crate provides:
//! - Domain types (health records, metrics, entry drafts)
//! - Persistence (key-value backends, record store with merge-on-save)
//! - Backup import/export
//! - Derived views (time windows, statistics, day status, chart series)
//! - CSV reports and user preferences

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod backend;
pub mod store;
pub mod codec;
pub mod window;
pub mod stats;
pub mod chart;
pub mod report;
pub mod prefs;
pub mod confirm;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use backend::{FileStore, KeyValueStore, MemoryStore, WriteLock};
pub use store::RecordStore;
pub use codec::{backup_file_name, ImportSummary};
pub use window::{filter_by_window, Window};
pub use stats::{aggregate, classify_day, status_for_date, DerivedStats, HealthStatus, Severity};
pub use chart::{chart_series, ChartSeries};
pub use report::{report_file_name, write_report};
pub use prefs::{Preferences, Theme};
pub use confirm::{AutoConfirm, Confirm};
