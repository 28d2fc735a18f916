//! User preferences kept alongside the records.
//!
//! Stored in the same backend as the record collection, one key each.

use crate::backend::KeyValueStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const THEME_KEY: &str = "theme";
pub const NOTIFICATIONS_KEY: &str = "notificationsEnabled";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        })
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(Error::Validation(format!("Unknown theme '{}'", other))),
        }
    }
}

/// Preference accessors over a borrowed backend
pub struct Preferences<'a, B: KeyValueStore> {
    backend: &'a mut B,
}

impl<'a, B: KeyValueStore> Preferences<'a, B> {
    pub fn new(backend: &'a mut B) -> Self {
        Self { backend }
    }

    /// Saved theme; light when unset or unreadable
    pub fn theme(&self) -> Result<Theme> {
        match self.backend.get(THEME_KEY)? {
            None => Ok(Theme::default()),
            Some(raw) => Ok(raw.parse().unwrap_or_else(|_| {
                tracing::warn!("Ignoring unknown stored theme {:?}", raw);
                Theme::default()
            })),
        }
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.backend.set(THEME_KEY, &theme.to_string())?;
        tracing::info!("Theme set to {}", theme);
        Ok(())
    }

    pub fn toggle_theme(&mut self) -> Result<Theme> {
        let theme = self.theme()?.toggled();
        self.set_theme(theme)?;
        Ok(theme)
    }

    /// Whether reminders are enabled; only the literal `true` counts
    pub fn notifications_enabled(&self) -> Result<bool> {
        Ok(self
            .backend
            .get(NOTIFICATIONS_KEY)?
            .map(|v| v.trim() == "true")
            .unwrap_or(false))
    }

    pub fn set_notifications_enabled(&mut self, enabled: bool) -> Result<()> {
        self.backend
            .set(NOTIFICATIONS_KEY, if enabled { "true" } else { "false" })?;
        tracing::info!("Reminders {}", if enabled { "enabled" } else { "disabled" });
        Ok(())
    }

    pub fn toggle_notifications(&mut self) -> Result<bool> {
        let enabled = !self.notifications_enabled()?;
        self.set_notifications_enabled(enabled)?;
        Ok(enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryStore;
    use crate::store::{RecordStore, RECORDS_KEY};
    use crate::HealthRecord;

    #[test]
    fn test_defaults() {
        let mut backend = MemoryStore::new();
        let prefs = Preferences::new(&mut backend);
        assert_eq!(prefs.theme().unwrap(), Theme::Light);
        assert!(!prefs.notifications_enabled().unwrap());
    }

    #[test]
    fn test_toggle_theme_persists() {
        let mut backend = MemoryStore::new();
        assert_eq!(Preferences::new(&mut backend).toggle_theme().unwrap(), Theme::Dark);
        assert_eq!(backend.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        assert_eq!(Preferences::new(&mut backend).toggle_theme().unwrap(), Theme::Light);
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let mut backend = MemoryStore::new();
        backend.set(THEME_KEY, "sepia").unwrap();
        assert_eq!(Preferences::new(&mut backend).theme().unwrap(), Theme::Light);
    }

    #[test]
    fn test_notifications_toggle() {
        let mut backend = MemoryStore::new();
        let mut prefs = Preferences::new(&mut backend);
        assert!(prefs.toggle_notifications().unwrap());
        assert!(prefs.notifications_enabled().unwrap());
        assert!(!prefs.toggle_notifications().unwrap());
    }

    #[test]
    fn test_clearing_records_keeps_preferences() {
        let mut backend = MemoryStore::new();
        Preferences::new(&mut backend).set_theme(Theme::Dark).unwrap();

        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let mut store = RecordStore::new(&mut backend);
        store
            .save(&HealthRecord::new(date).with_bp(120.0, 80.0))
            .unwrap();
        store.clear().unwrap();

        assert_eq!(backend.get(RECORDS_KEY).unwrap(), None);
        assert_eq!(Preferences::new(&mut backend).theme().unwrap(), Theme::Dark);
    }
}
