//! Configuration file support for Vitals.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/vitals/config.toml`, or
//! from the path in `VITALS_CONFIG` when set.

use crate::{Error, Result, Window};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "VITALS_CONFIG";

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Listing and report defaults
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    #[serde(default)]
    pub default_window: Window,
}

fn default_data_dir() -> PathBuf {
    match dirs::data_local_dir() {
        Some(base) => base.join("vitals"),
        None => PathBuf::from(".vitals"),
    }
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        match dirs::config_dir() {
            Some(base) => base.join("vitals").join("config.toml"),
            None => PathBuf::from(".vitals").join("config.toml"),
        }
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.display.default_window, Window::All);
        assert!(config.data.data_dir.ends_with("vitals"));
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.display.default_window = Window::LastMonth;
        config.data.data_dir = temp_dir.path().join("data");
        config.save_to(&path).unwrap();

        let parsed = Config::load_from(&path).unwrap();
        assert_eq!(parsed.display.default_window, Window::LastMonth);
        assert_eq!(parsed.data.data_dir, temp_dir.path().join("data"));
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[display]
default_window = "week"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.display.default_window, Window::LastWeek);
        assert!(config.data.data_dir.ends_with("vitals"));
    }

    #[test]
    fn test_unknown_window_rejected() {
        let toml_str = r#"
[display]
default_window = "year"
"#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }
}
