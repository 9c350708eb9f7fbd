//! Configuration file support for GymSync.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/gymsync/config.toml`.

use crate::{Error, Result, UnitSystem};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub preferences: PreferencesConfig,

    #[serde(default)]
    pub session: SessionConfig,
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

/// Rendering limits
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,

    #[serde(default = "default_chart_exercise_limit")]
    pub chart_exercise_limit: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
            chart_exercise_limit: default_chart_exercise_limit(),
        }
    }
}

/// User preferences applied when the store has no value yet
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct PreferencesConfig {
    #[serde(default)]
    pub default_units: UnitSystem,
}

/// Interactive session runner configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|_| PathBuf::from("."))
    });
    base.join("gymsync")
}

fn default_recent_limit() -> usize {
    10
}

fn default_chart_exercise_limit() -> usize {
    5
}

fn default_tick_interval_ms() -> u64 {
    1000
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|_| PathBuf::from("."))
        });
        base.join("gymsync").join("config.toml")
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

    fn validate(&self) -> Result<()> {
        if self.session.tick_interval_ms == 0 {
            return Err(Error::Config("session.tick_interval_ms must be positive".into()));
        }
        if self.display.chart_exercise_limit == 0 {
            return Err(Error::Config(
                "display.chart_exercise_limit must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.display.recent_limit, 10);
        assert_eq!(config.display.chart_exercise_limit, 5);
        assert_eq!(config.preferences.default_units, UnitSystem::Imperial);
        assert_eq!(config.session.tick_interval_ms, 1000);
        assert!(config.data.data_dir.ends_with("gymsync"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.display.recent_limit, parsed.display.recent_limit);
        assert_eq!(config.data.data_dir, parsed.data.data_dir);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[preferences]
default_units = "metric"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.preferences.default_units, UnitSystem::Metric);
        assert_eq!(config.display.recent_limit, 10); // default
    }

    #[test]
    fn test_zero_tick_interval_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[session]\ntick_interval_ms = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_save_and_load_from() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.display.recent_limit = 3;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.display.recent_limit, 3);
    }
}
