//! Configuration file support for the health tracker.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/htrack/config.toml`.

use crate::alarm::DEFAULT_COUNTDOWN_SECONDS;
use crate::validate::WATER_GOAL_RANGE;
use crate::water::{DEFAULT_GOAL, DEFAULT_MAX_GLASSES};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub water: WaterConfig,

    #[serde(default)]
    pub alarm: AlarmConfig,
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

/// Water intake limits
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WaterConfig {
    /// Daily total is clamped to this many glasses
    #[serde(default = "default_max_glasses")]
    pub max_glasses: f64,

    /// Goal used until the user sets one
    #[serde(default = "default_goal")]
    pub default_goal: u8,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            max_glasses: default_max_glasses(),
            default_goal: default_goal(),
        }
    }
}

/// Emergency alarm configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AlarmConfig {
    #[serde(default = "default_countdown_seconds")]
    pub countdown_seconds: u32,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            countdown_seconds: default_countdown_seconds(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("htrack")
}

fn default_max_glasses() -> f64 {
    DEFAULT_MAX_GLASSES
}

fn default_goal() -> u8 {
    DEFAULT_GOAL
}

fn default_countdown_seconds() -> u32 {
    DEFAULT_COUNTDOWN_SECONDS
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
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("htrack").join("config.toml")
    }

    /// Reject values the trackers cannot work with
    pub fn validate(&self) -> Result<()> {
        if !self.water.max_glasses.is_finite() || self.water.max_glasses <= 0.0 {
            return Err(Error::Config(format!(
                "water.max_glasses must be positive, got {}",
                self.water.max_glasses
            )));
        }

        let (min, max) = WATER_GOAL_RANGE;
        let goal = i64::from(self.water.default_goal);
        if goal < min || goal > max {
            return Err(Error::Config(format!(
                "water.default_goal must be between {} and {}, got {}",
                min, max, goal
            )));
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
        assert_eq!(config.water.max_glasses, 20.0);
        assert_eq!(config.water.default_goal, 8);
        assert_eq!(config.alarm.countdown_seconds, 5);
        assert!(config.data.data_dir.ends_with("htrack"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip_through_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.alarm.countdown_seconds = 10;
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.alarm.countdown_seconds, 10);
        assert_eq!(loaded.water.default_goal, config.water.default_goal);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[water]
default_goal = 10
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.water.default_goal, 10);
        assert_eq!(config.water.max_glasses, 20.0); // default
        assert_eq!(config.alarm.countdown_seconds, 5); // default
    }

    #[test]
    fn test_invalid_goal_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[water]\ndefault_goal = 30\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }
}
