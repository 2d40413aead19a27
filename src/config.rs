//! Configuration management for the controller.
//!
//! This module handles loading, validating, and saving the controller
//! configuration in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    CONFIG_DIR_ENV, DEFAULT_HOST, DEFAULT_PASSWORD, DEFAULT_PORT, OPENING_DELAY_MS,
    POLL_INTERVAL_MS,
};
use crate::models::DoorConfig;
use crate::validator::ConfigValidator;

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Request authorization settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret used as the HMAC key
    pub password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password: DEFAULT_PASSWORD.to_string(),
        }
    }
}

/// Relay and sensor timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// How long the action pin is held active (ms)
    pub opening_delay_ms: u64,
    /// Sensor sampling interval (ms)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    POLL_INTERVAL_MS
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            opening_delay_ms: OPENING_DELAY_MS,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Which pin backend drives the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpioBackendKind {
    /// In-memory pins, for running without hardware
    Mock,
    /// Raspberry Pi GPIO through rppal (requires the `rpi` feature)
    Rpi,
}

impl Default for GpioBackendKind {
    fn default() -> Self {
        if cfg!(feature = "rpi") {
            Self::Rpi
        } else {
            Self::Mock
        }
    }
}

/// Pin backend and electrical polarity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpioConfig {
    /// Backend selection
    #[serde(default)]
    pub backend: GpioBackendKind,
    /// Relay fires when the action pin is driven low
    #[serde(default)]
    pub relay_active_low: bool,
    /// Sensors pull their pin low when triggered (reed switch to ground)
    #[serde(default = "default_sensor_active_low")]
    pub sensor_active_low: bool,
}

fn default_sensor_active_low() -> bool {
    true
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            backend: GpioBackendKind::default(),
            relay_active_low: false,
            sensor_active_low: default_sensor_active_low(),
        }
    }
}

/// Controller configuration.
///
/// # File Location
///
/// - `$GARAGEDOOR_CONFIG_DIR/config.toml` when the variable is set
/// - Linux: `~/.config/garagedoor/config.toml`
/// - macOS: `~/Library/Application Support/garagedoor/config.toml`
/// - Windows: `%APPDATA%\garagedoor\config.toml`
///
/// # Validation
///
/// See [`ConfigValidator`]: unique pins across all roles, unique URL-safe
/// door names, at least one door, non-empty password, non-zero timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener
    #[serde(default)]
    pub server: ServerConfig,
    /// Authorization
    #[serde(default)]
    pub auth: AuthConfig,
    /// Relay and sensor timing
    #[serde(default)]
    pub timing: TimingConfig,
    /// Pin backend
    #[serde(default)]
    pub gpio: GpioConfig,
    /// Door table
    #[serde(default = "DoorConfig::defaults")]
    pub doors: Vec<DoorConfig>,
}

impl Config {
    /// Creates a new Config with the shipped defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            timing: TimingConfig::default(),
            gpio: GpioConfig::default(),
            doors: DoorConfig::defaults(),
        }
    }

    /// Number of configured doors.
    #[must_use]
    pub fn door_count(&self) -> usize {
        self.doors.len()
    }

    /// Duration of a trigger pulse.
    #[must_use]
    pub fn opening_delay(&self) -> Duration {
        Duration::from_millis(self.timing.opening_delay_ms)
    }

    /// Sensor sampling interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.timing.poll_interval_ms)
    }

    /// Gets the config directory path.
    ///
    /// `GARAGEDOOR_CONFIG_DIR` takes precedence over the platform directory.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join("garagedoor");

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Checks if the config file exists on disk.
    #[must_use]
    pub fn exists() -> bool {
        Self::config_file_path()
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Loads configuration from the default config file.
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;

        if !config_path.exists() {
            return Ok(Self::new());
        }

        Self::load_from(&config_path)
    }

    /// Loads configuration from an explicit file.
    ///
    /// Unlike [`Config::load`], a missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .context(format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Saves configuration to the default config file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to `path` using an atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context(format!(
                "Failed to create config directory: {}",
                parent.display()
            ))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let temp_path = path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, path).context(format!(
            "Failed to rename temp config file to: {}",
            path.display()
        ))?;

        Ok(())
    }

    /// Validates the door table and settings.
    ///
    /// Warnings (such as the shipped default password) do not fail
    /// validation; use [`ConfigValidator`] directly to inspect them.
    pub fn validate(&self) -> Result<()> {
        let report = ConfigValidator::new(self).validate();
        if !report.is_valid() {
            anyhow::bail!("Invalid configuration:\n{}", report.format_message());
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert_eq!(config.door_count(), 2);
        assert_eq!(config.auth.password, DEFAULT_PASSWORD);
        assert_eq!(config.opening_delay(), Duration::from_millis(250));
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.gpio.sensor_active_low);
        assert!(!config.gpio.relay_active_low);
    }

    #[test]
    fn test_config_validate_default() {
        assert!(Config::new().validate().is_ok());
    }

    #[test]
    fn test_config_validate_rejects_shared_pin() {
        let mut config = Config::new();
        config.doors[1].open_pin = config.doors[0].action_pin;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid configuration"));
    }

    #[test]
    fn test_config_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::new();
        config.auth.password = "hunter2".to_string();
        config.doors.push(DoorConfig::new("shed", 17, 27, 22));
        config.save_to(&path).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("toml.tmp").exists());

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_save_refuses_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::new();
        config.doors.clear();
        assert!(config.save_to(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_config_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[auth]\npassword = \"secret\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.auth.password, "secret");
        assert_eq!(config.doors, DoorConfig::defaults());
        assert_eq!(config.timing, TimingConfig::default());
    }

    #[test]
    fn test_config_load_from_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(Config::load_from(&temp_dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn test_config_parses_door_table() {
        let content = r#"
[timing]
opening_delay_ms = 400

[gpio]
backend = "mock"
relay_active_low = true

[[doors]]
name = "left"
action_pin = 17
open_pin = 27
closed_pin = 22
"#;
        let config: Config = toml::from_str(content).unwrap();
        assert_eq!(config.door_count(), 1);
        assert_eq!(config.doors[0].name, "left");
        assert_eq!(config.timing.poll_interval_ms, POLL_INTERVAL_MS);
        assert_eq!(config.opening_delay(), Duration::from_millis(400));
        assert_eq!(config.gpio.backend, GpioBackendKind::Mock);
        assert!(config.gpio.relay_active_low);
    }
}
