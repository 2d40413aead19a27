//! Shared test fixtures for web API and CLI tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use std::path::{Path, PathBuf};
use std::process::Command;

use garagedoor::config::{Config, GpioBackendKind};

/// Password used by every fixture config.
pub const TEST_PASSWORD: &str = "test-secret";

/// Default config with a short pulse, the mock backend, and a known password.
pub fn test_config() -> Config {
    let mut config = Config::new();
    config.auth.password = TEST_PASSWORD.to_string();
    config.timing.opening_delay_ms = 5;
    config.gpio.backend = GpioBackendKind::Mock;
    config
}

/// Writes `config` as `config.toml` inside `dir`.
pub fn write_config(config: &Config, dir: &Path) -> PathBuf {
    let path = dir.join("config.toml");
    config.save_to(&path).expect("Failed to write config");
    path
}

/// Writes raw TOML as `config.toml` inside `dir`, bypassing validation.
pub fn write_raw_config(content: &str, dir: &Path) -> PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, content).expect("Failed to write config");
    path
}

/// Path to the garagedoor binary
pub fn garagedoor_bin() -> String {
    std::env::var("CARGO_BIN_EXE_garagedoor")
        .unwrap_or_else(|_| "target/debug/garagedoor".to_string())
}

/// Creates a Command with an isolated config directory.
pub fn isolated_command(args: &[&str], config_dir: &Path) -> Command {
    let mut cmd = Command::new(garagedoor_bin());
    cmd.env("GARAGEDOOR_CONFIG_DIR", config_dir);
    cmd.env_remove("RUST_LOG");
    cmd.args(args);
    cmd
}
