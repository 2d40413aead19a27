//! End-to-end tests for `garagedoor config` commands.

use tempfile::TempDir;

mod fixtures;
use fixtures::*;

// ============================================================================
// Init Command Tests
// ============================================================================

#[test]
fn test_config_init_writes_defaults() {
    let temp_dir = TempDir::new().unwrap();

    let output = isolated_command(&["config", "init"], temp_dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(
        output.status.code(),
        Some(0),
        "Init should succeed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let content = std::fs::read_to_string(temp_dir.path().join("config.toml")).unwrap();
    assert!(content.contains("opening_delay_ms = 250"));
    assert!(content.contains("name = \"door1\""));
    assert!(content.contains("action_pin = 3"));
}

#[test]
fn test_config_init_refuses_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    write_config(&test_config(), temp_dir.path());

    let output = isolated_command(&["config", "init"], temp_dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("already exists"), "stderr: {stderr}");

    // The existing file is untouched
    let content = std::fs::read_to_string(temp_dir.path().join("config.toml")).unwrap();
    assert!(content.contains(TEST_PASSWORD));
}

#[test]
fn test_config_init_force() {
    let temp_dir = TempDir::new().unwrap();
    write_config(&test_config(), temp_dir.path());

    let output = isolated_command(&["config", "init", "--force"], temp_dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let content = std::fs::read_to_string(temp_dir.path().join("config.toml")).unwrap();
    assert!(!content.contains(TEST_PASSWORD));
}

#[test]
fn test_config_init_explicit_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("etc").join("garage.toml");

    let output = isolated_command(
        &["--config", path.to_str().unwrap(), "config", "init"],
        temp_dir.path(),
    )
    .output()
    .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    assert!(path.exists());
    assert!(!temp_dir.path().join("config.toml").exists());
}

// ============================================================================
// Show Command Tests
// ============================================================================

#[test]
fn test_config_show_masks_password() {
    let temp_dir = TempDir::new().unwrap();
    write_config(&test_config(), temp_dir.path());

    let output = isolated_command(&["config", "show"], temp_dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("********"));
    assert!(!stdout.contains(TEST_PASSWORD));
    assert!(stdout.contains("[[doors]]"));
}

#[test]
fn test_config_show_json_with_password() {
    let temp_dir = TempDir::new().unwrap();
    write_config(&test_config(), temp_dir.path());

    let output = isolated_command(&["config", "show", "--json", "--show-password"], temp_dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Should parse JSON output");
    assert_eq!(json["auth"]["password"], TEST_PASSWORD);
    assert_eq!(json["gpio"]["backend"], "mock");
    assert_eq!(json["doors"].as_array().unwrap().len(), 2);
    assert_eq!(json["doors"][1]["closed_pin"], 7);
}

#[test]
fn test_config_show_without_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();

    let output = isolated_command(&["config", "show", "--json"], temp_dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["timing"]["opening_delay_ms"], 250);
    assert_eq!(json["server"]["port"], 8080);
}

#[test]
fn test_config_show_unparseable_file() {
    let temp_dir = TempDir::new().unwrap();
    write_raw_config("[[doors]\nname = ", temp_dir.path());

    let output = isolated_command(&["config", "show"], temp_dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load configuration"));
}
