//! Application-wide constants.
//!
//! This module defines the application identity and the shipped door table.
//! The door table is what a fresh install uses until `config.toml` says
//! otherwise.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "Garage Door Controller";

/// The binary name of the application (used in command examples, lowercase).
pub const APP_BINARY_NAME: &str = "garagedoor";

/// Environment variable that overrides the configuration directory.
pub const CONFIG_DIR_ENV: &str = "GARAGEDOOR_CONFIG_DIR";

/// Shared secret used to sign door requests. Change it before deploying.
pub const DEFAULT_PASSWORD: &str = "your_defined_password";

/// Number of doors supported by the shipped table.
pub const NR_OF_DOORS: usize = 2;

/// How long the action pin is held active, in milliseconds.
pub const OPENING_DELAY_MS: u64 = 250;

/// How often the door sensors are sampled, in milliseconds.
pub const POLL_INTERVAL_MS: u64 = 500;

/// Default address the HTTP API binds to.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;

/// Pins that toggle the doors.
pub const ACTION_PINS: [u8; NR_OF_DOORS] = [2, 3];

/// Pins that report a fully open door.
pub const OPEN_PINS: [u8; NR_OF_DOORS] = [4, 5];

/// Pins that report a fully closed door.
pub const CLOSED_PINS: [u8; NR_OF_DOORS] = [6, 7];

/// Door names, indexed like the pin tables.
pub const DOOR_NAMES: [&str; NR_OF_DOORS] = ["door1", "door2"];
