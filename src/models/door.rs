//! Door table entries and sensor-derived door state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{ACTION_PINS, CLOSED_PINS, DOOR_NAMES, OPEN_PINS};

/// One row of the door table.
///
/// A door is identified by its index in the table. The entry is read once
/// at startup and never changes while the controller runs.
///
/// # Validation
///
/// - Pins must be unique across every door and every role
/// - Name must be non-empty, unique, and contain only `[A-Za-z0-9_-]`
///
/// See [`crate::validator::ConfigValidator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorConfig {
    /// Short name used in logs and accepted in request paths (e.g., "door1")
    pub name: String,
    /// Pin pulsed to toggle the door opener
    pub action_pin: u8,
    /// Sensor pin that is active while the door is fully open
    pub open_pin: u8,
    /// Sensor pin that is active while the door is fully closed
    pub closed_pin: u8,
}

impl DoorConfig {
    /// Creates a new door entry.
    pub fn new(name: impl Into<String>, action_pin: u8, open_pin: u8, closed_pin: u8) -> Self {
        Self {
            name: name.into(),
            action_pin,
            open_pin,
            closed_pin,
        }
    }

    /// Builds the shipped door table from the pin constants.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        DOOR_NAMES
            .iter()
            .zip(ACTION_PINS)
            .zip(OPEN_PINS)
            .zip(CLOSED_PINS)
            .map(|(((name, action), open), closed)| Self::new(*name, action, open, closed))
            .collect()
    }

    /// Returns the three pins of this door, action pin first.
    #[must_use]
    pub const fn pins(&self) -> [u8; 3] {
        [self.action_pin, self.open_pin, self.closed_pin]
    }
}

/// Door position as reported by the two end-stop sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorState {
    /// Open sensor active, closed sensor inactive
    Open,
    /// Closed sensor active, open sensor inactive
    Closed,
    /// Neither sensor active: the door is between its end stops
    Moving,
    /// Both sensors active at once; wiring or sensor fault
    Fault,
    /// Not read successfully yet
    Unknown,
}

impl DoorState {
    /// Derives the state from whether each sensor is active.
    #[must_use]
    pub const fn from_sensors(open_active: bool, closed_active: bool) -> Self {
        match (open_active, closed_active) {
            (true, false) => Self::Open,
            (false, true) => Self::Closed,
            (false, false) => Self::Moving,
            (true, true) => Self::Fault,
        }
    }

    /// Returns the lowercase name used in the API and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Moving => "moving",
            Self::Fault => "fault",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last observed state of one door.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoorStatus {
    /// Index in the door table
    pub index: usize,
    /// Door name
    pub name: String,
    /// Current state
    pub state: DoorState,
    /// When the door entered this state (first observation after startup)
    pub since: DateTime<Utc>,
}
