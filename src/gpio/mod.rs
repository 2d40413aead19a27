//! Pin backends.
//!
//! The controller only needs two primitives: drive an output pin to a level
//! and sample an input pin. [`PinBackend`] abstracts them so the door
//! service runs the same against real hardware and the in-memory mock.

pub mod mock;
#[cfg(feature = "rpi")]
pub mod rpi;

use std::sync::Arc;

use anyhow::Result;

use crate::config::{GpioBackendKind, GpioConfig};
use crate::models::DoorConfig;

pub use mock::MockPins;
#[cfg(feature = "rpi")]
pub use rpi::RppalPins;

/// Electrical level of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Logic low
    Low,
    /// Logic high
    High,
}

impl Level {
    /// Returns the level that means "active" for the given polarity.
    #[must_use]
    pub const fn active(active_low: bool) -> Self {
        if active_low {
            Self::Low
        } else {
            Self::High
        }
    }

    /// Returns the level that means "idle" for the given polarity.
    #[must_use]
    pub const fn idle(active_low: bool) -> Self {
        if active_low {
            Self::High
        } else {
            Self::Low
        }
    }
}

/// Access to the pins of the door table.
pub trait PinBackend: Send + Sync {
    /// Claims the pins of `doors`: action pins become outputs at `idle`,
    /// sensor pins become inputs.
    fn setup(&self, doors: &[DoorConfig], idle: Level) -> Result<()>;

    /// Drives an output pin.
    fn write(&self, pin: u8, level: Level) -> Result<()>;

    /// Samples an input pin.
    fn read(&self, pin: u8) -> Result<Level>;
}

/// Opens the backend selected in the configuration.
pub fn open(config: &GpioConfig) -> Result<Arc<dyn PinBackend>> {
    match config.backend {
        GpioBackendKind::Mock => Ok(Arc::new(MockPins::new())),
        GpioBackendKind::Rpi => open_rpi(),
    }
}

#[cfg(feature = "rpi")]
fn open_rpi() -> Result<Arc<dyn PinBackend>> {
    Ok(Arc::new(RppalPins::new()?))
}

#[cfg(not(feature = "rpi"))]
fn open_rpi() -> Result<Arc<dyn PinBackend>> {
    anyhow::bail!("The rpi GPIO backend is not available: rebuild with `--features rpi`")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_polarity() {
        assert_eq!(Level::active(false), Level::High);
        assert_eq!(Level::idle(false), Level::Low);
        assert_eq!(Level::active(true), Level::Low);
        assert_eq!(Level::idle(true), Level::High);
    }

    #[test]
    fn test_open_mock_backend() {
        let config = GpioConfig {
            backend: GpioBackendKind::Mock,
            ..GpioConfig::default()
        };
        let pins = open(&config).unwrap();
        pins.write(2, Level::High).unwrap();
        assert_eq!(pins.read(2).unwrap(), Level::High);
    }

    #[cfg(not(feature = "rpi"))]
    #[test]
    fn test_open_rpi_without_feature() {
        let config = GpioConfig {
            backend: GpioBackendKind::Rpi,
            ..GpioConfig::default()
        };
        let err = open(&config).err().unwrap();
        assert!(err.to_string().contains("--features rpi"));
    }
}
