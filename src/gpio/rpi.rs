//! Raspberry Pi GPIO through `rppal`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{anyhow, Context, Result};
use rppal::gpio::{self, Gpio, InputPin, OutputPin};
use tracing::debug;

use super::{Level, PinBackend};
use crate::models::DoorConfig;

impl From<Level> for gpio::Level {
    fn from(level: Level) -> Self {
        match level {
            Level::Low => Self::Low,
            Level::High => Self::High,
        }
    }
}

impl From<gpio::Level> for Level {
    fn from(level: gpio::Level) -> Self {
        match level {
            gpio::Level::Low => Self::Low,
            gpio::Level::High => Self::High,
        }
    }
}

#[derive(Default)]
struct Claimed {
    outputs: HashMap<u8, OutputPin>,
    inputs: HashMap<u8, InputPin>,
}

/// Pins claimed from `/dev/gpiomem` (BCM numbering).
pub struct RppalPins {
    gpio: Gpio,
    claimed: Mutex<Claimed>,
}

impl RppalPins {
    /// Opens the GPIO peripheral.
    pub fn new() -> Result<Self> {
        let gpio = Gpio::new().context("Failed to open GPIO peripheral")?;
        Ok(Self {
            gpio,
            claimed: Mutex::new(Claimed::default()),
        })
    }

    fn claimed(&self) -> MutexGuard<'_, Claimed> {
        self.claimed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PinBackend for RppalPins {
    fn setup(&self, doors: &[DoorConfig], idle: Level) -> Result<()> {
        let mut claimed = self.claimed();

        for door in doors {
            let pin = self
                .gpio
                .get(door.action_pin)
                .context(format!("Failed to claim action pin {}", door.action_pin))?;
            let output = match idle {
                Level::Low => pin.into_output_low(),
                Level::High => pin.into_output_high(),
            };
            claimed.outputs.insert(door.action_pin, output);

            for sensor in [door.open_pin, door.closed_pin] {
                let pin = self
                    .gpio
                    .get(sensor)
                    .context(format!("Failed to claim sensor pin {sensor}"))?;
                claimed.inputs.insert(sensor, pin.into_input_pullup());
            }

            debug!("Claimed pins {:?} for {}", door.pins(), door.name);
        }

        Ok(())
    }

    fn write(&self, pin: u8, level: Level) -> Result<()> {
        let mut claimed = self.claimed();
        let output = claimed
            .outputs
            .get_mut(&pin)
            .ok_or_else(|| anyhow!("Pin {pin} is not configured as an output"))?;
        output.write(level.into());
        Ok(())
    }

    fn read(&self, pin: u8) -> Result<Level> {
        let claimed = self.claimed();
        let input = claimed
            .inputs
            .get(&pin)
            .ok_or_else(|| anyhow!("Pin {pin} is not configured as an input"))?;
        Ok(input.read().into())
    }
}
