//! In-memory pin backend.
//!
//! Used by the tests and by the `mock` backend when running off-device.
//! Inputs can be set from the outside to simulate sensors; every write is
//! recorded so pulses can be inspected afterwards.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};

use super::{Level, PinBackend};
use crate::models::DoorConfig;

#[derive(Debug, Default)]
struct Inner {
    levels: HashMap<u8, Level>,
    writes: Vec<(u8, Level)>,
    failing: Option<u8>,
    failing_writes: Vec<(u8, Level)>,
}

/// Pins backed by a hash map.
///
/// Unset pins read as [`Level::High`], as a floating input with the pull-up
/// enabled would.
#[derive(Debug, Default)]
pub struct MockPins {
    inner: Mutex<Inner>,
}

impl MockPins {
    /// Creates an empty set of pins.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the level an input pin reports.
    pub fn set_input(&self, pin: u8, level: Level) {
        self.lock().levels.insert(pin, level);
    }

    /// Returns every write performed so far, in order.
    #[must_use]
    pub fn writes(&self) -> Vec<(u8, Level)> {
        self.lock().writes.clone()
    }

    /// Makes every access to `pin` fail, to exercise error paths.
    pub fn fail_on(&self, pin: u8) {
        self.lock().failing = Some(pin);
    }

    /// Makes the next write of `level` to `pin` fail once.
    ///
    /// Calls stack: each queued failure is consumed by one matching write.
    pub fn fail_write_once(&self, pin: u8, level: Level) {
        self.lock().failing_writes.push((pin, level));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl PinBackend for MockPins {
    fn setup(&self, doors: &[DoorConfig], idle: Level) -> Result<()> {
        let mut inner = self.lock();
        for door in doors {
            inner.levels.insert(door.action_pin, idle);
        }
        Ok(())
    }

    fn write(&self, pin: u8, level: Level) -> Result<()> {
        let mut inner = self.lock();
        if inner.failing == Some(pin) {
            return Err(anyhow!("mock pin {pin} failed"));
        }
        if let Some(pos) = inner.failing_writes.iter().position(|w| *w == (pin, level)) {
            inner.failing_writes.remove(pos);
            return Err(anyhow!("mock pin {pin} failed to write {level:?}"));
        }
        inner.levels.insert(pin, level);
        inner.writes.push((pin, level));
        Ok(())
    }

    fn read(&self, pin: u8) -> Result<Level> {
        let inner = self.lock();
        if inner.failing == Some(pin) {
            return Err(anyhow!("mock pin {pin} failed"));
        }
        Ok(inner.levels.get(&pin).copied().unwrap_or(Level::High))
    }
}
