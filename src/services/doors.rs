//! Door control: relay pulses and sensor reads.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::gpio::{Level, PinBackend};
use crate::models::{DoorConfig, DoorState};

/// Drives the doors of the configured table.
pub struct DoorService {
    doors: Vec<DoorConfig>,
    pins: Arc<dyn PinBackend>,
    opening_delay: Duration,
    relay_active_low: bool,
    sensor_active_low: bool,
    /// Held for the whole pulse; one door moves at a time.
    trigger_lock: Mutex<()>,
}

impl DoorService {
    /// Creates the service and claims the pins of every door.
    ///
    /// Action pins are driven to their idle level before this returns.
    pub fn new(config: &Config, pins: Arc<dyn PinBackend>) -> Result<Self> {
        let relay_active_low = config.gpio.relay_active_low;

        pins.setup(&config.doors, Level::idle(relay_active_low))
            .context("Failed to set up door pins")?;

        Ok(Self {
            doors: config.doors.clone(),
            pins,
            opening_delay: config.opening_delay(),
            relay_active_low,
            sensor_active_low: config.gpio.sensor_active_low,
            trigger_lock: Mutex::new(()),
        })
    }

    /// Returns the door table.
    #[must_use]
    pub fn doors(&self) -> &[DoorConfig] {
        &self.doors
    }

    /// Number of doors.
    #[must_use]
    pub fn door_count(&self) -> usize {
        self.doors.len()
    }

    /// Looks up a door by index ("0", "1", ...) or by name.
    ///
    /// A numeric key is always treated as an index.
    #[must_use]
    pub fn resolve(&self, key: &str) -> Option<usize> {
        if let Ok(index) = key.parse::<usize>() {
            return (index < self.doors.len()).then_some(index);
        }

        self.doors.iter().position(|door| door.name == key)
    }

    fn door(&self, index: usize) -> Result<&DoorConfig> {
        self.doors
            .get(index)
            .ok_or_else(|| anyhow!("No door with index {index}"))
    }

    /// Pulses the action pin of a door for the opening delay.
    ///
    /// The pulse runs on its own task, so dropping the returned future
    /// does not leave the relay held.
    pub async fn trigger(self: &Arc<Self>, index: usize) -> Result<()> {
        self.door(index)?;

        let service = Arc::clone(self);
        tokio::spawn(async move { service.pulse(index).await })
            .await
            .context("Door trigger task failed")?
    }

    async fn pulse(&self, index: usize) -> Result<()> {
        let door = self.door(index)?;
        let _guard = self.trigger_lock.lock().await;

        info!("Triggering {} (pin {})", door.name, door.action_pin);

        self.pins
            .write(door.action_pin, Level::active(self.relay_active_low))
            .context(format!("Failed to activate action pin {}", door.action_pin))?;

        tokio::time::sleep(self.opening_delay).await;

        let idle = Level::idle(self.relay_active_low);
        if let Err(e) = self.pins.write(door.action_pin, idle) {
            error!(
                "Failed to release {} (pin {}): {e:#}, retrying",
                door.name, door.action_pin
            );
            self.pins.write(door.action_pin, idle).map_err(|e| {
                error!(
                    "Relay of {} is stuck active (pin {}): {e:#}",
                    door.name, door.action_pin
                );
                e.context(format!("Failed to release action pin {}", door.action_pin))
            })?;
        }

        debug!("Released {} after {:?}", door.name, self.opening_delay);
        Ok(())
    }

    /// Reads both sensors of a door.
    pub fn read_state(&self, index: usize) -> Result<DoorState> {
        let door = self.door(index)?;
        let active = Level::active(self.sensor_active_low);

        let open = self
            .pins
            .read(door.open_pin)
            .context(format!("Failed to read open sensor of {}", door.name))?;
        let closed = self
            .pins
            .read(door.closed_pin)
            .context(format!("Failed to read closed sensor of {}", door.name))?;

        Ok(DoorState::from_sensors(open == active, closed == active))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::MockPins;

    fn service_with(config: &Config) -> (Arc<DoorService>, Arc<MockPins>) {
        let pins = Arc::new(MockPins::new());
        let service = DoorService::new(config, pins.clone()).unwrap();
        (Arc::new(service), pins)
    }

    fn fast_config() -> Config {
        let mut config = Config::new();
        config.timing.opening_delay_ms = 5;
        config
    }

    #[test]
    fn test_resolve() {
        let (service, _) = service_with(&Config::new());
        assert_eq!(service.resolve("0"), Some(0));
        assert_eq!(service.resolve("1"), Some(1));
        assert_eq!(service.resolve("2"), None);
        assert_eq!(service.resolve("door2"), Some(1));
        assert_eq!(service.resolve("door3"), None);
        assert_eq!(service.resolve(""), None);
    }

    #[tokio::test]
    async fn test_trigger_pulses_action_pin() {
        let (service, pins) = service_with(&fast_config());
        service.trigger(1).await.unwrap();
        assert_eq!(pins.writes(), vec![(3, Level::High), (3, Level::Low)]);
    }

    #[tokio::test]
    async fn test_trigger_active_low_relay() {
        let mut config = fast_config();
        config.gpio.relay_active_low = true;
        let (service, pins) = service_with(&config);

        // Idle level applied at setup
        assert_eq!(pins.read(2).unwrap(), Level::High);

        service.trigger(0).await.unwrap();
        assert_eq!(pins.writes(), vec![(2, Level::Low), (2, Level::High)]);
    }

    #[tokio::test]
    async fn test_trigger_unknown_door() {
        let (service, pins) = service_with(&fast_config());
        assert!(service.trigger(7).await.is_err());
        assert!(pins.writes().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_triggers_do_not_overlap() {
        let (service, pins) = service_with(&fast_config());
        let (a, b) = tokio::join!(service.trigger(0), service.trigger(1));
        a.unwrap();
        b.unwrap();

        let writes = pins.writes();
        assert_eq!(writes.len(), 4);
        // Each activation is immediately followed by its own release
        assert_eq!(writes[0].0, writes[1].0);
        assert_eq!(writes[2].0, writes[3].0);
        assert_ne!(writes[0].0, writes[2].0);
    }

    #[tokio::test]
    async fn test_trigger_reports_pin_failure() {
        let (service, pins) = service_with(&fast_config());
        pins.fail_on(2);
        let err = service.trigger(0).await.unwrap_err();
        assert!(err.to_string().contains("action pin 2"));
    }

    #[tokio::test]
    async fn test_release_retried_after_write_failure() {
        let (service, pins) = service_with(&fast_config());
        pins.fail_write_once(2, Level::Low);

        service.trigger(0).await.unwrap();
        assert_eq!(pins.writes(), vec![(2, Level::High), (2, Level::Low)]);
    }

    #[tokio::test]
    async fn test_release_failing_twice_reports_stuck_pin() {
        let (service, pins) = service_with(&fast_config());
        pins.fail_write_once(2, Level::Low);
        pins.fail_write_once(2, Level::Low);

        let err = service.trigger(0).await.unwrap_err();
        assert!(err.to_string().contains("release action pin 2"));
        assert_eq!(pins.writes(), vec![(2, Level::High)]);
    }

    #[test]
    fn test_read_state_active_low_sensors() {
        let (service, pins) = service_with(&Config::new());

        // Both inputs float high: neither sensor active
        assert_eq!(service.read_state(0).unwrap(), DoorState::Moving);

        pins.set_input(6, Level::Low);
        assert_eq!(service.read_state(0).unwrap(), DoorState::Closed);

        pins.set_input(6, Level::High);
        pins.set_input(4, Level::Low);
        assert_eq!(service.read_state(0).unwrap(), DoorState::Open);

        pins.set_input(6, Level::Low);
        assert_eq!(service.read_state(0).unwrap(), DoorState::Fault);
    }

    #[test]
    fn test_read_state_active_high_sensors() {
        let mut config = Config::new();
        config.gpio.sensor_active_low = false;
        let (service, pins) = service_with(&config);

        pins.set_input(5, Level::High);
        pins.set_input(7, Level::Low);
        assert_eq!(service.read_state(1).unwrap(), DoorState::Open);
    }

    #[test]
    fn test_read_state_sensor_failure() {
        let (service, pins) = service_with(&Config::new());
        pins.fail_on(7);
        assert!(service.read_state(1).is_err());
        assert!(service.read_state(0).is_ok());
    }
}
