//! Sensor polling loop.
//!
//! Keeps the last observed state of every door together with the time it
//! was entered, and logs each change.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::models::{DoorState, DoorStatus};
use crate::services::doors::DoorService;

/// A state change observed by [`DoorMonitor::poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Index in the door table
    pub index: usize,
    /// State before the change
    pub from: DoorState,
    /// State after the change
    pub to: DoorState,
}

/// Tracks the state of every door.
pub struct DoorMonitor {
    doors: Arc<DoorService>,
    snapshots: RwLock<Vec<DoorStatus>>,
}

impl DoorMonitor {
    /// Creates a monitor with every door in [`DoorState::Unknown`].
    #[must_use]
    pub fn new(doors: Arc<DoorService>) -> Self {
        let now = Utc::now();
        let snapshots = doors
            .doors()
            .iter()
            .enumerate()
            .map(|(index, door)| DoorStatus {
                index,
                name: door.name.clone(),
                state: DoorState::Unknown,
                since: now,
            })
            .collect();

        Self {
            doors,
            snapshots: RwLock::new(snapshots),
        }
    }

    /// Samples every door once and records the changes.
    ///
    /// A door whose sensors cannot be read keeps its previous state.
    pub fn poll(&self) -> Vec<Transition> {
        let readings: Vec<_> = (0..self.doors.door_count())
            .map(|index| (index, self.doors.read_state(index)))
            .collect();

        let now = Utc::now();
        let mut snapshots = self.snapshots.write().unwrap_or_else(PoisonError::into_inner);
        let mut transitions = Vec::new();

        for (index, reading) in readings {
            let snapshot = &mut snapshots[index];

            match reading {
                Ok(state) if state != snapshot.state => {
                    info!("{} is now {} (was {})", snapshot.name, state, snapshot.state);
                    transitions.push(Transition {
                        index,
                        from: snapshot.state,
                        to: state,
                    });
                    snapshot.state = state;
                    snapshot.since = now;
                }
                Ok(_) => {}
                Err(e) => warn!("Failed to read sensors of {}: {:#}", snapshot.name, e),
            }
        }

        transitions
    }

    /// Returns the last observed status of every door.
    #[must_use]
    pub fn statuses(&self) -> Vec<DoorStatus> {
        self.snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the last observed status of one door.
    #[must_use]
    pub fn status(&self, index: usize) -> Option<DoorStatus> {
        self.snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(index)
            .cloned()
    }

    /// Polls on a fixed interval until the returned task is aborted.
    pub fn spawn(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.poll();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::gpio::{Level, MockPins};

    fn monitor() -> (DoorMonitor, Arc<MockPins>) {
        let pins = Arc::new(MockPins::new());
        let doors = DoorService::new(&Config::new(), pins.clone()).unwrap();
        (DoorMonitor::new(Arc::new(doors)), pins)
    }

    #[test]
    fn test_starts_unknown() {
        let (monitor, _) = monitor();
        let statuses = monitor.statuses();
        assert_eq!(statuses.len(), 2);
        assert!(statuses.iter().all(|s| s.state == DoorState::Unknown));
        assert_eq!(statuses[1].name, "door2");
    }

    #[test]
    fn test_poll_reports_transitions_once() {
        let (monitor, pins) = monitor();
        pins.set_input(6, Level::Low);

        let transitions = monitor.poll();
        assert_eq!(
            transitions,
            vec![
                Transition {
                    index: 0,
                    from: DoorState::Unknown,
                    to: DoorState::Closed,
                },
                Transition {
                    index: 1,
                    from: DoorState::Unknown,
                    to: DoorState::Moving,
                },
            ]
        );

        assert!(monitor.poll().is_empty());
        assert_eq!(monitor.status(0).unwrap().state, DoorState::Closed);
    }

    #[test]
    fn test_since_changes_only_on_transition() {
        let (monitor, pins) = monitor();
        pins.set_input(6, Level::Low);
        monitor.poll();
        let first = monitor.status(0).unwrap().since;

        monitor.poll();
        assert_eq!(monitor.status(0).unwrap().since, first);

        pins.set_input(6, Level::High);
        monitor.poll();
        let moved = monitor.status(0).unwrap();
        assert_eq!(moved.state, DoorState::Moving);
        assert!(moved.since >= first);
    }

    #[test]
    fn test_read_failure_keeps_previous_state() {
        let (monitor, pins) = monitor();
        pins.set_input(5, Level::Low);
        monitor.poll();
        assert_eq!(monitor.status(1).unwrap().state, DoorState::Open);

        pins.fail_on(5);
        assert!(monitor.poll().is_empty());
        assert_eq!(monitor.status(1).unwrap().state, DoorState::Open);
    }

    #[test]
    fn test_status_out_of_range() {
        let (monitor, _) = monitor();
        assert!(monitor.status(2).is_none());
    }

    #[tokio::test]
    async fn test_spawned_loop_polls() {
        let (monitor, pins) = monitor();
        pins.set_input(4, Level::Low);
        let monitor = Arc::new(monitor);

        let handle = Arc::clone(&monitor).spawn(Duration::from_millis(1));
        // The first tick completes immediately
        for _ in 0..50 {
            if monitor.status(0).unwrap().state == DoorState::Open {
                break;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        handle.abort();

        assert_eq!(monitor.status(0).unwrap().state, DoorState::Open);
    }
}
