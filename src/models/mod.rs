//! Data models for the door table and door state.
//!
//! Models are independent of the pin backend and the web layer.

pub mod door;

pub use door::{DoorConfig, DoorState, DoorStatus};
