//! Service layer for business logic.
//!
//! Services sit between the pin backend and the outer surfaces (HTTP and
//! CLI): door control, request authorization, and sensor monitoring.

pub mod auth;
pub mod doors;
pub mod monitor;

pub use auth::{AuthOutcome, Authenticator};
pub use doors::DoorService;
pub use monitor::{DoorMonitor, Transition};
