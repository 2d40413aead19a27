//! Garage door controller library.
//!
//! The door table (relay and sensor pins per door) drives everything else:
//! relay pulses, sensor polling, and an HTTP API whose requests are signed
//! with a shared secret.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod gpio;
pub mod models;
pub mod services;
pub mod validator;
pub mod web;
