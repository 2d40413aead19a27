//! Door table validation.
//!
//! Checks the invariants the controller relies on before any pin is
//! touched: every physical pin has exactly one role, every door can be
//! addressed unambiguously, and the timing and secret are usable.

// Allow format! appended to String - more readable for building messages
#![allow(clippy::format_push_string)]

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::config::Config;
use crate::constants::DEFAULT_PASSWORD;

/// Validation result with specific errors and warnings.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Problems that prevent the controller from starting
    pub errors: Vec<ValidationError>,
    /// Non-critical warnings
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// Creates a new empty validation report.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Returns true if there are no errors (warnings are allowed).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Adds an error to the report.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Adds a warning to the report.
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Formats the report as a user-friendly message.
    #[must_use]
    pub fn format_message(&self) -> String {
        let mut message = String::new();

        if !self.errors.is_empty() {
            message.push_str(&format!("❌ {} validation errors:\n", self.errors.len()));
            for (idx, error) in self.errors.iter().enumerate() {
                message.push_str(&format!("  {}. {}\n", idx + 1, error));
            }
        }

        if !self.warnings.is_empty() {
            message.push_str(&format!("\n⚠️  {} warnings:\n", self.warnings.len()));
            for (idx, warning) in self.warnings.iter().enumerate() {
                message.push_str(&format!("  {}. {}\n", idx + 1, warning));
            }
        }

        message
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Type of validation error
    pub kind: ValidationErrorKind,
    /// Index of the door the error refers to
    pub door: Option<usize>,
    /// Human-readable error message
    pub message: String,
    /// Optional suggestion for fixing the error
    pub suggestion: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            door: None,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Sets the door context.
    #[must_use]
    pub const fn with_door(mut self, door: usize) -> Self {
        self.door = Some(door);
        self
    }

    /// Sets a suggestion for fixing the error.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(door) = self.door {
            write!(f, "Door {}: {}", door, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n     💡 {suggestion}")?;
        }

        Ok(())
    }
}

/// Types of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The door table is empty
    NoDoors,
    /// A pin is assigned more than once
    DuplicatePin,
    /// A door has an empty name
    EmptyName,
    /// A door name cannot appear in a URL path segment or reads as an index
    InvalidName,
    /// Two doors share a name
    DuplicateName,
    /// The shared secret is empty
    EmptyPassword,
    /// Opening delay or poll interval is zero
    InvalidTiming,
}

/// Validation warning.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Warning message
    pub message: String,
}

impl ValidationWarning {
    /// Creates a new validation warning.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Validates a [`Config`] against the door table invariants.
pub struct ConfigValidator<'a> {
    config: &'a Config,
}

impl<'a> ConfigValidator<'a> {
    /// Creates a new validator.
    #[must_use]
    pub const fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Runs every check and collects the findings.
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();

        if self.config.doors.is_empty() {
            report.add_error(
                ValidationError::new(ValidationErrorKind::NoDoors, "No doors configured")
                    .with_suggestion("Add at least one [[doors]] entry to config.toml"),
            );
        }

        self.check_pins(&mut report);
        self.check_names(&mut report);
        self.check_auth(&mut report);
        self.check_timing(&mut report);

        report
    }

    /// Every pin may appear once, in one role, on one door.
    fn check_pins(&self, report: &mut ValidationReport) {
        let mut owners: HashMap<u8, (usize, &'static str)> = HashMap::new();

        for (index, door) in self.config.doors.iter().enumerate() {
            let roles = [
                (door.action_pin, "action"),
                (door.open_pin, "open"),
                (door.closed_pin, "closed"),
            ];

            for (pin, role) in roles {
                if let Some((owner, owner_role)) = owners.get(&pin) {
                    report.add_error(
                        ValidationError::new(
                            ValidationErrorKind::DuplicatePin,
                            format!(
                                "{role} pin {pin} is already used as the {owner_role} pin of door {owner}"
                            ),
                        )
                        .with_door(index),
                    );
                } else {
                    owners.insert(pin, (index, role));
                }
            }
        }
    }

    fn check_names(&self, report: &mut ValidationReport) {
        let mut seen = HashSet::new();

        for (index, door) in self.config.doors.iter().enumerate() {
            if door.name.is_empty() {
                report.add_error(
                    ValidationError::new(ValidationErrorKind::EmptyName, "Name cannot be empty")
                        .with_door(index),
                );
                continue;
            }

            if !is_path_safe(&door.name) {
                report.add_error(
                    ValidationError::new(
                        ValidationErrorKind::InvalidName,
                        format!("Name '{}' contains unsupported characters", door.name),
                    )
                    .with_door(index)
                    .with_suggestion("Use only letters, digits, '-' and '_'"),
                );
            } else if door.name.parse::<usize>().is_ok() {
                report.add_error(
                    ValidationError::new(
                        ValidationErrorKind::InvalidName,
                        format!("Name '{}' would be read as a door index", door.name),
                    )
                    .with_door(index)
                    .with_suggestion("Include at least one letter, e.g. 'door1'"),
                );
            }

            if !seen.insert(door.name.as_str()) {
                report.add_error(
                    ValidationError::new(
                        ValidationErrorKind::DuplicateName,
                        format!("Name '{}' is used by more than one door", door.name),
                    )
                    .with_door(index),
                );
            }
        }
    }

    fn check_auth(&self, report: &mut ValidationReport) {
        let password = &self.config.auth.password;

        if password.is_empty() {
            report.add_error(
                ValidationError::new(ValidationErrorKind::EmptyPassword, "Password cannot be empty")
                    .with_suggestion("Set [auth] password in config.toml"),
            );
        } else if password == DEFAULT_PASSWORD {
            report.add_warning(ValidationWarning::new(
                "The shipped default password is in use; anyone who knows it can open the doors",
            ));
        }
    }

    fn check_timing(&self, report: &mut ValidationReport) {
        let timing = &self.config.timing;

        if timing.opening_delay_ms == 0 {
            report.add_error(ValidationError::new(
                ValidationErrorKind::InvalidTiming,
                "opening_delay_ms must be greater than zero",
            ));
        }

        if timing.poll_interval_ms == 0 {
            report.add_error(ValidationError::new(
                ValidationErrorKind::InvalidTiming,
                "poll_interval_ms must be greater than zero",
            ));
        }
    }
}

/// Door names double as URL path segments.
fn is_path_safe(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
