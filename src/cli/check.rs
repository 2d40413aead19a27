//! Check command: validate the door table and settings.

use std::path::Path;

use clap::Args;
use serde::Serialize;

use crate::cli::common::{load_config, print_json, CliError, CliResult};
use crate::config::Config;
use crate::validator::{ConfigValidator, ValidationReport};

/// Validate the configuration without touching any pin
#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Treat warnings as errors (exit non-zero)
    #[arg(long)]
    pub strict: bool,
}

#[derive(Serialize, Debug)]
struct CheckResponse {
    valid: bool,
    errors: Vec<CheckMessage>,
    warnings: Vec<String>,
    doors: Vec<DoorRow>,
}

#[derive(Serialize, Debug)]
struct CheckMessage {
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    door: Option<usize>,
    message: String,
}

#[derive(Serialize, Debug)]
struct DoorRow {
    index: usize,
    name: String,
    action_pin: u8,
    open_pin: u8,
    closed_pin: u8,
}

impl CheckArgs {
    /// Execute the check command
    pub fn execute(&self, config_path: Option<&Path>) -> CliResult<()> {
        let config = load_config(config_path)?;
        let report = ConfigValidator::new(&config).validate();

        if self.json {
            print_json(&build_response(&config, &report))?;
        } else {
            print_human_readable(&config, &report);
        }

        if !report.is_valid() {
            return Err(CliError::validation(format!(
                "Configuration has {} error(s)",
                report.errors.len()
            )));
        }

        if self.strict && !report.warnings.is_empty() {
            return Err(CliError::validation(format!(
                "Configuration has {} warning(s) (--strict)",
                report.warnings.len()
            )));
        }

        Ok(())
    }
}

fn build_response(config: &Config, report: &ValidationReport) -> CheckResponse {
    CheckResponse {
        valid: report.is_valid(),
        errors: report
            .errors
            .iter()
            .map(|e| CheckMessage {
                kind: format!("{:?}", e.kind),
                door: e.door,
                message: e.message.clone(),
            })
            .collect(),
        warnings: report.warnings.iter().map(ToString::to_string).collect(),
        doors: config
            .doors
            .iter()
            .enumerate()
            .map(|(index, door)| DoorRow {
                index,
                name: door.name.clone(),
                action_pin: door.action_pin,
                open_pin: door.open_pin,
                closed_pin: door.closed_pin,
            })
            .collect(),
    }
}

fn print_human_readable(config: &Config, report: &ValidationReport) {
    println!("Doors ({}):", config.door_count());
    println!("  #  {:<12} {:>6} {:>6} {:>6}", "name", "action", "open", "closed");
    for (index, door) in config.doors.iter().enumerate() {
        println!(
            "  {index}  {:<12} {:>6} {:>6} {:>6}",
            door.name, door.action_pin, door.open_pin, door.closed_pin
        );
    }
    println!();
    println!(
        "Opening delay: {} ms, poll interval: {} ms",
        config.timing.opening_delay_ms, config.timing.poll_interval_ms
    );
    println!();

    if report.errors.is_empty() && report.warnings.is_empty() {
        println!("✓ Configuration is valid");
    } else {
        print!("{}", report.format_message());
    }
}
