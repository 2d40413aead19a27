//! Configuration management CLI commands.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};

use crate::cli::common::{load_config, print_json, CliError, CliResult};
use crate::config::Config;

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Write the default configuration file
    Init(ConfigInitArgs),
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Print the password instead of masking it
    #[arg(long)]
    show_password: bool,
}

/// Write the default configuration file
#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

const MASK: &str = "********";

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self, config_path: Option<&Path>) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(config_path),
            ConfigCommand::Init(args) => args.execute(config_path),
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self, config_path: Option<&Path>) -> CliResult<()> {
        let mut config = load_config(config_path)?;

        if !self.show_password {
            config.auth.password = MASK.to_string();
        }

        if self.json {
            print_json(&config)
        } else {
            let toml = toml::to_string_pretty(&config)
                .map_err(|e| CliError::io(format!("Failed to serialize configuration: {e}")))?;
            print!("{toml}");
            Ok(())
        }
    }
}

impl ConfigInitArgs {
    /// Execute init command
    pub fn execute(&self, config_path: Option<&Path>) -> CliResult<()> {
        let path: PathBuf = match config_path {
            Some(path) => path.to_path_buf(),
            None => Config::config_file_path()
                .map_err(|e| CliError::io(format!("Failed to locate config file: {e}")))?,
        };

        if path.exists() && !self.force {
            return Err(CliError::validation(format!(
                "Config file already exists: {} (use --force to overwrite)",
                path.display()
            )));
        }

        Config::new()
            .save_to(&path)
            .map_err(|e| CliError::io(format!("Failed to write configuration: {e:#}")))?;

        println!("✓ Wrote default configuration to {}", path.display());
        println!("  Change [auth] password before exposing the controller.");
        Ok(())
    }
}
