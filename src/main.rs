//! Garage Door Controller
//!
//! Pulses garage door openers through relay pins, watches the end-stop
//! sensors, and serves a small signed HTTP API plus a control page.
//!
//! # Usage
//!
//! ```bash
//! # Write the default config, then edit the password and door table
//! garagedoor config init
//!
//! # Validate the door table
//! garagedoor check
//!
//! # Run the controller (default command)
//! garagedoor serve --port 8080
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use garagedoor::cli::{CheckArgs, CliResult, ConfigArgs, ServeArgs, SignArgs};
use garagedoor::constants::APP_NAME;

/// Garage door controller with a signed HTTP control API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the controller (default)
    Serve(ServeArgs),
    /// Validate the configuration
    Check(CheckArgs),
    /// Show or initialize the configuration
    Config(ConfigArgs),
    /// Print the request signature for a nonce
    Sign(SignArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{APP_NAME}: {e}");
        std::process::exit(e.exit_code.code());
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        None => ServeArgs::default().execute(config_path).await,
        Some(Command::Serve(args)) => args.execute(config_path).await,
        Some(Command::Check(args)) => args.execute(config_path),
        Some(Command::Config(args)) => args.execute(config_path),
        Some(Command::Sign(args)) => args.execute(config_path),
    }
}
