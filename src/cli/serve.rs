//! Serve command: run the controller.

use std::net::SocketAddr;
use std::path::Path;

use clap::Args;
use tracing::{info, warn};

use crate::cli::common::{load_config, CliError, CliResult};
use crate::config::GpioBackendKind;
use crate::validator::ConfigValidator;
use crate::web;

/// Run the HTTP control API and the sensor monitor
#[derive(Debug, Clone, Default, Args)]
pub struct ServeArgs {
    /// Host to bind to (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Use in-memory pins instead of the configured backend
    #[arg(long)]
    pub mock: bool,
}

impl ServeArgs {
    /// Execute the serve command
    pub async fn execute(&self, config_path: Option<&Path>) -> CliResult<()> {
        let mut config = load_config(config_path)?;

        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.mock {
            config.gpio.backend = GpioBackendKind::Mock;
        }

        let report = ConfigValidator::new(&config).validate();
        for warning in &report.warnings {
            warn!("{}", warning);
        }
        if !report.is_valid() {
            return Err(CliError::validation(report.format_message()));
        }

        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| CliError::validation(format!("Invalid listen address: {e}")))?;

        info!("Using {:?} GPIO backend", config.gpio.backend);

        web::run_server(config, addr)
            .await
            .map_err(|e| CliError::io(format!("{e:#}")))
    }
}
