//! Sign command: compute a request signature for scripting.

use std::path::Path;

use clap::Args;

use crate::cli::common::{load_config, CliError, CliResult};
use crate::services::auth;

/// Print the signature for a nonce using the configured password
///
/// Example: `curl -X POST http://garage:8080/$N/door1/$(garagedoor sign $N)`
#[derive(Debug, Clone, Args)]
pub struct SignArgs {
    /// Nonce to sign
    pub nonce: u64,
}

impl SignArgs {
    /// Execute the sign command
    pub fn execute(&self, config_path: Option<&Path>) -> CliResult<()> {
        let config = load_config(config_path)?;
        let signature = auth::signature(&config.auth.password, self.nonce)
            .map_err(|e| CliError::validation(e.to_string()))?;
        println!("{signature}");
        Ok(())
    }
}
