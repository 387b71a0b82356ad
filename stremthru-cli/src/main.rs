//! StremThru CLI
//!
//! Runs a single store operation and prints its `data` as JSON on stdout.
//!
//! Configuration is layered: `--config` file, then `STREMTHRU_*`
//! environment variables (e.g. `STREMTHRU_CLIENT__BASE_URL`), then flags.

mod cli;
mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::Parser;
use stremthru::StremThru;
use tracing::{debug, error};

use crate::cli::Cli;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load configuration
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply(&mut config);

    // 2. Validate configuration (fail fast on misconfigurations)
    if let Err(errors) = config.validate() {
        for e in &errors {
            eprintln!("Config validation error: {e}");
        }
        return Err(anyhow::anyhow!(
            "Configuration validation failed with {} error(s)",
            errors.len()
        ));
    }

    // 3. Initialize logging
    logging::init_logging(&config.logging)?;
    debug!(base_url = %config.client.base_url, "StremThru client configured");

    let client = StremThru::with_config(config.client)?;

    match commands::execute(&cli.command, &client).await {
        Ok(data) => {
            println!("{}", serde_json::to_string_pretty(&data)?);
            Ok(())
        }
        Err(err) => {
            if let Some(api) = err.as_api_error() {
                error!(
                    code = %api.code(),
                    error_type = %api.error_type(),
                    status = %api.status_code(),
                    request_id = api.request_id().unwrap_or_default(),
                    "StremThru request failed"
                );
                eprintln!(
                    "{} [code={} type={} status={}]",
                    api.message(),
                    api.code(),
                    api.error_type(),
                    api.status_code().as_u16()
                );
            }
            Err(err.into())
        }
    }
}
