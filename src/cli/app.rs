use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error};

use super::check::cmd_check;
use super::commands::Commands;
use super::env::CliArgs;
use super::route::cmd_route;
use super::runtime::{init_logging, load_config};

/// Exit status for a request that was refused or had no route.
pub const EXIT_REFUSED: u8 = 2;

pub async fn run() -> Result<ExitCode> {
    let cli = CliArgs::parse();

    init_logging(&cli.log_level, cli.debug)?;
    debug!("Starting ldp-authz v{}", env!("CARGO_PKG_VERSION"));

    let loaded = load_config(cli.config.as_ref()).await?;
    if let Some(path) = &loaded.path {
        debug!(path = %path.display(), "configuration source");
    }
    let config = loaded.config;

    let result = match cli.command {
        Commands::Check(args) => cmd_check(args, &config, &cli.output)
            .await
            .map(|outcome| outcome.is_granted()),
        Commands::Route(args) => cmd_route(args, &config, &cli.output),
    };

    match result {
        Ok(true) => Ok(ExitCode::SUCCESS),
        Ok(false) => Ok(ExitCode::from(EXIT_REFUSED)),
        Err(err) => {
            error!("Command failed: {:#}", err);
            Err(err)
        }
    }
}
