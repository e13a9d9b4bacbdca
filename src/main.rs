use std::process::ExitCode;

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    ldp_authz_cli::cli::app::run().await
}
