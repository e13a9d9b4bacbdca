use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use ldp_authorizer::AuthorizerConfig;
use tracing::info;

use super::output::OutputFormat;
use crate::request::{evaluate, Outcome, RequestFile};

#[derive(Args, Clone, Debug)]
pub struct CheckArgs {
    /// Request file (JSON or YAML)
    #[arg(short, long, value_name = "FILE")]
    pub request: PathBuf,
}

pub async fn cmd_check(
    args: CheckArgs,
    config: &AuthorizerConfig,
    output: &OutputFormat,
) -> Result<Outcome> {
    let request = RequestFile::load(&args.request)
        .await
        .with_context(|| format!("Failed to load request {}", args.request.display()))?;
    let target = request.target.clone();
    let outcome = evaluate(request, config).await?;
    info!(%target, decision = outcome.decision, status = outcome.status, "check finished");

    output.emit(&outcome, || match (&outcome.identifier, outcome.mode) {
        (Some(identifier), Some(mode)) => format!(
            "{} {} ({} on {})",
            outcome.status, outcome.decision, mode, identifier
        ),
        (Some(identifier), None) => {
            format!("{} {} ({})", outcome.status, outcome.decision, identifier)
        }
        _ => match &outcome.reason {
            Some(reason) => format!("{} {}: {}", outcome.status, outcome.decision, reason),
            None => format!("{} {}", outcome.status, outcome.decision),
        },
    })?;
    Ok(outcome)
}
