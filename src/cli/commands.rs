use clap::Subcommand;

use super::check::CheckArgs;
use super::route::RouteArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Evaluate a request file against the configured authorizers
    Check(CheckArgs),

    /// Show which configured route handles a URL
    Route(RouteArgs),
}
