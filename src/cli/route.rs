use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use ldp_authorizer::{build_router, AuthorizerConfig, ChainKind, InMemoryResourceSet};
use serde::Serialize;

use super::output::OutputFormat;

#[derive(Args, Clone, Debug)]
pub struct RouteArgs {
    /// Absolute URL of the resource
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct RouteMatch {
    pub url: String,
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<ChainKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Returns whether a route matched.
pub fn cmd_route(args: RouteArgs, config: &AuthorizerConfig, output: &OutputFormat) -> Result<bool> {
    let router = build_router(config, Arc::new(InMemoryResourceSet::new()))?;
    let index = router.route_index(&args.url);
    let route = index.and_then(|index| config.routes.get(index));

    let found = RouteMatch {
        url: args.url,
        index,
        pattern: route.map(|route| route.pattern.clone()),
        chain: route.map(|route| route.chain),
        notes: route.and_then(|route| route.notes.clone()),
    };

    output.emit(&found, || match (&found.index, &found.pattern) {
        (Some(index), Some(pattern)) => format!("route #{index}: {pattern}"),
        _ => format!("no route for {}", found.url),
    })?;
    Ok(found.index.is_some())
}
