use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::config::ConfigError;
use crate::{Authorizer, AuthorizerError, AuthorizerInput, Decision, NotApplicable};

struct Route {
    pattern: Regex,
    authorizer: Arc<dyn Authorizer>,
}

/// Routes requests to an authorizer chain by matching the target path,
/// relative to the base URL, against an ordered list of patterns.
///
/// The relative path keeps its leading slash. Patterns are tried in the
/// order given and the first match wins, even when a later pattern also
/// matches.
pub struct PathBasedAuthorizer {
    base_url: String,
    routes: Vec<Route>,
}

impl PathBasedAuthorizer {
    pub fn new<I, P>(base_url: impl AsRef<str>, routes: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (P, Arc<dyn Authorizer>)>,
        P: AsRef<str>,
    {
        let base_url = base_url.as_ref();
        if base_url.is_empty() {
            return Err(ConfigError::InvalidBaseUrl(base_url.to_string()));
        }
        let base_url = base_url.trim_end_matches('/').to_string();

        let routes = routes
            .into_iter()
            .map(|(pattern, authorizer)| {
                let pattern = pattern.as_ref();
                Regex::new(pattern)
                    .map(|pattern| Route {
                        pattern,
                        authorizer,
                    })
                    .map_err(|err| ConfigError::InvalidPattern {
                        pattern: pattern.to_string(),
                        reason: err.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { base_url, routes })
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|route| route.pattern.as_str())
    }

    /// Index of the route that would handle `url`.
    pub fn route_index(&self, url: &str) -> Option<usize> {
        let relative = self.relative_path(url)?;
        self.routes
            .iter()
            .position(|route| route.pattern.is_match(relative))
    }

    fn relative_path<'a>(&self, url: &'a str) -> Option<&'a str> {
        let relative = url.strip_prefix(self.base_url.as_str())?;
        if relative.is_empty() {
            Some("/")
        } else if relative.starts_with('/') {
            Some(relative)
        } else {
            None
        }
    }

    fn find(&self, input: &AuthorizerInput) -> Result<&Arc<dyn Authorizer>, NotApplicable> {
        let url = input.target.as_str();
        let index = self.route_index(url).ok_or_else(|| {
            NotApplicable::new(format!("no configured path pattern matches {url}"))
        })?;
        let route = &self.routes[index];
        debug!(
            target = "ldp-authorizer",
            %url,
            pattern = route.pattern.as_str(),
            index,
            "routed request"
        );
        Ok(&route.authorizer)
    }
}

#[async_trait]
impl Authorizer for PathBasedAuthorizer {
    async fn can_handle(&self, input: &AuthorizerInput) -> Result<(), NotApplicable> {
        self.find(input)?.can_handle(input).await
    }

    async fn handle(&self, input: &AuthorizerInput) -> Result<Decision, AuthorizerError> {
        match self.find(input) {
            Ok(authorizer) => authorizer.handle(input).await,
            Err(signal) => Ok(Decision::NotApplicable(signal)),
        }
    }
}
