//! Routing configuration for assembling authorizer chains.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Static routing definition file.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorizerConfig {
    pub base_url: String,
    #[serde(default = "default_auxiliary_suffixes")]
    pub auxiliary_suffixes: Vec<String>,
    pub routes: Vec<RouteConfig>,
    #[serde(default)]
    pub audit: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouteConfig {
    pub pattern: String,
    pub chain: ChainKind,
    pub notes: Option<String>,
}

/// Authorizer chain installed for a route.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChainKind {
    /// Permission checks with auxiliary indirection and delete masking.
    WebAcl,
    AllowAll,
    DenyAll,
}

/// Errors surfaced while loading configuration or assembling chains.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to deserialize config: {0}")]
    Deserialize(String),
    #[error("invalid path pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("invalid base url: {0:?}")]
    InvalidBaseUrl(String),
}

fn default_auxiliary_suffixes() -> Vec<String> {
    vec![".acl".to_string(), ".meta".to_string()]
}

pub fn load_config_from_reader<R: Read>(mut reader: R) -> Result<AuthorizerConfig, ConfigError> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    parse_config_str(&buf)
}

pub fn load_config_from_path(path: impl AsRef<Path>) -> Result<AuthorizerConfig, ConfigError> {
    let file = File::open(path.as_ref())?;
    load_config_from_reader(file)
}

pub fn parse_config_str(raw: &str) -> Result<AuthorizerConfig, ConfigError> {
    match serde_json::from_str(raw) {
        Ok(config) => Ok(config),
        Err(json_err) => serde_yaml::from_str(raw).map_err(|yaml_err| {
            ConfigError::Deserialize(format!(
                "json error: {}; yaml error: {}",
                json_err, yaml_err
            ))
        }),
    }
}

/// Configuration used when no file is supplied: everything under the base
/// URL goes through the WAC chain.
pub fn default_config(base_url: impl Into<String>) -> AuthorizerConfig {
    AuthorizerConfig {
        base_url: base_url.into(),
        auxiliary_suffixes: default_auxiliary_suffixes(),
        routes: vec![RouteConfig {
            pattern: "^/.*".into(),
            chain: ChainKind::WebAcl,
            notes: Some("Default WAC chain for the whole pod space".into()),
        }],
        audit: false,
    }
}
