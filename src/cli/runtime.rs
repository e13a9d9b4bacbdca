use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ldp_authorizer::config::{default_config, parse_config_str};
use ldp_authorizer::AuthorizerConfig;
use tokio::fs;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const BASE_URL_ENV: &str = "LDP_AUTHZ_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/";

/// Logs go to stderr; stdout carries command output only.
pub fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

pub struct LoadedConfig {
    pub config: AuthorizerConfig,
    pub path: Option<PathBuf>,
}

/// Resolve the configuration: an explicit path must exist; otherwise
/// `./config/authz.yaml`, then `~/.config/ldp-authz/config.yaml`, then the
/// built-in single-route default.
pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let mut loaded = match config_path {
        Some(path) => LoadedConfig {
            config: read_config(path).await?,
            path: Some(path.clone()),
        },
        None => match discover_config_path() {
            Some(path) => LoadedConfig {
                config: read_config(&path).await?,
                path: Some(path),
            },
            None => {
                info!("Config file not found, using the default WAC route");
                LoadedConfig {
                    config: default_config(DEFAULT_BASE_URL),
                    path: None,
                }
            }
        },
    };
    apply_env_overrides(&mut loaded.config);
    Ok(loaded)
}

fn discover_config_path() -> Option<PathBuf> {
    let local_config = PathBuf::from("config/authz.yaml");
    if local_config.exists() {
        return Some(local_config);
    }
    let mut path = dirs::config_dir()?;
    path.push("ldp-authz");
    path.push("config.yaml");
    path.exists().then_some(path)
}

async fn read_config(path: &Path) -> Result<AuthorizerConfig> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config = parse_config_str(&content).context("Failed to parse config file")?;
    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

pub fn apply_env_overrides(config: &mut AuthorizerConfig) {
    if let Ok(base_url) = env::var(BASE_URL_ENV) {
        let base_url = base_url.trim();
        if !base_url.is_empty() {
            info!("Using base URL from {}: {}", BASE_URL_ENV, base_url);
            config.base_url = base_url.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[tokio::test]
    #[serial]
    async fn explicit_path_is_loaded() {
        env::remove_var(BASE_URL_ENV);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "base_url: http://pod.example/\nroutes:\n  - pattern: \"^/\"\n    chain: allow_all"
        )
        .unwrap();
        let path = file.path().to_path_buf();

        let loaded = load_config(Some(&path)).await.unwrap();
        assert_eq!(loaded.config.base_url, "http://pod.example/");
        assert_eq!(loaded.path, Some(path));
    }

    #[tokio::test]
    #[serial]
    async fn missing_explicit_path_is_an_error() {
        let path = PathBuf::from("/nonexistent/ldp-authz.yaml");
        assert!(load_config(Some(&path)).await.is_err());
    }

    #[test]
    #[serial]
    fn base_url_override_replaces_configured_value() {
        let mut config = default_config("http://pod.example/");
        env::set_var(BASE_URL_ENV, "https://other.example/");
        apply_env_overrides(&mut config);
        env::remove_var(BASE_URL_ENV);
        assert_eq!(config.base_url, "https://other.example/");
    }

    #[test]
    #[serial]
    fn blank_override_is_ignored() {
        let mut config = default_config("http://pod.example/");
        env::set_var(BASE_URL_ENV, "  ");
        apply_env_overrides(&mut config);
        env::remove_var(BASE_URL_ENV);
        assert_eq!(config.base_url, "http://pod.example/");
    }
}
