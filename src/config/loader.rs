//! Configuration loading.
//!
//! Precedence, lowest to highest: built-in defaults, TOML file (`--config`),
//! command-line flags, environment (`PORT`).

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding the listening port.
pub const PORT_ENV: &str = "PORT";

/// Command-line arguments for the proxy binary.
#[derive(Debug, Default, Parser)]
#[command(name = "gatehouse", version, about = "Dynamic first-segment reverse proxy")]
pub struct CliArgs {
    /// Optional TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Port to listen on (default 8085; PORT env takes priority).
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ProxyConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Resolve the effective configuration from arguments and environment.
///
/// `env` looks up an environment variable; injected so precedence can be
/// tested without touching the process environment.
pub fn resolve_config<F>(args: &CliArgs, env: F) -> Result<ProxyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    config.listener.port = resolve_port(
        config.listener.port,
        args.port,
        env(PORT_ENV).as_deref(),
    );

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply port precedence: environment > flag > base.
///
/// An environment value that is not a valid port is ignored.
pub fn resolve_port(base: u16, flag: Option<u16>, env: Option<&str>) -> u16 {
    let port = flag.unwrap_or(base);
    match env {
        Some(raw) => match raw.trim().parse::<u16>() {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(value = %raw, error = %e, "Ignoring invalid {} value", PORT_ENV);
                port
            }
        },
        None => port,
    }
}
