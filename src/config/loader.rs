//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::{GateConfig, Secrets};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load, resolve secrets from the process environment, and validate.
///
/// Without a path the built-in defaults are used.
pub fn load_config(path: Option<&Path>) -> Result<GateConfig, ConfigError> {
    let config = match path {
        Some(path) => parse_config(&fs::read_to_string(path).map_err(ConfigError::Io)?)?,
        None => GateConfig::default(),
    };
    finish(config, |name| std::env::var(name).ok())
}

/// Parse a TOML document without touching the environment.
pub fn parse_config(content: &str) -> Result<GateConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}

/// Resolve secrets with `lookup` and validate the result.
pub fn finish<F>(mut config: GateConfig, lookup: F) -> Result<GateConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    config.secrets = resolve_secrets(&config, lookup);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn resolve_secrets<F>(config: &GateConfig, lookup: F) -> Secrets
where
    F: Fn(&str) -> Option<String>,
{
    let read = |name: &str| {
        lookup(name)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };
    Secrets {
        identity_secret: read(&config.identity.secret_env),
        security_key: read(&config.security.key_env),
    }
}
