//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_ADMIN_KEY: &str = "ADMIN_PRIVATE_KEY";
pub const ENV_CUSTOMER_KEY: &str = "CUSTOMER_PRIVATE_KEY";
pub const ENV_PACKAGE_ID: &str = "PACKAGE_ID";
pub const ENV_CASH_REGISTRY: &str = "CASH_REGISTRY";
pub const ENV_NETWORK: &str = "SUI_NETWORK";
/// Optional path of a TOML file with tuning settings.
pub const ENV_CONFIG_PATH: &str = "SUISPRESSO_CONFIG";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load `.env` from the working directory or its parents, if present.
///
/// Runs before logging is installed, so the outcome is returned for the
/// caller to log.
pub fn load_dotenv() -> Result<Option<PathBuf>, dotenvy::Error> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Load a specific env file. A missing file is `Ok(None)`.
pub fn load_dotenv_from(path: &Path) -> Result<Option<PathBuf>, dotenvy::Error> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(Some(path.to_path_buf())),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Parse a TOML configuration file without validating it.
pub fn read_config_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Overlay environment values onto `config`.
pub fn apply_env<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    if let Some(key) = get(ENV_ADMIN_KEY) {
        config.signers.admin_key = Some(key);
    }
    if let Some(key) = get(ENV_CUSTOMER_KEY) {
        config.signers.customer_key = Some(key);
    }
    if let Some(id) = get(ENV_PACKAGE_ID) {
        config.contract.package_id = id.trim().to_string();
    }
    if let Some(id) = get(ENV_CASH_REGISTRY) {
        config.contract.cash_registry = id.trim().to_string();
    }
    if let Some(network) = get(ENV_NETWORK) {
        config.network.rpc_url = network.trim().to_string();
    }
}

/// Build configuration from an optional file and an environment lookup, then validate.
pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let file = path
        .map(Path::to_path_buf)
        .or_else(|| lookup(ENV_CONFIG_PATH).map(PathBuf::from));

    let mut config = match file {
        Some(file) => read_config_file(&file)?,
        None => AppConfig::default(),
    };
    apply_env(&mut config, lookup);

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load configuration for this process: `.env`, optional TOML file, environment.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    load_with(path, |name| std::env::var(name).ok())
}
