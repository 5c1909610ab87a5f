//! Process plumbing shared by the scripts and the CLI.
//!
//! Each entry point loads configuration, installs logging, runs one
//! workflow and turns its outcome into output plus an exit code.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;

use crate::config::schema::ObservabilityConfig;
use crate::config::{load_config, load_dotenv, AppConfig};
use crate::observability::logging;

/// Load `.env` and configuration, then start logging. Failures are logged here.
pub fn bootstrap(path: Option<&Path>) -> Option<AppConfig> {
    let dotenv = load_dotenv();
    match load_config(path) {
        Ok(config) => {
            logging::init(&config.observability);
            log_dotenv(&dotenv);
            tracing::debug!(network = %config.network.resolved_rpc_url(), "Configuration loaded");
            Some(config)
        }
        Err(e) => {
            logging::init(&ObservabilityConfig::default());
            log_dotenv(&dotenv);
            tracing::error!(error = %e, "Invalid configuration");
            None
        }
    }
}

/// Report the `.env` outcome once a subscriber is installed.
pub fn log_dotenv(result: &Result<Option<PathBuf>, dotenvy::Error>) {
    match result {
        Ok(Some(path)) => tracing::debug!(path = %path.display(), "Loaded .env"),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env"),
    }
}

/// Pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a successful result, or log the single failure of `action`.
pub fn finish<T, E>(action: &str, result: Result<T, E>) -> ExitCode
where
    T: Serialize,
    E: std::fmt::Display,
{
    match result {
        Ok(value) => match print_json(&value) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, "Failed to render result");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "Error occurred while {}", action);
            ExitCode::FAILURE
        }
    }
}
