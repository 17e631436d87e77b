//! Reads the TOML file, applies environment overrides and validates.

use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides `ledger.scid` without editing the file.
pub const SCID_ENV_VAR: &str = "SLOTMAIL_SCID";

fn joined(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", joined(.0))]
    Validation(Vec<ValidationError>),
}

fn apply_env(config: &mut AppConfig) {
    if let Ok(scid) = std::env::var(SCID_ENV_VAR) {
        tracing::debug!(env = SCID_ENV_VAR, "Contract id taken from environment");
        config.ledger.scid = scid;
    }
}

/// Parse a config document without touching the environment or validating.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let mut config = parse_config(&std::fs::read_to_string(path)?)?;
    apply_env(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load `path` if given, otherwise start from defaults.
///
/// Defaults are not validated here: offline commands need no contract id.
/// Anything that talks to the ledger validates before connecting.
pub fn load_or_default(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let mut config = AppConfig::default();
            apply_env(&mut config);
            Ok(config)
        }
    }
}
