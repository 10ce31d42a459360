//! Reading `ShimConfig` from TOML.
//!
//! Parsing and validation are split from file access so the binary's `--config`
//! path and in-memory configs in tests go through the same checks.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::ShimConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Why a configuration was refused.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// The text is not valid TOML for `ShimConfig`.
    Parse(toml::de::Error),
    /// The config parsed but breaks one or more constraints, all of them listed.
    Validation(Vec<ValidationError>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "cannot read config {}: {}", path.display(), source)
            }
            ConfigError::Parse(e) => write!(f, "malformed config: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "invalid config ({} problem(s))", errors.len())?;
                for err in errors {
                    write!(f, "\n  {}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

/// Parse TOML text and run semantic validation on the result.
pub fn parse_config(content: &str) -> Result<ShimConfig, ConfigError> {
    let config: ShimConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Read `path` and hand its contents to [`parse_config`].
pub fn load_config(path: &Path) -> Result<ShimConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}
