//! URL prefix under which messages are exposed.

use std::fmt;

use thiserror::Error;

/// Why a prefix was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrefixError {
    #[error("URL prefix must not be empty")]
    Empty,
    #[error("URL prefix must start with '/' (got {0:?})")]
    MissingLeadingSlash(String),
}

/// A validated prefix: starts and ends with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UrlPrefix(String);

impl UrlPrefix {
    /// Validate `raw` and append a trailing `/` if it lacks one.
    pub fn parse(raw: &str) -> Result<Self, PrefixError> {
        if raw.is_empty() {
            return Err(PrefixError::Empty);
        }
        if !raw.starts_with('/') {
            return Err(PrefixError::MissingLeadingSlash(raw.to_string()));
        }
        if raw.ends_with('/') {
            Ok(Self(raw.to_string()))
        } else {
            Ok(Self(format!("{raw}/")))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path a message is exposed under.
    pub fn path_for(&self, name: &str) -> String {
        format!("{}{}", self.0, name)
    }
}

impl Default for UrlPrefix {
    fn default() -> Self {
        Self("/".to_string())
    }
}

impl fmt::Display for UrlPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
