//! Environment-backed configuration helpers.
//!
//! Settings structs across the workspace load themselves through an
//! [`EnvSource`], which reads the process environment in production and a
//! plain map in tests.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid URL format
    #[error("Invalid URL for {field}: {reason}")]
    InvalidUrl {
        /// Setting name
        field: String,
        /// Parser message
        reason: String,
    },

    /// Missing required field
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    /// Environment variable parse error
    #[error("Failed to parse environment variable {name}: {reason}")]
    ParseError {
        /// Variable name
        name: String,
        /// Parser message
        reason: String,
    },

    /// A value parsed but is out of range
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue {
        /// Setting name
        name: String,
        /// What is wrong with it
        reason: String,
    },
}

impl ConfigError {
    /// Create an invalid value error.
    #[must_use]
    pub fn invalid_value(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

type Lookup<'a> = Box<dyn Fn(&str) -> Option<String> + Send + Sync + 'a>;

/// Source of raw configuration values.
pub struct EnvSource<'a> {
    lookup: Lookup<'a>,
}

impl std::fmt::Debug for EnvSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvSource").finish_non_exhaustive()
    }
}

impl EnvSource<'static> {
    /// Read from the process environment.
    #[must_use]
    pub fn process() -> Self {
        Self {
            lookup: Box::new(|name| std::env::var(name).ok()),
        }
    }
}

impl<'a> EnvSource<'a> {
    /// Read from an in-memory map.
    #[must_use]
    pub fn from_map(values: &'a HashMap<String, String>) -> Self {
        Self {
            lookup: Box::new(move |name| values.get(name).cloned()),
        }
    }

    /// Read through an arbitrary lookup function.
    #[must_use]
    pub fn from_fn(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'a) -> Self {
        Self {
            lookup: Box::new(lookup),
        }
    }

    /// Raw value, with blank values treated as unset.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.trim().is_empty())
    }

    /// String value or a default.
    #[must_use]
    pub fn string(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    /// Required string value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequired`] when the variable is unset or blank.
    pub fn required(&self, name: &str) -> Result<String, ConfigError> {
        self.get(name)
            .ok_or_else(|| ConfigError::MissingRequired(name.to_string()))
    }

    /// Parse a value with a default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] when the value does not parse.
    pub fn parse<T: FromStr>(&self, name: &str, default: T) -> Result<T, ConfigError>
    where
        T::Err: std::fmt::Display,
    {
        match self.get(name) {
            Some(val) => val.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
                name: name.to_string(),
                reason: e.to_string(),
            }),
            None => Ok(default),
        }
    }

    /// Parse a whole number of seconds into a duration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] when the value is not an unsigned integer.
    pub fn seconds(&self, name: &str, default_secs: u64) -> Result<Duration, ConfigError> {
        self.parse(name, default_secs).map(Duration::from_secs)
    }

    /// Parse a URL, falling back to `default` when unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequired`] when unset without default, or
    /// [`ConfigError::InvalidUrl`] when the value is not a URL.
    pub fn url(&self, name: &str, default: Option<&str>) -> Result<Url, ConfigError> {
        let raw = match (self.get(name), default) {
            (Some(v), _) => v,
            (None, Some(d)) => d.to_string(),
            (None, None) => return Err(ConfigError::MissingRequired(name.to_string())),
        };
        Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl {
            field: name.to_string(),
            reason: e.to_string(),
        })
    }

    /// Parse a comma-separated list.
    #[must_use]
    pub fn list(&self, name: &str) -> Vec<String> {
        self.get(name)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }
}
