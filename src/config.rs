//! Service configuration.
//!
//! ```text
//! agenda.toml (optional)
//!     → toml + serde (missing fields take defaults)
//!     → environment overrides (AGENDA_BIND)
//!     → validate
//!     → AppConfig, immutable for the life of the process
//! ```

use std::fmt;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::router::DEFAULT_API_PREFIX;

/// Environment variable naming the config file when no argument is given.
pub const CONFIG_ENV: &str = "AGENDA_CONFIG";
/// Environment variable overriding `bind_address`.
pub const BIND_ENV: &str = "AGENDA_BIND";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Socket address to listen on, e.g. `0.0.0.0:8080`.
    pub bind_address: String,

    /// Paths starting with this go to the API table. Must start and end with `/`.
    pub api_prefix: String,

    /// `tracing-subscriber` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_owned(),
            api_prefix: DEFAULT_API_PREFIX.to_owned(),
            log_filter: "agenda=info,info".to_owned(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", Problems(.0))]
    Validation(Vec<String>),
}

struct Problems<'a>(&'a [String]);

impl fmt::Display for Problems<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

impl AppConfig {
    /// Parses TOML text. Fields left out keep their defaults.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Applies overrides from `lookup`, normally [`std::env::var`].
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(bind) = lookup(BIND_ENV) {
            self.bind_address = bind;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();
        if self.bind_address.parse::<SocketAddr>().is_err() {
            problems.push(format!("bind_address `{}` is not a socket address", self.bind_address));
        }
        if !self.api_prefix.starts_with('/') || !self.api_prefix.ends_with('/') || self.api_prefix.len() < 2 {
            problems.push(format!("api_prefix `{}` must look like `/name/`", self.api_prefix));
        }
        if problems.is_empty() { Ok(()) } else { Err(ConfigError::Validation(problems)) }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_address.parse().map_err(|_| {
            ConfigError::Validation(vec![format!("bind_address `{}` is not a socket address", self.bind_address)])
        })
    }
}

/// Loads, overrides and validates the configuration.
///
/// With no `path` the defaults are used.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|source| ConfigError::Io { path: path.to_owned(), source })?;
            AppConfig::from_toml(&text)?
        }
        None => AppConfig::default(),
    };
    let config = config.with_overrides(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}
