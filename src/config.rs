//! Client configuration.
//!
//! Sources, lowest precedence first: built-in defaults, a TOML file
//! (`--config PATH`, else `config.toml` in the platform config dir when it
//! exists), `PATCHY_*` environment variables (a `.env` file is honored), and
//! finally the `--api` flag.
//!
//! ```toml
//! api_base_url = "http://localhost:7788/api"
//! search_debounce_ms = 200
//! route_debounce_ms = 300
//! http_timeout_secs = 10
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::api::DEFAULT_API_BASE;
use crate::search::query_sync::{DEFAULT_ROUTE_DEBOUNCE, DEFAULT_SEARCH_DEBOUNCE};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchyConfig {
    pub api_base_url: String,
    pub search_debounce_ms: u64,
    pub route_debounce_ms: u64,
    pub http_timeout_secs: u64,
}

impl Default for PatchyConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE.to_string(),
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE.as_millis() as u64,
            route_debounce_ms: DEFAULT_ROUTE_DEBOUNCE.as_millis() as u64,
            http_timeout_secs: 10,
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "patchy", "patchy")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

impl PatchyConfig {
    /// Load from `path`, or from the default location if it exists.
    ///
    /// An explicit path must exist; a missing default file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match default_config_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadFile {
            path: path.clone(),
            source,
        })?;
        let config =
            toml::from_str(&raw).map_err(|source| ConfigError::ParseToml { path, source })?;
        Ok(config)
    }

    /// Apply `PATCHY_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|key| dotenvy::var(key).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("PATCHY_API_URL") {
            self.api_base_url = url;
        }
        if let Some(ms) = parse_env(&lookup, "PATCHY_SEARCH_DEBOUNCE_MS")? {
            self.search_debounce_ms = ms;
        }
        if let Some(ms) = parse_env(&lookup, "PATCHY_ROUTE_DEBOUNCE_MS")? {
            self.route_debounce_ms = ms;
        }
        if let Some(secs) = parse_env(&lookup, "PATCHY_HTTP_TIMEOUT_SECS")? {
            self.http_timeout_secs = secs;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "api_base_url must be an http(s) URL, got {url:?}"
            )));
        }
        if self.route_debounce_ms < self.search_debounce_ms {
            return Err(ConfigError::Validation(format!(
                "route_debounce_ms ({}) must not be shorter than search_debounce_ms ({})",
                self.route_debounce_ms, self.search_debounce_ms
            )));
        }
        if self.http_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "http_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn route_debounce(&self) -> Duration {
        Duration::from_millis(self.route_debounce_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn parse_env<F>(lookup: &F, key: &'static str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { key, value }),
    }
}
