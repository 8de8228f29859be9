use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::constants::{DEFAULT_API_BASE_URL, DEFAULT_DEBOUNCE_MS, DEFAULT_PAGE_SIZE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as URL: {source}")]
    ParseUrl {
        name: String,
        #[source]
        source: url::ParseError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Blog API
    pub api_base_url: Url,
    pub request_timeout: Duration,

    // Feed
    pub page_size: u64,
    pub debounce_window: Duration,

    // Initial filters for the demo session
    pub search_term: String,
    pub tag: String,

    // Local preferences
    pub prefs_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_env_url("API_BASE_URL", DEFAULT_API_BASE_URL)?,
            request_timeout: Duration::from_secs(parse_env_u64("REQUEST_TIMEOUT_SECS", 30)?),
            page_size: parse_env_u64("PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
            debounce_window: Duration::from_millis(parse_env_u64(
                "DEBOUNCE_MS",
                DEFAULT_DEBOUNCE_MS,
            )?),
            search_term: env_or_default("SEARCH_TERM", ""),
            tag: env_or_default("TAG", ""),
            prefs_path: PathBuf::from(env_or_default("PREFS_PATH", "./data/prefs.json")),
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "PAGE_SIZE".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.api_base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue {
                name: "API_BASE_URL".to_string(),
                message: "must be an absolute http(s) URL".to_string(),
            });
        }
        Ok(())
    }

    /// A configuration suitable for tests: defaults everywhere, no
    /// environment reads.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            api_base_url: Url::parse(DEFAULT_API_BASE_URL).expect("default base URL is valid"),
            request_timeout: Duration::from_secs(10),
            page_size: DEFAULT_PAGE_SIZE,
            debounce_window: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            search_term: String::new(),
            tag: String::new(),
            prefs_path: PathBuf::from("./data/prefs.json"),
        }
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_url(name: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = env_or_default(name, default);
    Url::parse(&raw).map_err(|e| ConfigError::ParseUrl {
        name: name.to_string(),
        source: e,
    })
}
