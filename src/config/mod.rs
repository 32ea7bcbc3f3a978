//! Configuration loading and management
//!
//! The client reads an optional YAML file and then applies environment
//! overrides:
//!
//! ```yaml
//! base_url: "https://pos.example.com"
//! timeout_secs: 15
//! read_retries: 3
//! retry_base_delay_ms: 500
//! notification_capacity: 256
//! ```
//!
//! | Variable | Field |
//! |---|---|
//! | `STOCKROOM_API_BASE_URL` | `base_url` |
//! | `STOCKROOM_TIMEOUT_SECS` | `timeout_secs` |
//! | `STOCKROOM_READ_RETRIES` | `read_retries` |

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_BASE_URL: &str = "STOCKROOM_API_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "STOCKROOM_TIMEOUT_SECS";
pub const ENV_READ_RETRIES: &str = "STOCKROOM_READ_RETRIES";

/// Settings for talking to the back-office REST service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Root of the REST service, without a trailing slash
    pub base_url: String,

    /// Per-request timeout
    pub timeout_secs: u64,

    /// Failed GET attempts tolerated before giving up
    pub read_retries: u32,

    /// First retry delay; doubles on every further attempt
    pub retry_base_delay_ms: u64,

    /// Buffer size of the notification channel
    pub notification_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
            read_retries: 3,
            retry_base_delay_ms: 1000,
            notification_capacity: 256,
        }
    }
}

impl ClientConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str::<Self>(&content)
            .map_err(|e| ConfigError::ParseError {
                file: Some(path.display().to_string()),
                message: e.to_string(),
            })?
            .validated()
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str::<Self>(yaml)?.validated()
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Apply `STOCKROOM_*` variables from the process environment
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (the environment in production)
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = parse_number(ENV_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_READ_RETRIES) {
            self.read_retries = parse_number(ENV_READ_RETRIES, &raw)?;
        }
        self.validated()
    }

    /// Normalize and check the values
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();

        let url = reqwest::Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidValue {
            field: "base_url".to_string(),
            value: self.base_url.clone(),
            message: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "base_url".to_string(),
                value: self.base_url.clone(),
                message: "scheme must be http or https".to_string(),
            });
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_secs".to_string(),
                value: "0".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        if self.notification_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "notification_capacity".to_string(),
                value: "0".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

fn parse_number<N: std::str::FromStr>(key: &str, raw: &str) -> Result<N, ConfigError>
where
    N::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<N>()
        .map_err(|e| ConfigError::InvalidValue {
            field: key.to_string(),
            value: raw.to_string(),
            message: e.to_string(),
        })
}
