use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::import::DEFAULT_TIMEOUT_SECS;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be a number of seconds, got '{value}'")]
    InvalidTimeout { name: &'static str, value: String },
}

/// Connection settings for the LMS import endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    pub api_base_url: String,
    pub api_token: String,
    pub exam_id: String,
    pub timeout: Duration,
}

impl ImportConfig {
    /// Loads `.env` if present, then reads the `LMS_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let timeout = match lookup("LMS_TIMEOUT_SECS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout {
                    name: "LMS_TIMEOUT_SECS",
                    value,
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_base_url: required("LMS_API_BASE_URL")?,
            api_token: required("LMS_API_TOKEN")?,
            exam_id: required("LMS_EXAM_ID")?,
            timeout: Duration::from_secs(timeout),
        })
    }
}
