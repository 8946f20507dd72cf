// Application configuration, read from the environment

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings from environment: {0}")]
    Env(#[from] envy::Error),
    #[error("either JUDGE0_BASE_URL or RAPIDAPI_JUDGE0_HOST must be set")]
    MissingJudge0Endpoint,
    #[error("POLL_MAX_ATTEMPTS must be greater than zero")]
    ZeroPollBudget,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub rapidapi_judge0_key: Option<String>,
    #[serde(default)]
    pub rapidapi_judge0_host: Option<String>,
    /// Overrides the RapidAPI host, e.g. for a self-hosted Judge0
    #[serde(default)]
    pub judge0_base_url: Option<String>,
    #[serde(default)]
    pub judge0_base64: bool,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_poll_max_attempts")]
    pub poll_max_attempts: u32,
    #[serde(default = "default_inter_test_delay_ms")]
    pub inter_test_delay_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_backend_port")]
    pub backend_port: u16,
    #[serde(default)]
    pub redis_url: Option<String>,
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
    #[serde(default = "default_languages_path")]
    pub languages_path: String,
}

fn default_poll_interval_ms() -> u64 {
    1500
}

fn default_poll_max_attempts() -> u32 {
    15
}

fn default_inter_test_delay_ms() -> u64 {
    1000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_backend_port() -> u16 {
    3000
}

fn default_catalog_path() -> String {
    "config/problems.json".to_string()
}

fn default_languages_path() -> String {
    "config/languages.json".to_string()
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings: Settings = envy::from_env()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Same as `from_env` but over an explicit set of variables
    pub fn from_iter<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let settings: Settings = envy::from_iter(vars)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.judge0_base_url.is_none() && self.rapidapi_judge0_host.is_none() {
            return Err(ConfigError::MissingJudge0Endpoint);
        }
        if self.poll_max_attempts == 0 {
            return Err(ConfigError::ZeroPollBudget);
        }
        Ok(())
    }

    /// Base URL of the Judge0 API, without trailing slash
    pub fn judge0_base_url(&self) -> String {
        match (&self.judge0_base_url, &self.rapidapi_judge0_host) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, Some(host)) => format!("https://{}", host),
            (None, None) => String::new(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn inter_test_delay(&self) -> Duration {
        Duration::from_millis(self.inter_test_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.backend_port)
    }
}
