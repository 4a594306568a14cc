use std::{fmt, fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    endpoints::{DEFAULT_HOST, DEFAULT_VERSION},
    error::SurveyMontyError,
    request::DecodeRetry,
};

pub const ACCESS_TOKEN_VAR: &str = "SURVEY_MONTY_ACCESS_TOKEN";
pub const VERSION_VAR: &str = "SURVEY_MONTY_VERSION";
pub const HOST_VAR: &str = "SURVEY_MONTY_HOST";

/// Configuration for a [`SurveyMontyClient`](crate::SurveyMontyClient).
///
/// Unknown keys are ignored when loading from a file, so a local secrets file
/// may carry extra entries (test survey ids and the like).
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// SurveyMonkey access token, sent as a bearer token on every request
    pub access_token: String,
    /// API version, e.g. "v3"; selects the endpoint document and the URL prefix
    pub version: String,
    pub host: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Re-requests after a success response without a JSON body; 0 disables
    pub decode_retries: u32,
    /// Delay before the first decode retry, doubled for each further one
    pub retry_delay_ms: u64,
    /// Upper bound on pages fetched by `call_all_pages`
    pub max_pages: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            version: DEFAULT_VERSION.to_string(),
            host: DEFAULT_HOST.to_string(),
            timeout_secs: 30,
            decode_retries: 0,
            retry_delay_ms: 500,
            max_pages: 1000,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("access_token", &"<redacted>")
            .field("version", &self.version)
            .field("host", &self.host)
            .field("timeout_secs", &self.timeout_secs)
            .field("decode_retries", &self.decode_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("max_pages", &self.max_pages)
            .finish()
    }
}

impl ClientConfig {
    /// Default configuration with the given access token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_decode_retries(mut self, retries: u32, delay: Duration) -> Self {
        self.decode_retries = retries;
        self.retry_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Reads the configuration from `SURVEY_MONTY_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`SurveyMontyError::Config`] if `SURVEY_MONTY_ACCESS_TOKEN` is unset.
    pub fn from_env() -> Result<Self, SurveyMontyError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, SurveyMontyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_token = lookup(ACCESS_TOKEN_VAR)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| SurveyMontyError::Config(format!("missing {ACCESS_TOKEN_VAR} in environment")))?;

        let mut config = Self::new(access_token);
        if let Some(version) = lookup(VERSION_VAR) {
            config.version = version;
        }
        if let Some(host) = lookup(HOST_VAR) {
            config.host = host;
        }
        Ok(config)
    }

    /// Loads a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SurveyMontyError> {
        let content = fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SurveyMontyError> {
        if self.access_token.trim().is_empty() {
            return Err(SurveyMontyError::Config("access token is empty".to_string()));
        }
        if self.version.trim_matches('/').is_empty() {
            return Err(SurveyMontyError::Config("API version is empty".to_string()));
        }
        if self.host.trim_matches('/').is_empty() {
            return Err(SurveyMontyError::Config("API host is empty".to_string()));
        }
        if self.max_pages == 0 {
            return Err(SurveyMontyError::Config("max_pages must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn decode_retry(&self) -> DecodeRetry {
        DecodeRetry {
            attempts: self.decode_retries,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}
