//! Client configuration read from the environment

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_CREDENTIAL_FILE: &str = ".stockcast/credentials.json";
pub const DEFAULT_REDIRECT_DELAY_MS: u64 = 2000;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} is invalid: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend origin, without a trailing slash
    pub base_url: String,
    pub credential_file: PathBuf,
    /// Hex AES-256 key; tokens are sealed at rest when present
    pub encryption_key: Option<String>,
    /// Anti-forgery value sent as `X-CSRFToken`
    pub csrf_token: Option<String>,
    /// Delay attached to the redirect after a session expires
    pub redirect_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            credential_file: PathBuf::from(DEFAULT_CREDENTIAL_FILE),
            encryption_key: None,
            csrf_token: None,
            redirect_delay: Duration::from_millis(DEFAULT_REDIRECT_DELAY_MS),
        }
    }
}

impl ClientConfig {
    /// Load from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` for each variable; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();

        if let Some(url) = get("STOCKCAST_API_URL") {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue {
                    key: "STOCKCAST_API_URL",
                    reason: format!("expected an http(s) URL, got {}", url),
                });
            }
            config.base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(path) = get("STOCKCAST_CREDENTIAL_FILE") {
            config.credential_file = PathBuf::from(path);
        }

        config.encryption_key = get("TOKEN_ENCRYPTION_KEY");
        config.csrf_token = get("CSRF_TOKEN");

        if let Some(delay) = get("SESSION_REDIRECT_DELAY_MS") {
            let millis = delay.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                key: "SESSION_REDIRECT_DELAY_MS",
                reason: e.to_string(),
            })?;
            config.redirect_delay = Duration::from_millis(millis);
        }

        Ok(config)
    }
}
