//! Client configuration
//!
//! Defaults suit a local backend. Deployments override them through
//! environment variables, see [`ClientConfig::from_env`].

use crate::classifier::CORRELATION_ID_HEADER;
use crate::error::{ConfigError, ConfigResult};
use crate::logging::log_debug;
use reqwest::header::HeaderName;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Admin API client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL that relative request paths are resolved against
    pub base_url: String,
    /// Timeout for a single request
    pub request_timeout: Duration,
    /// Locale prefix for client-side routes (e.g. "en", "pt-BR")
    pub locale: String,
    /// Sign-in route below the locale prefix
    pub sign_in_path: String,
    /// Response header carrying the backend correlation id
    pub correlation_header: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            request_timeout: Duration::from_secs(30),
            locale: "en".to_string(),
            sign_in_path: "auth/sign-in".to_string(),
            correlation_header: CORRELATION_ID_HEADER.to_string(),
        }
    }
}

impl ClientConfig {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationFailed`] if:
    /// - The base URL is not an absolute http(s) URL
    /// - The request timeout is zero
    /// - The locale is empty or contains characters other than ASCII letters, digits and '-'
    /// - The correlation header is not a valid HTTP header name
    pub fn validate(&self) -> ConfigResult<()> {
        let base_url = reqwest::Url::parse(&self.base_url).map_err(|e| {
            ConfigError::validation_failed(format!("Invalid base URL '{}': {e}", self.base_url))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::validation_failed(format!(
                "Base URL must use http or https, got '{}'",
                base_url.scheme()
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::validation_failed(
                "Request timeout must be greater than zero",
            ));
        }

        let locale_ok = !self.locale.is_empty()
            && self
                .locale
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !locale_ok {
            return Err(ConfigError::validation_failed(format!(
                "Invalid locale '{}'",
                self.locale
            )));
        }

        HeaderName::from_bytes(self.correlation_header.as_bytes()).map_err(|e| {
            ConfigError::validation_failed(format!(
                "Invalid correlation header '{}': {e}",
                self.correlation_header
            ))
        })?;

        Ok(())
    }

    /// Load configuration from environment variables
    ///
    /// Reads `API_BASE_URL`, `API_TIMEOUT_SECS`, `APP_LOCALE`, `APP_SIGN_IN_PATH`
    /// and `API_CORRELATION_HEADER`. Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `API_TIMEOUT_SECS` is not a
    /// whole number of seconds, and [`ConfigError::ValidationFailed`] if the
    /// resulting configuration does not validate.
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Ok(base_url) = std::env::var("API_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(timeout) = std::env::var("API_TIMEOUT_SECS") {
            let seconds = timeout.trim().parse::<u64>().map_err(|e| {
                ConfigError::invalid_value("API_TIMEOUT_SECS", format!("'{timeout}': {e}"))
            })?;
            config.request_timeout = Duration::from_secs(seconds);
        }
        if let Ok(locale) = std::env::var("APP_LOCALE") {
            config.locale = locale;
        }
        if let Ok(sign_in_path) = std::env::var("APP_SIGN_IN_PATH") {
            config.sign_in_path = sign_in_path;
        }
        if let Ok(header) = std::env::var("API_CORRELATION_HEADER") {
            config.correlation_header = header.to_ascii_lowercase();
        }

        config.validate()?;

        log_debug!(
            base_url = %config.base_url,
            timeout_seconds = config.request_timeout.as_secs(),
            locale = %config.locale,
            "Client configuration loaded and validated"
        );

        Ok(config)
    }
}
