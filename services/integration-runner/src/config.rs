//! Runner configuration.
//!
//! Loaded once from the environment (and an optional `.env` file) before
//! the run starts. Any failure here is fatal and maps to exit status 1.

use std::env;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

use crate::endpoint::{AUTH, GATEWAY, SEARCH, TAG, WORK};
use crate::suite::{SuiteId, parse_selection};

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid URL format
    #[error("Invalid URL for {field}: {reason}")]
    InvalidUrl { field: String, reason: String },

    /// Invalid timeout value
    #[error("Invalid timeout for {0}: must be greater than 0")]
    InvalidTimeout(String),

    /// Missing required field
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    /// Environment variable parse error
    #[error("Failed to parse environment variable {name}: {reason}")]
    ParseError { name: String, reason: String },
}

/// Runner configuration with validation.
#[derive(Debug)]
pub struct Config {
    /// API gateway base URL
    pub gateway_url: Url,
    /// Auth service base URL
    pub auth_service_url: Url,
    /// Work service base URL
    pub work_service_url: Url,
    /// Tag service base URL
    pub tag_service_url: Url,
    /// Search service base URL
    pub search_service_url: Url,
    /// Fixture user email
    pub test_user_email: String,
    /// Fixture user password
    pub test_user_password: SecretString,
    /// Per-request timeout in seconds (must be > 0)
    pub request_timeout_secs: u64,
    /// Health probe timeout in seconds (must be > 0)
    pub health_timeout_secs: u64,
    /// Overall run deadline in seconds
    pub run_timeout_secs: Option<u64>,
    /// Extra gateway consistency attempts on mismatch
    pub consistency_retries: u32,
    /// Selected suites, canonical order
    pub suites: Vec<SuiteId>,
    /// External schema checker command line
    pub schema_check_command: Option<String>,
    /// Log level filter
    pub log_level: String,
    /// Emit JSON log lines
    pub log_json: bool,
}

impl Config {
    /// Loads configuration from environment variables with validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for malformed values or failed validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let suites = env::var("SUITES").unwrap_or_else(|_| "core".to_string());
        let suites = parse_selection(&suites).map_err(|e| ConfigError::ParseError {
            name: "SUITES".to_string(),
            reason: e.to_string(),
        })?;

        let config = Self {
            gateway_url: parse_url_env("GATEWAY_URL", "http://localhost:8080")?,
            auth_service_url: parse_url_env("AUTH_SERVICE_URL", "http://localhost:8081")?,
            work_service_url: parse_url_env("WORK_SERVICE_URL", "http://localhost:8082")?,
            tag_service_url: parse_url_env("TAG_SERVICE_URL", "http://localhost:8083")?,
            search_service_url: parse_url_env("SEARCH_SERVICE_URL", "http://localhost:8084")?,
            test_user_email: env::var("TEST_USER_EMAIL")
                .unwrap_or_else(|_| "testuser30d_v2@example.com".to_string()),
            test_user_password: SecretString::from(
                env::var("TEST_USER_PASSWORD").unwrap_or_else(|_| "TestPassword123!".to_string()),
            ),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT", 10)?,
            health_timeout_secs: parse_env("HEALTH_TIMEOUT", 5)?,
            run_timeout_secs: parse_optional_env("RUN_TIMEOUT")?,
            consistency_retries: parse_env("CONSISTENCY_RETRIES", 0)?,
            suites,
            schema_check_command: env::var("SCHEMA_CHECK_COMMAND")
                .ok()
                .filter(|c| !c.trim().is_empty()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_json: parse_env("LOG_JSON", false)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("REQUEST_TIMEOUT".to_string()));
        }
        if self.health_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("HEALTH_TIMEOUT".to_string()));
        }
        if self.run_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidTimeout("RUN_TIMEOUT".to_string()));
        }
        if self.test_user_email.trim().is_empty() {
            return Err(ConfigError::MissingRequired("TEST_USER_EMAIL".to_string()));
        }
        if self.test_user_password.expose_secret().is_empty() {
            return Err(ConfigError::MissingRequired("TEST_USER_PASSWORD".to_string()));
        }
        Ok(())
    }

    /// `(service, base_url)` pairs in registry order.
    #[must_use]
    pub fn endpoints(&self) -> Vec<(&'static str, &Url)> {
        vec![
            (GATEWAY, &self.gateway_url),
            (AUTH, &self.auth_service_url),
            (WORK, &self.work_service_url),
            (TAG, &self.tag_service_url),
            (SEARCH, &self.search_service_url),
        ]
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Health probe timeout.
    #[must_use]
    pub const fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    /// Overall run deadline, if any.
    #[must_use]
    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_secs.map(Duration::from_secs)
    }
}

/// Parse an environment variable with a default value.
fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => parse_value(name, &val),
        Err(_) => Ok(default),
    }
}

/// Parse an environment variable that has no default.
fn parse_optional_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) if !val.trim().is_empty() => parse_value(name, &val).map(Some),
        _ => Ok(None),
    }
}

fn parse_value<T: std::str::FromStr>(name: &str, val: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    val.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a URL environment variable with a default value.
fn parse_url_env(name: &str, default: &str) -> Result<Url, ConfigError> {
    let url_str = env::var(name).unwrap_or_else(|_| default.to_string());
    let url = Url::parse(&url_str).map_err(|e| ConfigError::InvalidUrl {
        field: name.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            field: name.to_string(),
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config_base() -> Config {
        Config {
            gateway_url: Url::parse("http://localhost:8080").unwrap(),
            auth_service_url: Url::parse("http://localhost:8081").unwrap(),
            work_service_url: Url::parse("http://localhost:8082").unwrap(),
            tag_service_url: Url::parse("http://localhost:8083").unwrap(),
            search_service_url: Url::parse("http://localhost:8084").unwrap(),
            test_user_email: "testuser30d_v2@example.com".to_string(),
            test_user_password: SecretString::from("TestPassword123!".to_string()),
            request_timeout_secs: 10,
            health_timeout_secs: 5,
            run_timeout_secs: None,
            consistency_retries: 0,
            suites: SuiteId::core(),
            schema_check_command: None,
            log_level: "info".to_string(),
            log_json: false,
        }
    }

    #[test]
    fn test_config_validation_valid() {
        assert!(test_config_base().validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = test_config_base();
        config.request_timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimeout(name)) if name == "REQUEST_TIMEOUT"
        ));
    }

    #[test]
    fn test_config_validation_zero_run_timeout() {
        let mut config = test_config_base();
        config.run_timeout_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_password() {
        let mut config = test_config_base();
        config.test_user_password = SecretString::from(String::new());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_endpoints_in_registry_order() {
        let config = test_config_base();
        let names: Vec<_> = config.endpoints().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec![GATEWAY, AUTH, WORK, TAG, SEARCH]);
    }

    #[test]
    fn test_parse_value_reports_variable() {
        let err = parse_value::<u64>("REQUEST_TIMEOUT", "ten").unwrap_err();
        assert!(err.to_string().contains("REQUEST_TIMEOUT"));
    }

    #[test]
    fn test_password_not_in_debug_output() {
        let config = test_config_base();
        assert!(!format!("{config:?}").contains("TestPassword123!"));
    }
}
