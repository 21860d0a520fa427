//! Centralized HTTP client configuration and building.
//!
//! This module provides a standardized way to create HTTP clients with
//! consistent configuration across the integration tooling.

use reqwest::{Client, ClientBuilder, redirect};
use std::time::Duration;

use crate::PlatformError;

/// HTTP client configuration.
///
/// Per-request deadlines are set by callers; `timeout` here is the outer
/// ceiling applied to every request the client sends.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout ceiling (default: 30s)
    pub timeout: Duration,
    /// Connection timeout (default: 10s)
    pub connect_timeout: Duration,
    /// Pool idle timeout (default: 90s)
    pub pool_idle_timeout: Duration,
    /// Maximum idle connections per host (default: 10)
    pub pool_max_idle_per_host: usize,
    /// Whether redirects are followed (default: false)
    pub follow_redirects: bool,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            follow_redirects: false,
            user_agent: "platform-integration-runner/1.0".to_string(),
        }
    }
}

impl HttpConfig {
    /// Create a new HTTP config with custom timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create a new HTTP config with custom connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Create a new HTTP config with custom user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Create a new HTTP config that follows redirects.
    #[must_use]
    pub const fn with_redirects(mut self) -> Self {
        self.follow_redirects = true;
        self
    }
}

/// Build a configured HTTP client.
///
/// Creates a reqwest client with rustls TLS, connection pooling, and
/// the specified configuration.
///
/// # Errors
///
/// Returns an error if the client cannot be built (e.g., TLS initialization fails).
///
/// # Examples
///
/// ```
/// use rust_common::{HttpConfig, build_http_client};
/// use std::time::Duration;
///
/// let config = HttpConfig::default()
///     .with_timeout(Duration::from_secs(60));
/// let client = build_http_client(&config).expect("Failed to build client");
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, PlatformError> {
    let redirects = if config.follow_redirects {
        redirect::Policy::default()
    } else {
        redirect::Policy::none()
    };

    let client = ClientBuilder::new()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .pool_idle_timeout(config.pool_idle_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .redirect(redirects)
        .user_agent(&config.user_agent)
        .use_rustls_tls()
        .build()?;

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.pool_max_idle_per_host, 10);
        assert!(!config.follow_redirects);
    }

    #[test]
    fn test_config_builder() {
        let config = HttpConfig::default()
            .with_timeout(Duration::from_secs(60))
            .with_connect_timeout(Duration::from_secs(2))
            .with_user_agent("test-agent")
            .with_redirects();

        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.user_agent, "test-agent");
        assert!(config.follow_redirects);
    }

    #[test]
    fn test_build_client() {
        let config = HttpConfig::default();
        let result = build_http_client(&config);
        assert!(result.is_ok());
    }
}
