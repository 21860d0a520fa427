//! Tracing subscriber setup.
//!
//! Installs the process-wide `tracing` subscriber used by the integration
//! tooling, with either human-readable or JSON line output.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Tracing configuration.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Service name attached to the startup event
    pub service_name: String,
    /// Log level filter, used when `RUST_LOG` is not set
    pub log_level: String,
    /// Whether to output JSON format
    pub json_output: bool,
    /// Whether to print event targets
    pub with_target: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: "rust-service".to_string(),
            log_level: "info".to_string(),
            json_output: false,
            with_target: false,
        }
    }
}

impl TracingConfig {
    /// Create config with custom service name.
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Create config with custom log level.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable JSON output.
    #[must_use]
    pub const fn with_json_output(mut self) -> Self {
        self.json_output = true;
        self
    }

    /// Print event targets in each line.
    #[must_use]
    pub const fn with_target(mut self) -> Self {
        self.with_target = true;
        self
    }
}

/// Initialize tracing with the given configuration.
///
/// Sets up the global tracing subscriber. Returns `false` when a subscriber
/// was already installed (for example by a test harness), in which case the
/// existing one stays in place.
pub fn init_tracing(config: &TracingConfig) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let installed = if config.json_output {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(config.with_target),
            )
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(config.with_target))
            .try_init()
            .is_ok()
    };

    if installed {
        tracing::debug!(service = %config.service_name, "tracing initialized");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.service_name, "rust-service");
        assert_eq!(config.log_level, "info");
        assert!(!config.json_output);
        assert!(!config.with_target);
    }

    #[test]
    fn test_config_builder() {
        let config = TracingConfig::default()
            .with_service_name("my-service")
            .with_log_level("debug")
            .with_json_output()
            .with_target();

        assert_eq!(config.service_name, "my-service");
        assert_eq!(config.log_level, "debug");
        assert!(config.json_output);
        assert!(config.with_target);
    }

    #[test]
    fn test_second_init_keeps_existing_subscriber() {
        let config = TracingConfig::default().with_log_level("warn");
        let _ = init_tracing(&config);
        assert!(!init_tracing(&config));
    }
}
