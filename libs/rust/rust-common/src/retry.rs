//! Retry policy implementation with exponential backoff.
//!
//! Callers decide what counts as a retryable outcome; the policy owns the
//! attempt budget and the delay schedule.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay between retries
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
    /// Whether to add jitter to delays
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a new retry config with custom max retries.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Create a new retry config with custom initial delay.
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Create a new retry config with custom max delay.
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Create a new retry config without jitter.
    #[must_use]
    pub const fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }
}

/// Retry policy for re-running operations whose outcome is not yet acceptable.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a new retry policy with the given configuration.
    #[must_use]
    pub const fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Create a retry policy with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(RetryConfig::default())
    }

    /// Create a policy that never retries.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(RetryConfig::default().with_max_retries(0))
    }

    /// Calculate the delay for a given attempt number.
    ///
    /// Uses exponential backoff with optional jitter.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base_delay =
            self.config.initial_delay.as_millis() as f64 * self.config.multiplier.powi(exponent);

        let delay_ms = base_delay.min(self.config.max_delay.as_millis() as f64);

        let final_delay = if self.config.jitter {
            // Add up to 25% jitter
            let jitter_factor = 1.0 + (rand::random::<f64>() * 0.25);
            delay_ms * jitter_factor
        } else {
            delay_ms
        };

        Duration::from_millis(final_delay as u64)
    }

    /// Execute an async operation, re-running it while `retry_if` holds for
    /// its output and the attempt budget allows.
    ///
    /// Returns the output of the last attempt.
    pub async fn execute_while<F, Fut, T, P>(&self, mut operation: F, mut retry_if: P) -> T
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = T>,
        P: FnMut(&T) -> bool,
    {
        let mut attempt = 0;
        loop {
            let output = operation().await;
            if attempt >= self.config.max_retries || !retry_if(&output) {
                return output;
            }
            let delay = self.delay_for_attempt(attempt);
            debug!(attempt, delay_ms = delay.as_millis(), "retrying operation");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Get the maximum number of retries.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.config.max_retries
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_default_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_delay_calculation_no_jitter() {
        let config = RetryConfig::default().without_jitter();
        let policy = RetryPolicy::new(config);

        let delay0 = policy.delay_for_attempt(0);
        let delay1 = policy.delay_for_attempt(1);
        let delay2 = policy.delay_for_attempt(2);

        assert_eq!(delay0, Duration::from_millis(100));
        assert_eq!(delay1, Duration::from_millis(200));
        assert_eq!(delay2, Duration::from_millis(400));
    }

    #[test]
    fn test_max_delay_cap() {
        let config = RetryConfig::default()
            .without_jitter()
            .with_max_delay(Duration::from_millis(150));
        let policy = RetryPolicy::new(config);

        let delay2 = policy.delay_for_attempt(2);
        assert_eq!(delay2, Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_execute_while_stops_on_acceptable_output() {
        let policy = RetryPolicy::with_defaults();
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = policy
            .execute_while(
                || async move { calls.fetch_add(1, Ordering::SeqCst) + 1 },
                |_| false,
            )
            .await;
        assert_eq!(result, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_execute_while_respects_budget() {
        let config = RetryConfig::default()
            .with_max_retries(2)
            .with_initial_delay(Duration::from_millis(1))
            .without_jitter();
        let policy = RetryPolicy::new(config);
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = policy
            .execute_while(
                || async move { calls.fetch_add(1, Ordering::SeqCst) + 1 },
                |_| true,
            )
            .await;
        assert_eq!(result, 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_disabled_policy_runs_once() {
        let policy = RetryPolicy::disabled();
        let counter = AtomicU32::new(0);
        let calls = &counter;
        tokio_test::block_on(policy.execute_while(
            || async move { calls.fetch_add(1, Ordering::SeqCst) },
            |_| true,
        ));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(policy.max_retries(), 0);
    }
}
