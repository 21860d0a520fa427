//! Run report.
//!
//! Terminal artifact of a run: per-suite verdicts in execution order plus
//! assertion totals, and the process exit status derived from them.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::recorder::Assertion;

/// Exit status when every suite passed.
pub const EXIT_SUCCESS: u8 = 0;
/// Exit status otherwise.
pub const EXIT_FAILURE: u8 = 1;

/// Verdict for one suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteResult {
    /// Suite display name
    pub suite_name: String,
    /// Whether the suite passed
    pub passed: bool,
    /// Crash or not-run cause
    pub reason: Option<String>,
    /// Passed assertions recorded by this suite
    pub assertions_passed: usize,
    /// Assertions recorded by this suite
    pub assertions_total: usize,
    /// Wall-clock time spent
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

impl SuiteResult {
    /// Result for a suite abandoned before it ran.
    #[must_use]
    pub fn not_run(suite_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            suite_name: suite_name.into(),
            passed: false,
            reason: Some(reason.into()),
            assertions_passed: 0,
            assertions_total: 0,
            elapsed: Duration::ZERO,
        }
    }
}

/// Aggregate outcome of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Per-suite results, in execution order
    pub suite_results: Vec<SuiteResult>,
    /// Every assertion recorded during the run
    pub assertions: Vec<Assertion>,
    /// Total assertions
    pub total_assertions: usize,
    /// Passed assertions
    pub passed_assertions: usize,
    /// Run start
    pub started_at: DateTime<Utc>,
    /// Run duration
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

impl RunReport {
    /// Build a report, deriving the assertion totals.
    #[must_use]
    pub fn new(
        suite_results: Vec<SuiteResult>,
        assertions: Vec<Assertion>,
        started_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> Self {
        let passed_assertions = assertions.iter().filter(|a| a.passed).count();
        Self {
            total_assertions: assertions.len(),
            passed_assertions,
            suite_results,
            assertions,
            started_at,
            elapsed,
        }
    }

    /// Whether every suite passed. An empty run passes vacuously.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.suite_results.iter().all(|r| r.passed)
    }

    /// Number of passing suites.
    #[must_use]
    pub fn passed_suites(&self) -> usize {
        self.suite_results.iter().filter(|r| r.passed).count()
    }

    /// Result for a suite by display name.
    #[must_use]
    pub fn suite(&self, name: &str) -> Option<&SuiteResult> {
        self.suite_results.iter().find(|r| r.suite_name == name)
    }

    /// CI-facing exit status: 0 iff every suite passed.
    #[must_use]
    pub fn exit_status(&self) -> u8 {
        if self.all_passed() {
            EXIT_SUCCESS
        } else {
            EXIT_FAILURE
        }
    }

    /// Log the per-suite table and totals.
    pub fn log_summary(&self) {
        info!("Test Results Summary:");
        for result in &self.suite_results {
            let verdict = if result.passed { "PASSED" } else { "FAILED" };
            match &result.reason {
                Some(reason) => error!(
                    suite = %result.suite_name,
                    "  {}: {verdict} ({reason})",
                    result.suite_name
                ),
                None => info!(
                    suite = %result.suite_name,
                    passed = result.assertions_passed,
                    total = result.assertions_total,
                    elapsed_ms = result.elapsed.as_millis(),
                    "  {}: {verdict}",
                    result.suite_name
                ),
            }
        }

        info!(
            "Test Suites: {}/{} passed",
            self.passed_suites(),
            self.suite_results.len()
        );
        info!(
            "Individual Tests: {}/{} passed",
            self.passed_assertions, self.total_assertions
        );

        if self.all_passed() {
            info!("ALL TESTS PASSED");
        } else {
            error!(
                failed = self.suite_results.len() - self.passed_suites(),
                "test suite(s) failed; review failures above"
            );
        }
    }
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u128(value.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, passed: bool) -> SuiteResult {
        SuiteResult {
            suite_name: name.to_string(),
            passed,
            reason: None,
            assertions_passed: usize::from(passed),
            assertions_total: 1,
            elapsed: Duration::from_millis(5),
        }
    }

    fn assertion(passed: bool) -> Assertion {
        Assertion {
            suite: "s".to_string(),
            name: "n".to_string(),
            passed,
            detail: String::new(),
        }
    }

    #[test]
    fn test_exit_status_success() {
        let report = RunReport::new(
            vec![result("Service Health", true), result("Authentication Flow", true)],
            vec![assertion(true), assertion(true)],
            Utc::now(),
            Duration::from_millis(10),
        );
        assert!(report.all_passed());
        assert_eq!(report.exit_status(), EXIT_SUCCESS);
        assert_eq!(report.total_assertions, 2);
        assert_eq!(report.passed_assertions, 2);
    }

    #[test]
    fn test_exit_status_failure() {
        let report = RunReport::new(
            vec![result("Service Health", false), result("Authentication Flow", true)],
            vec![assertion(false), assertion(true)],
            Utc::now(),
            Duration::from_millis(10),
        );
        assert!(!report.all_passed());
        assert_eq!(report.exit_status(), EXIT_FAILURE);
        assert_eq!(report.passed_suites(), 1);
        assert_eq!(report.passed_assertions, 1);
    }

    #[test]
    fn test_not_run_result() {
        let result = SuiteResult::not_run("Error Handling", "run deadline exceeded");
        assert!(!result.passed);
        assert_eq!(result.reason.as_deref(), Some("run deadline exceeded"));
        assert_eq!(result.assertions_total, 0);
    }

    #[test]
    fn test_report_serializes() {
        let report = RunReport::new(
            vec![result("Service Health", true)],
            vec![assertion(true)],
            Utc::now(),
            Duration::from_millis(42),
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["elapsed"], 42);
        assert_eq!(json["suite_results"][0]["suite_name"], "Service Health");
    }
}
