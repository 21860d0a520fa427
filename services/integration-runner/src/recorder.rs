//! Assertion recorder.
//!
//! Append-only log of named checks for the whole run. Every record emits
//! one log line and hands the condition back so suites can fold it into
//! their own verdict.

use serde::Serialize;
use tracing::{error, info};

/// One recorded check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assertion {
    /// Suite that recorded the check
    pub suite: String,
    /// Check name
    pub name: String,
    /// Outcome
    pub passed: bool,
    /// Diagnostic detail
    pub detail: String,
}

/// Accumulates assertions and pass/fail counters.
#[derive(Debug, Default)]
pub struct AssertionRecorder {
    current_suite: String,
    assertions: Vec<Assertion>,
    passed: usize,
    failed: usize,
}

impl AssertionRecorder {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute subsequent records to `suite`.
    pub fn begin_suite(&mut self, suite: &str) {
        suite.clone_into(&mut self.current_suite);
    }

    /// Record a check and return `condition` unchanged.
    pub fn record(
        &mut self,
        name: impl Into<String>,
        condition: bool,
        detail: impl Into<String>,
    ) -> bool {
        let name = name.into();
        let detail = sanitize_detail(&detail.into());

        if condition {
            info!(suite = %self.current_suite, "PASS {name}");
            self.passed += 1;
        } else if detail.is_empty() {
            error!(suite = %self.current_suite, "FAIL {name}");
            self.failed += 1;
        } else {
            error!(suite = %self.current_suite, "FAIL {name} - {detail}");
            self.failed += 1;
        }

        self.assertions.push(Assertion {
            suite: self.current_suite.clone(),
            name,
            passed: condition,
            detail,
        });
        condition
    }

    /// Record a failed check.
    pub fn fail(&mut self, name: impl Into<String>, detail: impl Into<String>) -> bool {
        self.record(name, false, detail)
    }

    /// All assertions so far, in record order.
    #[must_use]
    pub fn assertions(&self) -> &[Assertion] {
        &self.assertions
    }

    /// Assertions recorded from index `start` onwards.
    #[must_use]
    pub fn since(&self, start: usize) -> &[Assertion] {
        self.assertions.get(start..).unwrap_or_default()
    }

    /// Number of recorded assertions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assertions.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assertions.is_empty()
    }

    /// Passed count.
    #[must_use]
    pub const fn passed(&self) -> usize {
        self.passed
    }

    /// Failed count.
    #[must_use]
    pub const fn failed(&self) -> usize {
        self.failed
    }

    /// Consume the recorder, yielding the assertion log.
    #[must_use]
    pub fn into_assertions(self) -> Vec<Assertion> {
        self.assertions
    }
}

/// Render control characters visibly so one record stays one log line.
fn sanitize_detail(detail: &str) -> String {
    detail
        .chars()
        .flat_map(|c| match c {
            '\n' => vec!['\\', 'n'],
            '\r' => vec!['\\', 'r'],
            '\t' => vec![' '],
            c if c.is_control() => vec!['?'],
            c => vec![c],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_returns_condition() {
        let mut recorder = AssertionRecorder::new();
        assert!(recorder.record("Login", true, ""));
        assert!(!recorder.record("Token", false, "Token length: 0"));
        assert_eq!(recorder.passed(), 1);
        assert_eq!(recorder.failed(), 1);
        assert_eq!(recorder.len(), 2);
    }

    #[test]
    fn test_records_are_attributed_to_current_suite() {
        let mut recorder = AssertionRecorder::new();
        recorder.begin_suite("Service Health");
        recorder.record("api-gateway Health Check", true, "");
        recorder.begin_suite("Authentication Flow");
        recorder.fail("User Login Success", "Status: 401");

        let assertions = recorder.assertions();
        assert_eq!(assertions[0].suite, "Service Health");
        assert_eq!(assertions[1].suite, "Authentication Flow");
        assert_eq!(recorder.since(1).len(), 1);
        assert!(recorder.since(5).is_empty());
    }

    #[test]
    fn test_detail_is_single_line() {
        let mut recorder = AssertionRecorder::new();
        recorder.fail("Body", "line one\nline two\u{7}");
        assert_eq!(recorder.assertions()[0].detail, "line one\\nline two?");
    }
}
