//! Orchestrator.
//!
//! Runs suites strictly in the given order on one task, isolating each
//! one: an error, a panic, or run-deadline expiry inside a suite becomes a
//! failed [`SuiteResult`] and the run carries on.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::context::TestContext;
use crate::recorder::AssertionRecorder;
use crate::report::{RunReport, SuiteResult};
use crate::suite::{CRASH_ASSERTION, Suite};

/// Reason given for the suite in flight when the deadline hits.
pub const DEADLINE_REASON: &str = "run deadline exceeded";
/// Reason given for suites never started because of the deadline.
pub const NOT_RUN_REASON: &str = "not run: run deadline exceeded";

/// Sequences suites and aggregates their verdicts.
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    run_timeout: Option<Duration>,
}

impl Orchestrator {
    /// Create an orchestrator without an overall deadline.
    #[must_use]
    pub const fn new() -> Self {
        Self { run_timeout: None }
    }

    /// Bound the whole run.
    #[must_use]
    pub const fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = Some(timeout);
        self
    }

    /// Run `suites` against a fresh context.
    pub async fn run(&self, suites: &[Box<dyn Suite>]) -> RunReport {
        let mut ctx = TestContext::new();
        self.run_with_context(suites, &mut ctx).await
    }

    /// Run `suites` against a caller-supplied context.
    pub async fn run_with_context(
        &self,
        suites: &[Box<dyn Suite>],
        ctx: &mut TestContext,
    ) -> RunReport {
        let started_at = Utc::now();
        let run_start = Instant::now();
        let deadline = self.run_timeout.map(|timeout| run_start + timeout);

        let mut recorder = AssertionRecorder::new();
        let mut results = Vec::with_capacity(suites.len());

        info!(suites = suites.len(), "starting integration run");

        for suite in suites {
            let name = suite.name();
            if deadline.is_some_and(|d| Instant::now() >= d) {
                warn!(suite = name, "{NOT_RUN_REASON}");
                results.push(SuiteResult::not_run(name, NOT_RUN_REASON));
                continue;
            }

            info!(suite = name, "Running {name} Tests...");
            recorder.begin_suite(name);
            let first = recorder.len();
            let suite_start = Instant::now();

            let guarded = AssertUnwindSafe(suite.run(ctx, &mut recorder)).catch_unwind();
            let verdict = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, guarded).await {
                    Ok(outcome) => outcome.map_err(|panic| Abort::Panicked(panic_message(&*panic))),
                    Err(_) => Err(Abort::Deadline),
                },
                None => guarded
                    .await
                    .map_err(|panic| Abort::Panicked(panic_message(&*panic))),
            };

            let (passed, reason) = match verdict {
                Ok(passed) => (passed, crash_detail(&recorder, first)),
                Err(Abort::Panicked(message)) => {
                    recorder.fail(CRASH_ASSERTION, message.as_str());
                    error!(suite = name, "suite {name} panicked: {message}");
                    (false, Some(format!("{CRASH_ASSERTION}: {message}")))
                }
                Err(Abort::Deadline) => {
                    error!(suite = name, "suite {name} abandoned: {DEADLINE_REASON}");
                    (false, Some(DEADLINE_REASON.to_string()))
                }
            };

            let recorded = recorder.since(first);
            results.push(SuiteResult {
                suite_name: name.to_string(),
                passed,
                reason,
                assertions_passed: recorded.iter().filter(|a| a.passed).count(),
                assertions_total: recorded.len(),
                elapsed: suite_start.elapsed(),
            });
        }

        let report = RunReport::new(
            results,
            recorder.into_assertions(),
            started_at,
            run_start.elapsed(),
        );
        report.log_summary();
        report
    }
}

/// The crash cause a suite recorded for itself, if any.
fn crash_detail(recorder: &AssertionRecorder, first: usize) -> Option<String> {
    recorder
        .since(first)
        .iter()
        .find(|a| !a.passed && a.name == CRASH_ASSERTION)
        .map(|a| format!("{CRASH_ASSERTION}: {}", a.detail))
}

enum Abort {
    Panicked(String),
    Deadline,
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Slot;
    use crate::error::RunnerError;
    use crate::suite::SuiteId;
    use async_trait::async_trait;

    enum Behavior {
        Pass,
        Fail,
        Error,
        Panic,
        Hang,
        WriteToken,
        ReadToken,
    }

    struct Scripted {
        id: SuiteId,
        behavior: Behavior,
    }

    fn scripted(id: SuiteId, behavior: Behavior) -> Box<dyn Suite> {
        Box::new(Scripted { id, behavior })
    }

    #[async_trait]
    impl Suite for Scripted {
        fn id(&self) -> SuiteId {
            self.id
        }

        async fn execute(
            &self,
            ctx: &mut TestContext,
            recorder: &mut AssertionRecorder,
        ) -> Result<bool, RunnerError> {
            match self.behavior {
                Behavior::Pass => Ok(recorder.record("check", true, "")),
                Behavior::Fail => Ok(recorder.record("check", false, "expected failure")),
                Behavior::Error => Err(RunnerError::UnknownEndpoint("nowhere".to_string())),
                Behavior::Panic => panic!("suite blew up"),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(true)
                }
                Behavior::WriteToken => {
                    ctx.put(self.id, Slot::AccessToken, "t".repeat(60))?;
                    Ok(true)
                }
                Behavior::ReadToken => Ok(recorder.record(
                    "token visible",
                    ctx.access_token().is_some(),
                    "",
                )),
            }
        }
    }

    #[tokio::test]
    async fn test_all_pass_exit_zero() {
        let suites = vec![
            scripted(SuiteId::Health, Behavior::Pass),
            scripted(SuiteId::Auth, Behavior::Pass),
        ];
        let report = Orchestrator::new().run(&suites).await;
        assert!(report.all_passed());
        assert_eq!(report.exit_status(), 0);
        assert_eq!(report.total_assertions, 2);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_run() {
        let suites = vec![
            scripted(SuiteId::Health, Behavior::Fail),
            scripted(SuiteId::Auth, Behavior::Pass),
        ];
        let report = Orchestrator::new().run(&suites).await;
        assert_eq!(report.suite_results.len(), 2);
        assert!(!report.suite_results[0].passed);
        assert!(report.suite_results[1].passed);
        assert_eq!(report.exit_status(), 1);
    }

    #[tokio::test]
    async fn test_error_becomes_crash_assertion() {
        let suites = vec![
            scripted(SuiteId::Health, Behavior::Error),
            scripted(SuiteId::Auth, Behavior::Pass),
        ];
        let report = Orchestrator::new().run(&suites).await;
        let crashed = &report.suite_results[0];
        assert!(!crashed.passed);
        assert_eq!(
            crashed.reason.as_deref(),
            Some("suite crashed: unknown endpoint: nowhere")
        );
        assert_eq!(report.assertions[0].name, CRASH_ASSERTION);
        assert!(report.suite_results[1].passed);
    }

    #[tokio::test]
    async fn test_panic_is_isolated() {
        let suites = vec![
            scripted(SuiteId::Health, Behavior::Panic),
            scripted(SuiteId::Auth, Behavior::Pass),
        ];
        let report = Orchestrator::new().run(&suites).await;
        assert_eq!(
            report.suite_results[0].reason.as_deref(),
            Some("suite crashed: suite blew up")
        );
        assert!(report.suite_results[1].passed);
    }

    #[tokio::test]
    async fn test_deadline_abandons_in_flight_suite() {
        let suites = vec![
            scripted(SuiteId::Health, Behavior::Pass),
            scripted(SuiteId::Auth, Behavior::Hang),
            scripted(SuiteId::Dashboard, Behavior::Pass),
        ];
        let report = Orchestrator::new()
            .with_run_timeout(Duration::from_millis(200))
            .run(&suites)
            .await;

        assert!(report.suite_results[0].passed);
        assert_eq!(report.suite_results[1].reason.as_deref(), Some(DEADLINE_REASON));
        assert_eq!(report.suite_results[2].reason.as_deref(), Some(NOT_RUN_REASON));
        assert_eq!(report.exit_status(), 1);
    }

    #[tokio::test]
    async fn test_context_flows_between_suites() {
        let suites = vec![
            scripted(SuiteId::Auth, Behavior::WriteToken),
            scripted(SuiteId::Dashboard, Behavior::ReadToken),
        ];
        let report = Orchestrator::new().run(&suites).await;
        assert!(report.all_passed());
    }

    #[tokio::test]
    async fn test_non_owner_write_crashes_suite() {
        let suites = vec![scripted(SuiteId::Errors, Behavior::WriteToken)];
        let mut ctx = TestContext::new();
        let report = Orchestrator::new()
            .run_with_context(&suites, &mut ctx)
            .await;
        assert!(!report.all_passed());
        assert_eq!(ctx.access_token(), None);
    }

    #[tokio::test]
    async fn test_empty_run_passes() {
        let report = Orchestrator::new().run(&[]).await;
        assert!(report.all_passed());
        assert_eq!(report.exit_status(), 0);
    }
}
