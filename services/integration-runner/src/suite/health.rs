//! Concurrent `/health` checks across every registered service.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;

use super::{Suite, SuiteEnv, SuiteId};
use crate::context::TestContext;
use crate::error::RunnerError;
use crate::probe::{ProbeOutcome, ProbeRequest};
use crate::recorder::AssertionRecorder;

const HEALTH_ROUTE: &str = "/health";
const HEALTHY_STATUSES: [&str; 3] = ["healthy", "ok", "up"];

/// Probes `/health` on every registered endpoint concurrently.
pub struct HealthSuite {
    env: Arc<SuiteEnv>,
}

impl HealthSuite {
    /// Create the suite.
    #[must_use]
    pub const fn new(env: Arc<SuiteEnv>) -> Self {
        Self { env }
    }
}

#[async_trait]
impl Suite for HealthSuite {
    fn id(&self) -> SuiteId {
        SuiteId::Health
    }

    async fn execute(
        &self,
        _ctx: &mut TestContext,
        recorder: &mut AssertionRecorder,
    ) -> Result<bool, RunnerError> {
        let env = &self.env;
        let probes = env.registry.iter().map(|endpoint| async move {
            let outcome = match endpoint.url(HEALTH_ROUTE) {
                Ok(url) => env.send(ProbeRequest::get(url, env.health_timeout)).await,
                Err(err) => ProbeOutcome::transport_failure(err.to_string()),
            };
            (endpoint.name(), outcome)
        });
        let outcomes = join_all(probes).await;

        let mut all_healthy = true;
        for (name, outcome) in &outcomes {
            all_healthy &= recorder.record(
                format!("{name} Health Check"),
                is_healthy(outcome),
                outcome.summary(),
            );
        }
        Ok(all_healthy)
    }
}

/// Status 200 and a body that signals health: a JSON `status` of
/// healthy/ok/up, or text mentioning "healthy" but not "unhealthy".
#[must_use]
pub fn is_healthy(outcome: &ProbeOutcome) -> bool {
    if !outcome.has_status(200) {
        return false;
    }
    if let Ok(Value::Object(doc)) = outcome.json() {
        if let Some(status) = doc.get("status") {
            return status
                .as_str()
                .is_some_and(|s| HEALTHY_STATUSES.contains(&s.to_ascii_lowercase().as_str()));
        }
    }
    let text = outcome.text().to_ascii_lowercase();
    text.contains("healthy") && !text.contains("unhealthy")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_status_healthy() {
        let outcome = ProbeOutcome::responded(200, r#"{"service":"work-service","status":"healthy"}"#);
        assert!(is_healthy(&outcome));
        assert!(is_healthy(&ProbeOutcome::responded(200, r#"{"status":"UP"}"#)));
    }

    #[test]
    fn test_json_status_unhealthy() {
        let outcome = ProbeOutcome::responded(200, r#"{"status":"unhealthy"}"#);
        assert!(!is_healthy(&outcome));
    }

    #[test]
    fn test_plain_text_body() {
        assert!(is_healthy(&ProbeOutcome::responded(200, "service healthy")));
        assert!(!is_healthy(&ProbeOutcome::responded(200, "unhealthy")));
        assert!(!is_healthy(&ProbeOutcome::responded(200, "")));
    }

    #[test]
    fn test_non_200_is_unhealthy() {
        let outcome = ProbeOutcome::responded(503, r#"{"status":"healthy"}"#);
        assert!(!is_healthy(&outcome));
        assert!(!is_healthy(&ProbeOutcome::transport_failure("timeout")));
    }
}
