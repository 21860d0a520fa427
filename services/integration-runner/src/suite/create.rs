//! Work creation through the gateway.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};

use super::auth::OPAQUE_ID_LEN;
use super::dashboard::MY_WORKS_ROUTE;
use super::viewing::work_route;
use super::{Suite, SuiteEnv, SuiteId, decode_json, expect_status, require};
use crate::context::{Slot, TestContext};
use crate::endpoint::GATEWAY;
use crate::error::RunnerError;
use crate::probe::ProbeOutcome;
use crate::recorder::AssertionRecorder;

pub(crate) const CREATE_WORK_ROUTE: &str = "/api/v1/works/";

/// Column whose absence breaks work creation on stale databases.
const SERIES_COLUMN: &str = "series_id";

/// Creates a work as the fixture user and reads it back.
///
/// Sole writer of [`Slot::CreatedWorkId`].
pub struct WorkCreationSuite {
    env: Arc<SuiteEnv>,
}

impl WorkCreationSuite {
    /// Create the suite.
    #[must_use]
    pub const fn new(env: Arc<SuiteEnv>) -> Self {
        Self { env }
    }
}

#[async_trait]
impl Suite for WorkCreationSuite {
    fn id(&self) -> SuiteId {
        SuiteId::Create
    }

    async fn execute(
        &self,
        ctx: &mut TestContext,
        recorder: &mut AssertionRecorder,
    ) -> Result<bool, RunnerError> {
        let env = &self.env;
        let Some(token) = require(ctx, recorder, self.id(), Slot::AccessToken) else {
            return Ok(false);
        };

        let request = env.get(GATEWAY, MY_WORKS_ROUTE)?;
        let listing = env.send(request.bearer(&token)).await;
        if !expect_status(recorder, "My Works Endpoint", &listing, &[200]) {
            return Ok(false);
        }

        let request = env.post_json(GATEWAY, CREATE_WORK_ROUTE, new_work())?;
        let created = env.send(request.bearer(&token)).await;
        if !recorder.record(
            "Work Creation",
            created.has_status(201),
            creation_detail(&created),
        ) {
            return Ok(false);
        }
        let Some(doc) = decode_json(recorder, "Work Creation Response Body", &created) else {
            return Ok(false);
        };

        let id = doc
            .pointer("/work/id")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !recorder.record(
            "Created Work ID Returned",
            id.len() == OPAQUE_ID_LEN,
            format!("Work ID: {id}"),
        ) {
            return Ok(false);
        }
        ctx.put(SuiteId::Create, Slot::CreatedWorkId, id)?;

        let request = env.get(GATEWAY, &work_route(id))?;
        let fetched = env.send(request.bearer(&token)).await;
        Ok(expect_status(recorder, "Created Work Retrievable", &fetched, &[200]))
    }
}

fn new_work() -> Value {
    json!({
        "title": format!("Test Work {}", Utc::now().timestamp()),
        "summary": "Test summary",
        "language": "en",
        "rating": "General Audiences",
        "category": ["Gen"],
        "warnings": ["No Archive Warnings Apply"],
        "fandoms": ["Test Fandom"],
        "characters": [],
        "relationships": [],
        "freeform_tags": ["Test Tag"],
    })
}

/// Name the likely cause of a failed creation.
fn creation_detail(outcome: &ProbeOutcome) -> String {
    let summary = outcome.summary();
    match outcome.status() {
        Some(201) => summary,
        Some(401) => format!("authentication issue; {summary}"),
        _ if outcome.text().contains(SERIES_COLUMN) => {
            format!("database schema issue ({SERIES_COLUMN} column missing); {summary}")
        }
        _ => summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_detail_names_schema_issue() {
        let outcome = ProbeOutcome::responded(
            500,
            r#"{"error":"Failed to create work","details":"column \"series_id\" does not exist"}"#,
        );
        assert!(creation_detail(&outcome).starts_with("database schema issue (series_id"));
    }

    #[test]
    fn test_creation_detail_names_auth_issue() {
        let outcome = ProbeOutcome::responded(401, "{}");
        assert!(creation_detail(&outcome).starts_with("authentication issue"));
    }

    #[test]
    fn test_new_work_has_required_fields() {
        let work = new_work();
        let title = work["title"].as_str().unwrap_or_default();
        assert!(title.starts_with("Test Work "));
        assert_eq!(work["fandoms"][0], "Test Fandom");
    }
}
