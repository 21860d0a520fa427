//! Dashboard listing checks and subject work selection.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::auth::OPAQUE_ID_LEN;
use super::{Suite, SuiteEnv, SuiteId, decode_json, expect_status, require};
use crate::context::{Slot, TestContext, Visibility};
use crate::endpoint::WORK;
use crate::error::RunnerError;
use crate::recorder::AssertionRecorder;

pub(crate) const MY_WORKS_ROUTE: &str = "/api/v1/my/works";

/// Fields every dashboard entry must carry.
pub const REQUIRED_WORK_FIELDS: [&str; 5] = ["id", "title", "status", "updated_at", "word_count"];

/// Lists the fixture user's works and picks the subject work.
///
/// Sole writer of [`Slot::SubjectWorkId`] and [`Slot::SubjectWorkVisibility`].
pub struct DashboardSuite {
    env: Arc<SuiteEnv>,
}

impl DashboardSuite {
    /// Create the suite.
    #[must_use]
    pub const fn new(env: Arc<SuiteEnv>) -> Self {
        Self { env }
    }
}

#[async_trait]
impl Suite for DashboardSuite {
    fn id(&self) -> SuiteId {
        SuiteId::Dashboard
    }

    async fn execute(
        &self,
        ctx: &mut TestContext,
        recorder: &mut AssertionRecorder,
    ) -> Result<bool, RunnerError> {
        let Some(token) = require(ctx, recorder, self.id(), Slot::AccessToken) else {
            return Ok(false);
        };

        let listing = self
            .env
            .send(self.env.get(WORK, MY_WORKS_ROUTE)?.bearer(&token))
            .await;
        if !expect_status(recorder, "Dashboard API Response", &listing, &[200]) {
            return Ok(false);
        }
        let Some(doc) = decode_json(recorder, "Dashboard Response Body", &listing) else {
            return Ok(false);
        };

        let works = doc.get("works").and_then(Value::as_array);
        let structure_valid = recorder.record(
            "Dashboard Response Structure",
            works.is_some(),
            format!("Expected a works list, got {}", json_kind(doc.get("works"))),
        );
        let works = works.map(Vec::as_slice).unwrap_or_default();
        let has_works = recorder.record(
            "User Has Works in Dashboard",
            !works.is_empty(),
            format!("Found {} works", works.len()),
        );
        let Some(work) = works.first().filter(|_| structure_valid && has_works) else {
            return Ok(false);
        };

        let id = work.get("id").and_then(Value::as_str).unwrap_or_default();
        if !id.is_empty() {
            ctx.put(SuiteId::Dashboard, Slot::SubjectWorkId, id)?;
        }
        let visibility = Visibility::from_listing(
            work.get("status").and_then(Value::as_str),
            work.get("restricted").and_then(Value::as_bool),
        );
        if let Some(visibility) = visibility {
            ctx.put_visibility(SuiteId::Dashboard, visibility)?;
        }

        let missing: Vec<&str> = REQUIRED_WORK_FIELDS
            .into_iter()
            .filter(|field| work.get(*field).is_none())
            .collect();
        let fields_present = recorder.record(
            "Work Object Fields Complete",
            missing.is_empty(),
            format!("Missing fields: {missing:?}"),
        );
        let id_valid = recorder.record(
            "Work ID Format Valid",
            id.len() == OPAQUE_ID_LEN,
            format!("Work ID: {id}"),
        );
        let title = work
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let title_valid = recorder.record(
            "Work Title Present",
            !title.is_empty(),
            format!("Title: '{title}'"),
        );

        Ok(fields_present && id_valid && title_valid)
    }
}

fn json_kind(value: Option<&Value>) -> &'static str {
    match value {
        None => "nothing",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "a boolean",
        Some(Value::Number(_)) => "a number",
        Some(Value::String(_)) => "a string",
        Some(Value::Array(_)) => "a list",
        Some(Value::Object(_)) => "an object",
    }
}
