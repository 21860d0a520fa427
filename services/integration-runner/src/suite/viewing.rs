//! Single work retrieval and authorship data.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{Suite, SuiteEnv, SuiteId, decode_json, expect_status, require};
use crate::context::{Slot, TestContext};
use crate::endpoint::WORK;
use crate::error::RunnerError;
use crate::recorder::AssertionRecorder;

/// Route of a single work.
pub(crate) fn work_route(id: &str) -> String {
    format!("/api/v1/works/{id}")
}

/// Fetches the subject work and checks its authorship data.
pub struct ViewingSuite {
    env: Arc<SuiteEnv>,
}

impl ViewingSuite {
    /// Create the suite.
    #[must_use]
    pub const fn new(env: Arc<SuiteEnv>) -> Self {
        Self { env }
    }
}

#[async_trait]
impl Suite for ViewingSuite {
    fn id(&self) -> SuiteId {
        SuiteId::Viewing
    }

    async fn execute(
        &self,
        ctx: &mut TestContext,
        recorder: &mut AssertionRecorder,
    ) -> Result<bool, RunnerError> {
        let Some(token) = require(ctx, recorder, self.id(), Slot::AccessToken) else {
            return Ok(false);
        };
        let Some(work_id) = require(ctx, recorder, self.id(), Slot::SubjectWorkId) else {
            return Ok(false);
        };

        let view = self
            .env
            .send(self.env.get(WORK, &work_route(&work_id))?.bearer(&token))
            .await;
        if !expect_status(recorder, "Work Viewing API Response", &view, &[200]) {
            return Ok(false);
        }
        let Some(doc) = decode_json(recorder, "Work Viewing Response Body", &view) else {
            return Ok(false);
        };

        let returned_id = doc.pointer("/work/id").and_then(Value::as_str);
        let id_consistent = recorder.record(
            "Work ID Consistency",
            returned_id == Some(work_id.as_str()),
            format!("Expected: {work_id}, Got: {}", returned_id.unwrap_or("missing")),
        );

        let authors = doc
            .get("authors")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let author_present = recorder.record(
            "Work Author Information Present",
            !authors.is_empty(),
            format!("Found {} authors", authors.len()),
        );
        let Some(author) = authors.first() else {
            return Ok(false);
        };

        let keys: Vec<&str> = author
            .as_object()
            .map(|o| o.keys().map(String::as_str).collect())
            .unwrap_or_default();
        let author_valid = recorder.record(
            "Author Data Structure Valid",
            keys.contains(&"user_id") && keys.contains(&"username"),
            format!("Author keys: {keys:?}"),
        );

        Ok(id_consistent && author_present && author_valid)
    }
}
