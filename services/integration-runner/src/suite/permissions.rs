//! Owner and anonymous access to the subject work.

use std::sync::Arc;

use async_trait::async_trait;

use super::viewing::work_route;
use super::{Suite, SuiteEnv, SuiteId, expect_status, require};
use crate::context::{Slot, TestContext};
use crate::endpoint::WORK;
use crate::error::RunnerError;
use crate::recorder::AssertionRecorder;

/// Compares owner and anonymous access to the subject work.
pub struct PermissionSuite {
    env: Arc<SuiteEnv>,
}

impl PermissionSuite {
    /// Create the suite.
    #[must_use]
    pub const fn new(env: Arc<SuiteEnv>) -> Self {
        Self { env }
    }
}

#[async_trait]
impl Suite for PermissionSuite {
    fn id(&self) -> SuiteId {
        SuiteId::Permissions
    }

    async fn execute(
        &self,
        ctx: &mut TestContext,
        recorder: &mut AssertionRecorder,
    ) -> Result<bool, RunnerError> {
        let Some(work_id) = require(ctx, recorder, self.id(), Slot::SubjectWorkId) else {
            return Ok(false);
        };
        let Some(token) = require(ctx, recorder, self.id(), Slot::AccessToken) else {
            return Ok(false);
        };
        let route = work_route(&work_id);

        let request = self.env.get(WORK, &route)?;
        let owner = self.env.send(request.bearer(&token)).await;
        let owner_access = expect_status(recorder, "Authenticated Work Access", &owner, &[200]);

        let anonymous = self.env.send(self.env.get(WORK, &route)?).await;
        let anonymous_handled = expect_status(
            recorder,
            "Unauthenticated Access Handling",
            &anonymous,
            &[200, 403],
        );

        let visibility_enforced = match ctx.subject_work_visibility() {
            Some(visibility) => {
                let expected = visibility.anonymous_status();
                recorder.record(
                    "Visibility Enforcement",
                    anonymous.has_status(expected),
                    format!("{visibility:?} work: {}, expected {expected}", anonymous.summary()),
                )
            }
            None => true,
        };

        Ok(owner_access && anonymous_handled && visibility_enforced)
    }
}
