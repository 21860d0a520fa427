//! Error statuses for rejected credentials and unknown work ids.

use std::sync::Arc;

use async_trait::async_trait;

use super::dashboard::MY_WORKS_ROUTE;
use super::viewing::work_route;
use super::{Suite, SuiteEnv, SuiteId, expect_status};
use crate::context::TestContext;
use crate::endpoint::{GATEWAY, WORK};
use crate::error::RunnerError;
use crate::recorder::AssertionRecorder;

/// Token no service will accept.
pub const INVALID_TOKEN: &str = "invalid_token_12345";
/// Id that never resolves to a work.
pub const NONEXISTENT_WORK_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Checks the error contract: 401 for bad credentials on both the work
/// service and the gateway, and a clean 404/403 for unknown ids.
pub struct ErrorHandlingSuite {
    env: Arc<SuiteEnv>,
}

impl ErrorHandlingSuite {
    /// Create the suite.
    #[must_use]
    pub const fn new(env: Arc<SuiteEnv>) -> Self {
        Self { env }
    }
}

#[async_trait]
impl Suite for ErrorHandlingSuite {
    fn id(&self) -> SuiteId {
        SuiteId::Errors
    }

    async fn execute(
        &self,
        ctx: &mut TestContext,
        recorder: &mut AssertionRecorder,
    ) -> Result<bool, RunnerError> {
        let env = &self.env;
        let mut passed = true;

        for (service, label) in [(WORK, "Work Service"), (GATEWAY, "Gateway")] {
            let invalid = env
                .send(env.get(service, MY_WORKS_ROUTE)?.bearer(INVALID_TOKEN))
                .await;
            passed &= expect_status(
                recorder,
                &format!("{label} Invalid Token Rejection"),
                &invalid,
                &[401],
            );

            let missing = env.send(env.get(service, MY_WORKS_ROUTE)?).await;
            passed &= expect_status(
                recorder,
                &format!("{label} Missing Authorization Rejection"),
                &missing,
                &[401],
            );
        }

        if let Some(token) = ctx.access_token() {
            let request = env.get(WORK, &work_route(NONEXISTENT_WORK_ID))?;
            let unknown = env.send(request.bearer(token)).await;
            passed &= expect_status(
                recorder,
                "Nonexistent Work Handling",
                &unknown,
                &[404, 403],
            );
        }

        Ok(passed)
    }
}
