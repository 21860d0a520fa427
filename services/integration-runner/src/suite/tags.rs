//! Tag search through the gateway.

use std::sync::Arc;

use async_trait::async_trait;

use super::{Suite, SuiteEnv, SuiteId, expect_status};
use crate::context::TestContext;
use crate::endpoint::GATEWAY;
use crate::error::RunnerError;
use crate::recorder::AssertionRecorder;

pub(crate) const TAG_SEARCH_ROUTE: &str = "/api/v1/tags/search";

/// Tag categories searched through the gateway.
pub const TAG_TYPES: [&str; 4] = ["fandom", "character", "relationship", "freeform"];

/// Searches each tag category through the gateway.
pub struct TagSearchSuite {
    env: Arc<SuiteEnv>,
}

impl TagSearchSuite {
    /// Create the suite.
    #[must_use]
    pub const fn new(env: Arc<SuiteEnv>) -> Self {
        Self { env }
    }
}

#[async_trait]
impl Suite for TagSearchSuite {
    fn id(&self) -> SuiteId {
        SuiteId::TagSearch
    }

    async fn execute(
        &self,
        _ctx: &mut TestContext,
        recorder: &mut AssertionRecorder,
    ) -> Result<bool, RunnerError> {
        let mut all_working = true;
        for tag_type in TAG_TYPES {
            let request = self
                .env
                .get(GATEWAY, TAG_SEARCH_ROUTE)?
                .with_query(&[("q", "test"), ("type", tag_type), ("limit", "5")]);
            let outcome = self.env.send(request).await;
            all_working &= expect_status(
                recorder,
                &format!("Tag Search for '{tag_type}'"),
                &outcome,
                &[200],
            );
        }
        Ok(all_working)
    }
}
