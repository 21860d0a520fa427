//! Gateway routing and gateway-vs-direct response consistency.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::dashboard::MY_WORKS_ROUTE;
use super::viewing::work_route;
use super::{Suite, SuiteEnv, SuiteId, expect_status, require};
use crate::comparator::compare;
use crate::context::{Slot, TestContext};
use crate::endpoint::{GATEWAY, WORK};
use crate::error::RunnerError;
use crate::probe::ProbeOutcome;
use crate::recorder::AssertionRecorder;

/// Checks that the gateway answers exactly like the work service it
/// fronts.
pub struct GatewaySuite {
    env: Arc<SuiteEnv>,
}

impl GatewaySuite {
    /// Create the suite.
    #[must_use]
    pub const fn new(env: Arc<SuiteEnv>) -> Self {
        Self { env }
    }

    /// Probe `route` through the gateway and directly, re-probing both
    /// sides on mismatch as the consistency policy allows.
    async fn probe_pair(
        &self,
        token: &str,
        route: &str,
    ) -> Result<(ProbeOutcome, ProbeOutcome), RunnerError> {
        let env = self.env.as_ref();
        let via_gateway = env.get(GATEWAY, route)?.bearer(token);
        let direct = env.get(WORK, route)?.bearer(token);

        let pair = env
            .consistency
            .execute_while(
                || {
                    let (via_gateway, direct) = (via_gateway.clone(), direct.clone());
                    async move { (env.send(via_gateway).await, env.send(direct).await) }
                },
                |pair: &(ProbeOutcome, ProbeOutcome)| {
                    let comparison = compare(&pair.0, &pair.1);
                    !comparison.is_equivalent() && !comparison.is_transport_failure()
                },
            )
            .await;
        Ok(pair)
    }

    async fn check_route(
        &self,
        recorder: &mut AssertionRecorder,
        token: &str,
        route: &str,
        label: &str,
    ) -> Result<bool, RunnerError> {
        let (gateway, direct) = self.probe_pair(token, route).await?;
        if let Some(service) = gateway.header("x-proxy-service") {
            info!(route, proxied_to = service, "gateway proxied request");
        }

        if !expect_status(recorder, &format!("Gateway {label} Routing"), &gateway, &[200]) {
            return Ok(false);
        }
        let comparison = compare(&gateway, &direct);
        Ok(recorder.record(
            format!("Gateway vs Direct {label} Consistency"),
            comparison.is_equivalent(),
            format!(
                "{comparison}; gateway: {}; direct: {}",
                gateway.summary(),
                direct.summary()
            ),
        ))
    }
}

#[async_trait]
impl Suite for GatewaySuite {
    fn id(&self) -> SuiteId {
        SuiteId::Gateway
    }

    async fn execute(
        &self,
        ctx: &mut TestContext,
        recorder: &mut AssertionRecorder,
    ) -> Result<bool, RunnerError> {
        let Some(token) = require(ctx, recorder, self.id(), Slot::AccessToken) else {
            return Ok(false);
        };

        let mut passed = self
            .check_route(recorder, &token, MY_WORKS_ROUTE, "Dashboard")
            .await?;
        if let Some(work_id) = ctx.subject_work_id().map(str::to_owned) {
            passed &= self
                .check_route(recorder, &token, &work_route(&work_id), "Work View")
                .await?;
        }
        Ok(passed)
    }
}
