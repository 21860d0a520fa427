//! Gateway route coverage: every proxied route answers below 500.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::auth::LOGIN_ROUTE;
use super::tags::TAG_SEARCH_ROUTE;
use super::{Suite, SuiteEnv, SuiteId};
use crate::context::TestContext;
use crate::endpoint::GATEWAY;
use crate::error::RunnerError;
use crate::recorder::AssertionRecorder;

/// Gateway routes that must reach a backend.
pub const GATEWAY_ROUTES: [&str; 4] = [
    "/api/v1/works",
    TAG_SEARCH_ROUTE,
    LOGIN_ROUTE,
    "/api/v1/search/works",
];

/// Checks that every public gateway route reaches a backend: any answer
/// below 500 counts, since 4xx comes from the service behind the gateway.
pub struct GatewayRoutesSuite {
    env: Arc<SuiteEnv>,
}

impl GatewayRoutesSuite {
    /// Create the suite.
    #[must_use]
    pub const fn new(env: Arc<SuiteEnv>) -> Self {
        Self { env }
    }
}

#[async_trait]
impl Suite for GatewayRoutesSuite {
    fn id(&self) -> SuiteId {
        SuiteId::GatewayRoutes
    }

    async fn execute(
        &self,
        _ctx: &mut TestContext,
        recorder: &mut AssertionRecorder,
    ) -> Result<bool, RunnerError> {
        let mut all_routing = true;
        for route in GATEWAY_ROUTES {
            let outcome = self.env.send(self.env.get(GATEWAY, route)?).await;
            let proxied_to = outcome.header("x-proxy-service").unwrap_or("unknown");
            if outcome.status().is_some() {
                info!(route, proxied_to, "route {route} -> {proxied_to}");
            }
            all_routing &= recorder.record(
                format!("Route {route}"),
                outcome.status().is_some_and(|s| s < 500),
                outcome.summary(),
            );
        }
        Ok(all_routing)
    }
}
