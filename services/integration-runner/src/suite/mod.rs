//! Test suites.
//!
//! Each suite owns the ordered checks for one capability area. Suites only
//! talk to each other through the [`TestContext`], and never let an error
//! escape: [`Suite::run`] turns any [`RunnerError`] into a failed
//! `suite crashed` assertion.

mod auth;
mod create;
mod dashboard;
mod errors;
mod gateway;
mod health;
mod permissions;
mod register;
mod routes;
mod schema;
mod tags;
mod viewing;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_common::RetryPolicy;
use secrecy::SecretString;
use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::context::{Slot, TestContext};
use crate::endpoint::EndpointRegistry;
use crate::error::RunnerError;
use crate::probe::{HttpProbe, ProbeOutcome, ProbeRequest};
use crate::recorder::AssertionRecorder;
use crate::schema::SchemaOracle;

pub use auth::AuthSuite;
pub use create::WorkCreationSuite;
pub use dashboard::DashboardSuite;
pub use errors::ErrorHandlingSuite;
pub use gateway::GatewaySuite;
pub use health::{HealthSuite, is_healthy};
pub use permissions::PermissionSuite;
pub use register::RegistrationSuite;
pub use routes::GatewayRoutesSuite;
pub use schema::{REQUIRED_TABLES, REQUIRED_WORK_COLUMNS, SchemaSuite};
pub use tags::{TAG_TYPES, TagSearchSuite};
pub use viewing::ViewingSuite;

/// Name of the assertion recorded when a suite fails internally.
pub const CRASH_ASSERTION: &str = "suite crashed";

/// Identity of a suite, in canonical dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SuiteId {
    /// Service Health
    Health,
    /// Authentication Flow
    Auth,
    /// Dashboard API
    Dashboard,
    /// Work Viewing
    Viewing,
    /// Permission System
    Permissions,
    /// API Gateway Routing
    Gateway,
    /// Error Handling
    Errors,
    /// Tag Search Endpoints
    TagSearch,
    /// Gateway Route Coverage
    GatewayRoutes,
    /// Database Schema
    Schema,
    /// User Registration
    Register,
    /// Work Creation Flow
    Create,
}

impl SuiteId {
    /// Every suite in execution order.
    pub const ALL: [Self; 12] = [
        Self::Health,
        Self::Auth,
        Self::Dashboard,
        Self::Viewing,
        Self::Permissions,
        Self::Gateway,
        Self::Errors,
        Self::TagSearch,
        Self::GatewayRoutes,
        Self::Schema,
        Self::Register,
        Self::Create,
    ];

    /// The seven core suites.
    #[must_use]
    pub fn core() -> Vec<Self> {
        Self::ALL[..7].to_vec()
    }

    /// Every suite.
    #[must_use]
    pub fn all() -> Vec<Self> {
        Self::ALL.to_vec()
    }

    /// Display name used in logs and the report.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Health => "Service Health",
            Self::Auth => "Authentication Flow",
            Self::Dashboard => "Dashboard API",
            Self::Viewing => "Work Viewing",
            Self::Permissions => "Permission System",
            Self::Gateway => "API Gateway Routing",
            Self::Errors => "Error Handling",
            Self::TagSearch => "Tag Search Endpoints",
            Self::GatewayRoutes => "Gateway Route Coverage",
            Self::Schema => "Database Schema",
            Self::Register => "User Registration",
            Self::Create => "Work Creation Flow",
        }
    }

    /// Selection key accepted by `SUITES`.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Auth => "auth",
            Self::Dashboard => "dashboard",
            Self::Viewing => "viewing",
            Self::Permissions => "permissions",
            Self::Gateway => "gateway",
            Self::Errors => "errors",
            Self::TagSearch => "tags",
            Self::GatewayRoutes => "routes",
            Self::Schema => "schema",
            Self::Register => "register",
            Self::Create => "create",
        }
    }
}

impl fmt::Display for SuiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SuiteId {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|id| id.key() == key)
            .ok_or_else(|| RunnerError::UnknownSuite(s.trim().to_string()))
    }
}

/// Parse a suite selection: `core`, `all`, or a comma list of keys.
///
/// The result is deduplicated and always in canonical order, whatever
/// order the keys were given in.
///
/// # Errors
///
/// Returns [`RunnerError::UnknownSuite`] for an unrecognized key.
pub fn parse_selection(selection: &str) -> Result<Vec<SuiteId>, RunnerError> {
    let mut ids = Vec::new();
    let keys = selection.split(',').map(str::trim);
    for key in keys.filter(|k| !k.is_empty()) {
        match key.to_ascii_lowercase().as_str() {
            "core" => ids.extend(SuiteId::core()),
            "all" => ids.extend(SuiteId::all()),
            _ => ids.push(key.parse()?),
        }
    }
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

/// Credentials of the fixture user.
#[derive(Debug)]
pub struct Credentials {
    /// Login email
    pub email: String,
    /// Login password
    pub password: SecretString,
}

impl Credentials {
    /// Create credentials.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Everything a suite needs besides the context and recorder.
#[derive(Debug)]
pub struct SuiteEnv {
    /// Shared probe
    pub probe: HttpProbe,
    /// Service addresses
    pub registry: EndpointRegistry,
    /// Per-probe timeout for ordinary requests
    pub request_timeout: Duration,
    /// Per-probe timeout for health checks
    pub health_timeout: Duration,
    /// Fixture user
    pub credentials: Credentials,
    /// Re-probe policy for the gateway consistency check
    pub consistency: RetryPolicy,
}

impl SuiteEnv {
    /// Create an environment with default timeouts and no consistency retry.
    #[must_use]
    pub fn new(probe: HttpProbe, registry: EndpointRegistry, credentials: Credentials) -> Self {
        Self {
            probe,
            registry,
            request_timeout: Duration::from_secs(10),
            health_timeout: Duration::from_secs(5),
            credentials,
            consistency: RetryPolicy::disabled(),
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the health probe timeout.
    #[must_use]
    pub const fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    /// Set the consistency retry policy.
    #[must_use]
    pub fn with_consistency(mut self, policy: RetryPolicy) -> Self {
        self.consistency = policy;
        self
    }

    /// Resolve `route` on `service`.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown services or malformed routes.
    pub fn url(&self, service: &str, route: &str) -> Result<Url, RunnerError> {
        self.registry.url(service, route)
    }

    /// A JSON `POST` on `service` with the request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown services or malformed routes.
    pub fn post_json(
        &self,
        service: &str,
        route: &str,
        body: Value,
    ) -> Result<ProbeRequest, RunnerError> {
        Ok(ProbeRequest::post_json(
            self.url(service, route)?,
            body,
            self.request_timeout,
        ))
    }

    /// A `GET` on `service` with the request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown services or malformed routes.
    pub fn get(&self, service: &str, route: &str) -> Result<ProbeRequest, RunnerError> {
        Ok(ProbeRequest::get(self.url(service, route)?, self.request_timeout))
    }

    /// Issue a probe.
    pub async fn send(&self, request: ProbeRequest) -> ProbeOutcome {
        self.probe.probe(request).await
    }
}

/// One capability area's ordered checks.
#[async_trait]
pub trait Suite: Send + Sync {
    /// Which suite this is.
    fn id(&self) -> SuiteId;

    /// Display name.
    fn name(&self) -> &'static str {
        self.id().name()
    }

    /// Run the checks. `Ok(passed)` is the suite verdict; an `Err` means the
    /// suite could not continue.
    async fn execute(
        &self,
        ctx: &mut TestContext,
        recorder: &mut AssertionRecorder,
    ) -> Result<bool, RunnerError>;

    /// Run the checks, converting any internal error into a failed
    /// assertion.
    async fn run(&self, ctx: &mut TestContext, recorder: &mut AssertionRecorder) -> bool {
        match self.execute(ctx, recorder).await {
            Ok(passed) => passed,
            Err(err) => {
                recorder.fail(CRASH_ASSERTION, err.to_string());
                false
            }
        }
    }
}

/// Build the selected suites in canonical order.
///
/// The schema suite is only built when an oracle is supplied.
#[must_use]
pub fn build_suites(
    selection: &[SuiteId],
    env: &Arc<SuiteEnv>,
    oracle: Option<Arc<dyn SchemaOracle>>,
) -> Vec<Box<dyn Suite>> {
    let mut ids = selection.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let mut suites: Vec<Box<dyn Suite>> = Vec::with_capacity(ids.len());
    for id in ids {
        let env = Arc::clone(env);
        match id {
            SuiteId::Health => suites.push(Box::new(HealthSuite::new(env))),
            SuiteId::Auth => suites.push(Box::new(AuthSuite::new(env))),
            SuiteId::Dashboard => suites.push(Box::new(DashboardSuite::new(env))),
            SuiteId::Viewing => suites.push(Box::new(ViewingSuite::new(env))),
            SuiteId::Permissions => suites.push(Box::new(PermissionSuite::new(env))),
            SuiteId::Gateway => suites.push(Box::new(GatewaySuite::new(env))),
            SuiteId::Errors => suites.push(Box::new(ErrorHandlingSuite::new(env))),
            SuiteId::TagSearch => suites.push(Box::new(TagSearchSuite::new(env))),
            SuiteId::GatewayRoutes => suites.push(Box::new(GatewayRoutesSuite::new(env))),
            SuiteId::Register => suites.push(Box::new(RegistrationSuite::new(env))),
            SuiteId::Create => suites.push(Box::new(WorkCreationSuite::new(env))),
            SuiteId::Schema => match &oracle {
                Some(oracle) => suites.push(Box::new(SchemaSuite::new(Arc::clone(oracle)))),
                None => warn!("no schema oracle configured; skipping {}", SuiteId::Schema),
            },
        }
    }
    suites
}

/// Record whether `outcome` has one of the `expected` statuses.
pub(crate) fn expect_status(
    recorder: &mut AssertionRecorder,
    name: &str,
    outcome: &ProbeOutcome,
    expected: &[u16],
) -> bool {
    let ok = outcome.status().is_some_and(|s| expected.contains(&s));
    let wanted = expected
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(" or ");
    recorder.record(name, ok, format!("{}, expected {wanted}", outcome.summary()))
}

/// Read a prerequisite slot, recording a failed assertion when it is unset.
pub(crate) fn require(
    ctx: &TestContext,
    recorder: &mut AssertionRecorder,
    suite: SuiteId,
    slot: Slot,
) -> Option<String> {
    match ctx.require(slot) {
        Ok(value) => Some(value.to_string()),
        Err(err) => {
            recorder.fail(format!("{suite} Prerequisites"), err.to_string());
            None
        }
    }
}

/// Decode a response body, recording a failed assertion when it is not JSON.
pub(crate) fn decode_json(
    recorder: &mut AssertionRecorder,
    name: &str,
    outcome: &ProbeOutcome,
) -> Option<Value> {
    match outcome.json() {
        Ok(doc) => Some(doc),
        Err(err) => {
            recorder.fail(name, format!("{err}; {}", outcome.summary()));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    #[async_trait]
    impl Suite for Broken {
        fn id(&self) -> SuiteId {
            SuiteId::Viewing
        }

        async fn execute(
            &self,
            ctx: &mut TestContext,
            _recorder: &mut AssertionRecorder,
        ) -> Result<bool, RunnerError> {
            ctx.require(Slot::SubjectWorkId)?;
            Ok(true)
        }
    }

    #[test]
    fn test_run_converts_error_to_failed_assertion() {
        let mut ctx = TestContext::new();
        let mut recorder = AssertionRecorder::new();
        let passed = tokio_test::block_on(Broken.run(&mut ctx, &mut recorder));

        assert!(!passed);
        let crash = &recorder.assertions()[0];
        assert_eq!(crash.name, CRASH_ASSERTION);
        assert_eq!(crash.detail, "missing prerequisite: subject_work_id not set");
        assert_eq!(Broken.name(), "Work Viewing");
    }

    #[test]
    fn test_selection_is_canonical_order() {
        let ids = parse_selection("errors, health,auth,health").unwrap();
        assert_eq!(ids, vec![SuiteId::Health, SuiteId::Auth, SuiteId::Errors]);
    }

    #[test]
    fn test_selection_core_and_all() {
        assert_eq!(parse_selection("core").unwrap().len(), 7);
        assert_eq!(parse_selection("all").unwrap(), SuiteId::all());
        assert_eq!(
            parse_selection("core,tags").unwrap().last(),
            Some(&SuiteId::TagSearch)
        );
        assert_eq!(
            parse_selection("create,register").unwrap(),
            vec![SuiteId::Register, SuiteId::Create]
        );
    }

    #[test]
    fn test_unknown_suite_key() {
        assert!(matches!(
            parse_selection("health,bogus"),
            Err(RunnerError::UnknownSuite(key)) if key == "bogus"
        ));
    }

    #[test]
    fn test_names_and_keys_round_trip() {
        for id in SuiteId::ALL {
            assert_eq!(id.key().parse::<SuiteId>().unwrap(), id);
            assert!(!id.name().is_empty());
        }
    }

    #[test]
    fn test_expect_status_detail() {
        let mut recorder = AssertionRecorder::new();
        let outcome = ProbeOutcome::responded(500, "boom");
        assert!(!expect_status(&mut recorder, "Nonexistent Work Handling", &outcome, &[404, 403]));
        assert_eq!(
            recorder.assertions()[0].detail,
            "Status: 500, Response: boom, expected 404 or 403"
        );
    }

    #[test]
    fn test_require_records_missing_prerequisite() {
        let ctx = TestContext::new();
        let mut recorder = AssertionRecorder::new();
        assert!(require(&ctx, &mut recorder, SuiteId::Dashboard, Slot::AccessToken).is_none());
        assert_eq!(recorder.assertions()[0].name, "Dashboard API Prerequisites");
        assert!(!recorder.assertions()[0].passed);
    }
}
