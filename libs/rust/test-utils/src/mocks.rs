//! Mock implementations for testing.
//!
//! [`MockPlatform`] stands up one wiremock server per service (gateway,
//! auth, work, tag, search) serving the routes the integration runner
//! probes. The builder injects the faults the runner must detect.

use std::time::Duration;

use serde_json::Value;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::fixtures::{
    NONEXISTENT_WORK_ID, REGISTERED_USER_ID, SampleWork, TEST_ACCESS_TOKEN, TEST_EMAIL,
    TEST_PASSWORD, TEST_USER_ID, created_work_body, error_body, health_body, login_body, me_body,
    my_works_body, registration_body, work_view_body,
};

/// Gateway service name.
pub const GATEWAY: &str = "api-gateway";
/// Auth service name.
pub const AUTH: &str = "auth-service";
/// Work service name.
pub const WORK: &str = "work-service";
/// Tag service name.
pub const TAG: &str = "tag-service";
/// Search service name.
pub const SEARCH: &str = "search-service";

/// All mocked services, in registry order.
pub const SERVICES: [&str; 5] = [GATEWAY, AUTH, WORK, TAG, SEARCH];

/// Address nothing listens on.
const UNREACHABLE_URL: &str = "http://127.0.0.1:1";

const SPECIFIC: u8 = 1;
const ANONYMOUS: u8 = 5;
const FALLBACK: u8 = 10;

/// Builder for a [`MockPlatform`].
#[derive(Debug, Clone)]
pub struct MockPlatformBuilder {
    works: Vec<SampleWork>,
    access_token: String,
    user_id: String,
    unhealthy: Vec<String>,
    unreachable: Vec<String>,
    divergent_gateway: bool,
    nonexistent_status: u16,
    health_delay: Option<Duration>,
    failing_gateway_route: Option<String>,
    omit_restricted_flag: bool,
    registration_status: u16,
    creation_failure: Option<(u16, String)>,
}

impl Default for MockPlatformBuilder {
    fn default() -> Self {
        Self {
            works: vec![SampleWork::draft(), SampleWork::posted()],
            access_token: TEST_ACCESS_TOKEN.to_string(),
            user_id: TEST_USER_ID.to_string(),
            unhealthy: Vec::new(),
            unreachable: Vec::new(),
            divergent_gateway: false,
            nonexistent_status: 404,
            health_delay: None,
            failing_gateway_route: None,
            omit_restricted_flag: false,
            registration_status: 201,
            creation_failure: None,
        }
    }
}

impl MockPlatformBuilder {
    /// Replace the fixture user's works (dashboard order).
    #[must_use]
    pub fn works(mut self, works: Vec<SampleWork>) -> Self {
        self.works = works;
        self
    }

    /// Issue this token on login.
    #[must_use]
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = token.into();
        self
    }

    /// Report this id from the whoami route.
    #[must_use]
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Answer `/health` on `service` with 503.
    #[must_use]
    pub fn unhealthy(mut self, service: &str) -> Self {
        self.unhealthy.push(service.to_string());
        self
    }

    /// Point `service` at an address that refuses connections.
    #[must_use]
    pub fn unreachable(mut self, service: &str) -> Self {
        self.unreachable.push(service.to_string());
        self
    }

    /// Make the gateway serve a stale dashboard listing.
    #[must_use]
    pub const fn divergent_gateway(mut self) -> Self {
        self.divergent_gateway = true;
        self
    }

    /// Status returned for the nonexistent work id.
    #[must_use]
    pub const fn nonexistent_status(mut self, status: u16) -> Self {
        self.nonexistent_status = status;
        self
    }

    /// Delay every `/health` answer.
    #[must_use]
    pub const fn health_delay(mut self, delay: Duration) -> Self {
        self.health_delay = Some(delay);
        self
    }

    /// Make the gateway answer 502 on `route`.
    #[must_use]
    pub fn failing_gateway_route(mut self, route: &str) -> Self {
        self.failing_gateway_route = Some(route.to_string());
        self
    }

    /// Leave `restricted` out of dashboard entries, as the work service's
    /// own listing does.
    #[must_use]
    pub const fn omit_restricted_flag(mut self) -> Self {
        self.omit_restricted_flag = true;
        self
    }

    /// Status the gateway answers registrations with.
    #[must_use]
    pub const fn registration_status(mut self, status: u16) -> Self {
        self.registration_status = status;
        self
    }

    /// Make work creation fail with `status` and `details` in the error body.
    #[must_use]
    pub fn failing_work_creation(mut self, status: u16, details: &str) -> Self {
        self.creation_failure = Some((status, details.to_string()));
        self
    }

    /// Start every server and mount the routes.
    pub async fn start(self) -> MockPlatform {
        let mut servers = Vec::with_capacity(SERVICES.len());
        for service in SERVICES {
            let server = MockServer::start().await;
            self.mount_health(&server, service).await;
            match service {
                AUTH => self.mount_auth(&server).await,
                WORK => self.mount_works(&server, None).await,
                GATEWAY => {
                    self.mount_works(&server, Some(WORK)).await;
                    self.mount_gateway_routes(&server).await;
                    self.mount_creation_routes(&server).await;
                }
                _ => {}
            }
            servers.push((service, server));
        }

        MockPlatform {
            servers,
            unreachable: self.unreachable,
            access_token: self.access_token,
            works: self.works,
        }
    }

    async fn mount_health(&self, server: &MockServer, service: &str) {
        let mut template = if self.unhealthy.iter().any(|s| s == service) {
            let body = serde_json::json!({ "service": service, "status": "unhealthy" });
            json_response(503, body)
        } else {
            json_response(200, health_body(service))
        };
        if let Some(delay) = self.health_delay {
            template = template.set_delay(delay);
        }

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(template)
            .mount(server)
            .await;
    }

    async fn mount_auth(&self, server: &MockServer) {
        let bearer = format!("Bearer {}", self.access_token);

        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .and(body_json(serde_json::json!({
                "email": TEST_EMAIL,
                "password": TEST_PASSWORD,
            })))
            .respond_with(json_response(200, login_body(&self.access_token)))
            .with_priority(SPECIFIC)
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .respond_with(json_response(401, error_body("Invalid credentials")))
            .with_priority(FALLBACK)
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1/auth/me"))
            .and(header("authorization", bearer.as_str()))
            .respond_with(json_response(200, me_body(&self.user_id)))
            .with_priority(SPECIFIC)
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/auth/me"))
            .respond_with(unauthorized())
            .with_priority(FALLBACK)
            .mount(server)
            .await;
    }

    async fn mount_works(&self, server: &MockServer, proxied_to: Option<&str>) {
        let bearer = format!("Bearer {}", self.access_token);
        let respond = |status: u16, body: Value| {
            let template = json_response(status, body);
            match proxied_to {
                Some(service) => template.insert_header("x-proxy-service", service),
                None => template,
            }
        };

        let mut listing = if proxied_to.is_some() && self.divergent_gateway {
            stale_listing(&self.works)
        } else {
            my_works_body(&self.works)
        };
        if self.omit_restricted_flag {
            strip_entry_field(&mut listing, "restricted");
        }
        Mock::given(method("GET"))
            .and(path("/api/v1/my/works"))
            .and(header("authorization", bearer.as_str()))
            .respond_with(respond(200, listing))
            .with_priority(SPECIFIC)
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/my/works"))
            .respond_with(respond(401, error_body("Authorization header required")))
            .with_priority(FALLBACK)
            .mount(server)
            .await;

        for work in &self.works {
            let route = format!("/api/v1/works/{}", work.id);
            Mock::given(method("GET"))
                .and(path(route.as_str()))
                .and(header("authorization", bearer.as_str()))
                .respond_with(respond(200, work_view_body(work)))
                .with_priority(SPECIFIC)
                .mount(server)
                .await;

            let anonymous = if work.is_public() {
                respond(200, work_view_body(work))
            } else {
                respond(403, error_body("Cannot view this work"))
            };
            Mock::given(method("GET"))
                .and(path(route.as_str()))
                .respond_with(anonymous)
                .with_priority(ANONYMOUS)
                .mount(server)
                .await;
        }

        let missing = format!("/api/v1/works/{NONEXISTENT_WORK_ID}");
        Mock::given(method("GET"))
            .and(path(missing.as_str()))
            .respond_with(respond(self.nonexistent_status, error_body("Work not found")))
            .mount(server)
            .await;
    }

    async fn mount_gateway_routes(&self, server: &MockServer) {
        let routes: [(&str, &str, u16, Value); 4] = [
            ("/api/v1/works", WORK, 200, serde_json::json!({ "works": [] })),
            ("/api/v1/tags/search", TAG, 200, serde_json::json!({ "tags": [] })),
            ("/api/v1/auth/login", AUTH, 405, error_body("Method not allowed")),
            ("/api/v1/search/works", SEARCH, 200, serde_json::json!({ "results": [] })),
        ];

        for (route, service, status, body) in routes {
            let status = if self.failing_gateway_route.as_deref() == Some(route) {
                502
            } else {
                status
            };
            let template = json_response(status, body);
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(template.insert_header("x-proxy-service", service))
                .mount(server)
                .await;
        }
    }

    async fn mount_creation_routes(&self, server: &MockServer) {
        let bearer = format!("Bearer {}", self.access_token);

        let registered = if self.registration_status == 201 {
            registration_body(REGISTERED_USER_ID)
        } else {
            error_body("Registration failed")
        };
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/register"))
            .respond_with(json_response(self.registration_status, registered))
            .mount(server)
            .await;

        let created = SampleWork::created();
        let creation = match &self.creation_failure {
            Some((status, details)) => {
                let body = serde_json::json!({
                    "error": "Failed to create work",
                    "details": details,
                });
                json_response(*status, body)
            }
            None => json_response(201, created_work_body(&created)),
        };
        Mock::given(method("POST"))
            .and(path("/api/v1/works/"))
            .and(header("authorization", bearer.as_str()))
            .respond_with(creation)
            .with_priority(SPECIFIC)
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/works/"))
            .respond_with(unauthorized())
            .with_priority(FALLBACK)
            .mount(server)
            .await;

        let route = format!("/api/v1/works/{}", created.id);
        Mock::given(method("GET"))
            .and(path(route.as_str()))
            .and(header("authorization", bearer.as_str()))
            .respond_with(json_response(200, work_view_body(&created)))
            .mount(server)
            .await;
    }
}

fn json_response(status: u16, body: Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(body)
}

fn unauthorized() -> ResponseTemplate {
    json_response(401, error_body("Invalid or expired token"))
}

fn stale_listing(works: &[SampleWork]) -> Value {
    let mut stale: Vec<SampleWork> = works.to_vec();
    if let Some(first) = stale.first_mut() {
        first.title = format!("{} (stale)", first.title);
    }
    my_works_body(&stale)
}

fn strip_entry_field(listing: &mut Value, field: &str) {
    if let Some(entries) = listing.get_mut("works").and_then(Value::as_array_mut) {
        for entry in entries.iter_mut().filter_map(Value::as_object_mut) {
            entry.remove(field);
        }
    }
}

/// A running set of mock services.
pub struct MockPlatform {
    servers: Vec<(&'static str, MockServer)>,
    unreachable: Vec<String>,
    access_token: String,
    works: Vec<SampleWork>,
}

impl MockPlatform {
    /// Start a healthy platform with the default fixtures.
    pub async fn start() -> Self {
        MockPlatformBuilder::default().start().await
    }

    /// Create a builder for a customized platform.
    #[must_use]
    pub fn builder() -> MockPlatformBuilder {
        MockPlatformBuilder::default()
    }

    /// Base URL of `service`, or an unreachable address when so configured.
    #[must_use]
    pub fn url(&self, service: &str) -> Option<String> {
        if self.unreachable.iter().any(|s| s == service) {
            return Some(UNREACHABLE_URL.to_string());
        }
        self.servers
            .iter()
            .find(|(name, _)| *name == service)
            .map(|(_, server)| server.uri())
    }

    /// `(service, base_url)` pairs in registry order.
    #[must_use]
    pub fn endpoints(&self) -> Vec<(String, String)> {
        SERVICES
            .iter()
            .filter_map(|service| Some(((*service).to_string(), self.url(service)?)))
            .collect()
    }

    /// Token the auth mock issues.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Works the dashboard lists.
    #[must_use]
    pub fn works(&self) -> &[SampleWork] {
        &self.works
    }

    /// Requests a service has received so far.
    pub async fn received(&self, service: &str) -> Vec<wiremock::Request> {
        match self.servers.iter().find(|(name, _)| *name == service) {
            Some((_, server)) => server.received_requests().await.unwrap_or_default(),
            None => Vec::new(),
        }
    }
}
