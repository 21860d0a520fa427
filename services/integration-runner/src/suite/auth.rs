//! Login and token validation against the auth service.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{Value, json};

use super::{Suite, SuiteEnv, SuiteId, decode_json, expect_status};
use crate::context::{Slot, TestContext};
use crate::endpoint::AUTH;
use crate::error::RunnerError;
use crate::probe::ProbeRequest;
use crate::recorder::AssertionRecorder;

pub(crate) const LOGIN_ROUTE: &str = "/api/v1/auth/login";
const ME_ROUTE: &str = "/api/v1/auth/me";

/// Tokens at or below this length are not signed tokens.
pub(crate) const MIN_TOKEN_LEN: usize = 50;
/// Length of an opaque 8-4-4-4-12 identifier.
pub(crate) const OPAQUE_ID_LEN: usize = 36;

/// Logs in as the fixture user and validates the issued token.
///
/// Sole writer of [`Slot::AccessToken`] and [`Slot::SubjectUserId`].
pub struct AuthSuite {
    env: Arc<SuiteEnv>,
}

impl AuthSuite {
    /// Create the suite.
    #[must_use]
    pub const fn new(env: Arc<SuiteEnv>) -> Self {
        Self { env }
    }
}

#[async_trait]
impl Suite for AuthSuite {
    fn id(&self) -> SuiteId {
        SuiteId::Auth
    }

    async fn execute(
        &self,
        ctx: &mut TestContext,
        recorder: &mut AssertionRecorder,
    ) -> Result<bool, RunnerError> {
        let env = &self.env;
        let credentials = json!({
            "email": env.credentials.email,
            "password": env.credentials.password.expose_secret(),
        });
        let login = env
            .send(ProbeRequest::post_json(
                env.url(AUTH, LOGIN_ROUTE)?,
                credentials,
                env.request_timeout,
            ))
            .await;

        if !expect_status(recorder, "User Login Success", &login, &[200]) {
            return Ok(false);
        }
        let Some(doc) = decode_json(recorder, "Login Response Body", &login) else {
            return Ok(false);
        };

        let token = doc
            .get("access_token")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !recorder.record(
            "JWT Token Generation",
            token.len() > MIN_TOKEN_LEN,
            format!("Token length: {}", token.len()),
        ) {
            return Ok(false);
        }
        ctx.put(SuiteId::Auth, Slot::AccessToken, token)?;

        let me = env.send(env.get(AUTH, ME_ROUTE)?.bearer(token)).await;
        if !expect_status(recorder, "Token Validation (/me endpoint)", &me, &[200]) {
            return Ok(false);
        }
        let Some(doc) = decode_json(recorder, "Whoami Response Body", &me) else {
            return Ok(false);
        };

        let user_id = doc.get("user_id").and_then(Value::as_str);
        let valid = recorder.record(
            "User ID Extraction from Token",
            user_id.is_some_and(|id| id.len() == OPAQUE_ID_LEN),
            format!("User ID: {}", user_id.unwrap_or("missing")),
        );
        if let Some(user_id) = user_id.filter(|_| valid) {
            ctx.put(SuiteId::Auth, Slot::SubjectUserId, user_id)?;
        }
        Ok(valid)
    }
}
