//! User registration through the gateway.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use tracing::debug;

use super::{Suite, SuiteEnv, SuiteId, expect_status};
use crate::context::{Slot, TestContext};
use crate::endpoint::GATEWAY;
use crate::error::RunnerError;
use crate::recorder::AssertionRecorder;

pub(crate) const REGISTER_ROUTE: &str = "/api/v1/auth/register";
const REGISTRATION_PASSWORD: &str = "testpass123";

/// Registers a throwaway account named after the current time.
///
/// Sole writer of [`Slot::RegisteredUserId`].
pub struct RegistrationSuite {
    env: Arc<SuiteEnv>,
}

impl RegistrationSuite {
    /// Create the suite.
    #[must_use]
    pub const fn new(env: Arc<SuiteEnv>) -> Self {
        Self { env }
    }
}

#[async_trait]
impl Suite for RegistrationSuite {
    fn id(&self) -> SuiteId {
        SuiteId::Register
    }

    async fn execute(
        &self,
        ctx: &mut TestContext,
        recorder: &mut AssertionRecorder,
    ) -> Result<bool, RunnerError> {
        let stamp = Utc::now().timestamp_millis();
        let account = json!({
            "username": format!("testuser_{stamp}"),
            "email": format!("test_{stamp}@example.com"),
            "password": REGISTRATION_PASSWORD,
        });
        let request = self.env.post_json(GATEWAY, REGISTER_ROUTE, account)?;
        let outcome = self.env.send(request).await;
        if !expect_status(recorder, "User Registration", &outcome, &[201]) {
            return Ok(false);
        }

        match outcome.json().ok().as_ref().and_then(registered_id) {
            Some(id) => ctx.put(SuiteId::Register, Slot::RegisteredUserId, id)?,
            None => debug!("registration response carried no user id"),
        }
        Ok(true)
    }
}

/// The new account's id, from either `{"user": {"id"}}` or `{"user_id"}`.
fn registered_id(doc: &Value) -> Option<&str> {
    doc.pointer("/user/id")
        .or_else(|| doc.get("user_id"))
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_id_shapes() {
        assert_eq!(registered_id(&json!({"user": {"id": "u1"}})), Some("u1"));
        assert_eq!(registered_id(&json!({"user_id": "u2"})), Some("u2"));
        assert_eq!(registered_id(&json!({"message": "ok"})), None);
    }
}
