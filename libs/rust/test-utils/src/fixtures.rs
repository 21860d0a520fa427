//! Test fixtures with sample data.
//!
//! This module provides pre-built response bodies mirroring what the
//! gateway, auth, and work services return.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Fixture user's login email.
pub const TEST_EMAIL: &str = "testuser30d_v2@example.com";

/// Fixture user's login password.
pub const TEST_PASSWORD: &str = "TestPassword123!";

/// Fixture user's id (36-character opaque id).
pub const TEST_USER_ID: &str = "7c9e6679-7425-40de-944b-e07fc1f90ae7";

/// Fixture user's display name.
pub const TEST_USERNAME: &str = "testuser30d";

/// A signed-looking bearer token issued to the fixture user.
pub const TEST_ACCESS_TOKEN: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.\
eyJ1c2VyX2lkIjoiN2M5ZTY2NzktNzQyNS00MGRlLTk0NGItZTA3ZmMxZjkwYWU3In0.\
2f1Xq0ZrVdKfK8o3Lq8Yb6b3nq9mP0cYQe4R3k9T1sU";

/// Identifier that never resolves to a work.
pub const NONEXISTENT_WORK_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Id the work service assigns to a newly created work.
pub const CREATED_WORK_ID: &str = "b1c2d3e4-f5a6-4b7c-8d9e-0f1a2b3c4d5e";

/// Id the auth service assigns to a newly registered account.
pub const REGISTERED_USER_ID: &str = "c0ffee00-1234-4abc-9def-0123456789ab";

/// Sample work as listed on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SampleWork {
    /// Work id (36 chars)
    pub id: String,
    /// Title
    pub title: String,
    /// Publication status: `draft`, `posted`, or `hidden`
    pub status: String,
    /// Whether the work is restricted to signed-in users
    pub restricted: bool,
    /// Last update
    pub updated_at: DateTime<Utc>,
    /// Word count
    pub word_count: u32,
}

impl SampleWork {
    /// A draft work only its owner may read.
    #[must_use]
    pub fn draft() -> Self {
        Self {
            id: "3f2b8c1e-9d4a-4e6f-8b7a-1c2d3e4f5a6b".to_string(),
            title: "Unfinished Symphony".to_string(),
            status: "draft".to_string(),
            restricted: false,
            updated_at: fixed_timestamp(),
            word_count: 4_210,
        }
    }

    /// A posted, unrestricted work anyone may read.
    #[must_use]
    pub fn posted() -> Self {
        Self {
            id: "9a8b7c6d-5e4f-4a3b-9c2d-1e0f9a8b7c6d".to_string(),
            title: "Collected Letters".to_string(),
            status: "posted".to_string(),
            restricted: false,
            updated_at: fixed_timestamp(),
            word_count: 12_880,
        }
    }

    /// A posted work restricted to signed-in users.
    #[must_use]
    pub fn restricted() -> Self {
        Self {
            id: "5d4c3b2a-1f0e-4d9c-8b7a-6f5e4d3c2b1a".to_string(),
            title: "Members Only".to_string(),
            status: "posted".to_string(),
            restricted: true,
            updated_at: fixed_timestamp(),
            word_count: 1_200,
        }
    }

    /// The draft the work service returns after a creation.
    #[must_use]
    pub fn created() -> Self {
        Self {
            id: CREATED_WORK_ID.to_string(),
            title: "Test Work".to_string(),
            status: "draft".to_string(),
            restricted: false,
            updated_at: fixed_timestamp(),
            word_count: 0,
        }
    }

    /// Whether anonymous callers can read this work.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.status == "posted" && !self.restricted
    }

    /// Dashboard list entry.
    #[must_use]
    pub fn to_list_entry(&self) -> Value {
        json!({
            "id": self.id,
            "title": self.title,
            "status": self.status,
            "restricted": self.restricted,
            "updated_at": self.updated_at,
            "word_count": self.word_count,
            "chapter_count": 1,
        })
    }
}

fn fixed_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Health endpoint body for a service.
#[must_use]
pub fn health_body(service: &str) -> Value {
    json!({
        "service": service,
        "status": "healthy",
        "timestamp": 1_736_942_400,
        "version": "1.0.0",
    })
}

/// Successful login body.
#[must_use]
pub fn login_body(token: &str) -> Value {
    json!({
        "access_token": token,
        "token_type": "Bearer",
        "expires_in": 3600,
    })
}

/// Whoami body.
#[must_use]
pub fn me_body(user_id: &str) -> Value {
    json!({
        "user_id": user_id,
        "username": TEST_USERNAME,
    })
}

/// Registration body for a new account.
#[must_use]
pub fn registration_body(user_id: &str) -> Value {
    json!({
        "user": { "id": user_id, "username": "testuser_new" },
        "message": "User registered successfully",
    })
}

/// Creation body: the new work and its first chapter.
#[must_use]
pub fn created_work_body(work: &SampleWork) -> Value {
    json!({
        "work": work.to_list_entry(),
        "first_chapter": { "work_id": work.id, "number": 1 },
    })
}

/// Dashboard listing body.
#[must_use]
pub fn my_works_body(works: &[SampleWork]) -> Value {
    json!({
        "works": works.iter().map(SampleWork::to_list_entry).collect::<Vec<_>>(),
        "total": works.len(),
    })
}

/// Single work view body with the fixture user as author.
#[must_use]
pub fn work_view_body(work: &SampleWork) -> Value {
    json!({
        "work": work.to_list_entry(),
        "authors": [
            { "user_id": TEST_USER_ID, "username": TEST_USERNAME, "pseud_name": TEST_USERNAME }
        ],
    })
}

/// Error body in the services' shape.
#[must_use]
pub fn error_body(message: &str) -> Value {
    json!({ "error": message })
}
