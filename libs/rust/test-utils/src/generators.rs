//! Shared proptest generators.
//!
//! Strategies for the payloads and identifiers the integration runner
//! inspects: JSON documents, opaque ids, tokens, and status codes.

use proptest::prelude::*;
use serde_json::{Map, Value};

/// Generate 36-character opaque ids (hyphenated UUIDs).
pub fn opaque_id_strategy() -> impl Strategy<Value = String> {
    any::<u128>().prop_map(|bits| uuid::Uuid::from_u128(bits).to_string())
}

/// Generate strings that are not 36 characters long.
pub fn malformed_id_strategy() -> impl Strategy<Value = String> {
    prop_oneof!["[a-f0-9-]{0,35}", "[a-f0-9-]{37,60}"]
}

/// Generate bearer tokens in JWT shape (longer than 50 chars).
pub fn access_token_strategy() -> impl Strategy<Value = String> {
    ("[A-Za-z0-9_-]{20,40}", "[A-Za-z0-9_-]{20,80}", "[A-Za-z0-9_-]{43}")
        .prop_map(|(header, claims, signature)| format!("{header}.{claims}.{signature}"))
}

/// Generate JSON scalars.
pub fn json_scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 _-]{0,20}".prop_map(Value::String),
    ]
}

/// Generate nested JSON documents (objects, arrays, scalars).
pub fn json_value_strategy() -> impl Strategy<Value = Value> {
    json_scalar_strategy().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z_]{1,10}", inner, 0..6)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Generate valid HTTP status codes.
pub fn http_status_code_strategy() -> impl Strategy<Value = u16> {
    prop_oneof![
        Just(200u16),
        Just(201u16),
        Just(204u16),
        Just(301u16),
        Just(400u16),
        Just(401u16),
        Just(403u16),
        Just(404u16),
        Just(429u16),
        Just(500u16),
        Just(502u16),
        Just(503u16),
    ]
}

/// Generate service names.
pub fn service_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{2,30}-service"
}

/// Generate assertion names as they appear in run logs.
pub fn assertion_name_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-zA-Z /()-]{2,40}"
}
