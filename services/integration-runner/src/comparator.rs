//! Consistency comparator.
//!
//! Decides whether two probe outcomes for logically equivalent requests
//! (gateway route vs. direct service route) are structurally the same:
//! identical status and deeply equal JSON bodies, with sequence order
//! significant.

use std::fmt;

use serde_json::{Number, Value};

use crate::probe::ProbeOutcome;

/// Which of the two compared outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// First argument (the gateway, by convention)
    Left,
    /// Second argument (the direct service, by convention)
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// Result of comparing two outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    /// Same status, deeply equal bodies
    Equivalent,
    /// One side never got a response
    TransportFailure {
        /// Failing side (left wins when both failed)
        side: Side,
        /// Failure cause
        cause: String,
    },
    /// Status codes differ
    StatusMismatch {
        /// Left status
        left: u16,
        /// Right status
        right: u16,
    },
    /// A body is not a JSON document
    Undecodable {
        /// Side with the bad body
        side: Side,
        /// Decoder message
        cause: String,
    },
    /// Bodies differ; `path` locates the first difference
    BodyMismatch {
        /// JSON pointer-like path (`$.works[0].title`)
        path: String,
    },
}

impl Comparison {
    /// Whether the outcomes were equivalent.
    #[must_use]
    pub const fn is_equivalent(&self) -> bool {
        matches!(self, Self::Equivalent)
    }

    /// Whether a transport failure prevented the comparison.
    #[must_use]
    pub const fn is_transport_failure(&self) -> bool {
        matches!(self, Self::TransportFailure { .. })
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equivalent => f.write_str("equivalent"),
            Self::TransportFailure { side, cause } => {
                write!(f, "{side} side failed: {cause}")
            }
            Self::StatusMismatch { left, right } => {
                write!(f, "status mismatch: {left} vs {right}")
            }
            Self::Undecodable { side, cause } => {
                write!(f, "{side} body is not JSON: {cause}")
            }
            Self::BodyMismatch { path } => write!(f, "bodies differ at {path}"),
        }
    }
}

/// `true` iff `a` and `b` are equivalent.
#[must_use]
pub fn equivalent(a: &ProbeOutcome, b: &ProbeOutcome) -> bool {
    compare(a, b).is_equivalent()
}

/// Compare two outcomes, naming the first reason they differ.
#[must_use]
pub fn compare(a: &ProbeOutcome, b: &ProbeOutcome) -> Comparison {
    if let ProbeOutcome::TransportFailure { cause } = a {
        return Comparison::TransportFailure {
            side: Side::Left,
            cause: cause.clone(),
        };
    }
    if let ProbeOutcome::TransportFailure { cause } = b {
        return Comparison::TransportFailure {
            side: Side::Right,
            cause: cause.clone(),
        };
    }

    let left = a.status().unwrap_or_default();
    let right = b.status().unwrap_or_default();
    if left != right {
        return Comparison::StatusMismatch { left, right };
    }

    let left_doc = match a.json() {
        Ok(doc) => doc,
        Err(e) => {
            return Comparison::Undecodable {
                side: Side::Left,
                cause: e.to_string(),
            };
        }
    };
    let right_doc = match b.json() {
        Ok(doc) => doc,
        Err(e) => {
            return Comparison::Undecodable {
                side: Side::Right,
                cause: e.to_string(),
            };
        }
    };

    match first_difference(&left_doc, &right_doc, "$") {
        None => Comparison::Equivalent,
        Some(path) => Comparison::BodyMismatch { path },
    }
}

/// Path of the first structural difference between two documents.
#[must_use]
pub fn first_difference(left: &Value, right: &Value, path: &str) -> Option<String> {
    match (left, right) {
        (Value::Object(l), Value::Object(r)) => {
            if let Some(key) = l.keys().find(|k| !r.contains_key(*k)) {
                return Some(format!("{path}.{key}"));
            }
            if let Some(key) = r.keys().find(|k| !l.contains_key(*k)) {
                return Some(format!("{path}.{key}"));
            }
            l.iter()
                .find_map(|(key, lv)| first_difference(lv, &r[key], &format!("{path}.{key}")))
        }
        (Value::Array(l), Value::Array(r)) => {
            if l.len() != r.len() {
                return Some(format!("{path} (length {} vs {})", l.len(), r.len()));
            }
            l.iter()
                .zip(r)
                .enumerate()
                .find_map(|(i, (lv, rv))| first_difference(lv, rv, &format!("{path}[{i}]")))
        }
        (Value::Number(l), Value::Number(r)) if numbers_equal(l, r) => None,
        (l, r) if l == r => None,
        _ => Some(path.to_string()),
    }
}

/// Numeric equality across integer and float encodings, so `1200` and
/// `1200.0` match.
fn numbers_equal(left: &Number, right: &Number) -> bool {
    if let (Some(l), Some(r)) = (left.as_i64(), right.as_i64()) {
        return l == r;
    }
    if let (Some(l), Some(r)) = (left.as_u64(), right.as_u64()) {
        return l == r;
    }
    match (left.as_f64(), right.as_f64()) {
        (Some(l), Some(r)) => l == r,
        _ => false,
    }
}
