//! Error types for the integration runner.
//!
//! Suites convert every error into a failed assertion before it can cross a
//! suite boundary; these types only travel inside a suite or during startup.

use rust_common::PlatformError;
use thiserror::Error;

use crate::context::Slot;
use crate::suite::SuiteId;

/// Errors raised while preparing or executing a suite.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RunnerError {
    /// A context value a suite depends on was never produced
    #[error("missing prerequisite: {slot} not set")]
    MissingContext {
        /// The absent slot
        slot: Slot,
    },

    /// A suite tried to write a context slot it does not own
    #[error("{writer} may not write {slot}; owner is {owner}")]
    SlotOwnership {
        /// The slot being written
        slot: Slot,
        /// The suite that attempted the write
        writer: SuiteId,
        /// The slot's designated writer
        owner: SuiteId,
    },

    /// No endpoint registered under this name
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    /// A base URL or route could not be parsed
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl {
        /// Offending input
        url: String,
        /// Parser message
        reason: String,
    },

    /// A suite key that names no suite
    #[error("unknown suite: {0}")]
    UnknownSuite(String),

    /// An endpoint name was registered twice
    #[error("duplicate endpoint: {0}")]
    DuplicateEndpoint(String),

    /// The schema oracle could not produce a verdict
    #[error("schema oracle failed for {contract}: {reason}")]
    SchemaOracle {
        /// Contract being checked
        contract: String,
        /// Failure description
        reason: String,
    },

    /// Shared-library failure (client construction, payload handling)
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl RunnerError {
    /// Create a missing-prerequisite error.
    #[must_use]
    pub const fn missing(slot: Slot) -> Self {
        Self::MissingContext { slot }
    }

    /// Create an invalid URL error.
    #[must_use]
    pub fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_context_display() {
        let err = RunnerError::missing(Slot::AccessToken);
        assert_eq!(err.to_string(), "missing prerequisite: access_token not set");
    }

    #[test]
    fn test_slot_ownership_display() {
        let err = RunnerError::SlotOwnership {
            slot: Slot::SubjectWorkId,
            writer: SuiteId::Viewing,
            owner: SuiteId::Dashboard,
        };
        assert_eq!(
            err.to_string(),
            "Work Viewing may not write subject_work_id; owner is Dashboard API"
        );
    }

    #[test]
    fn test_platform_error_is_transparent() {
        let err: RunnerError = PlatformError::internal("boom").into();
        assert_eq!(err.to_string(), "Internal error: boom");
    }
}
