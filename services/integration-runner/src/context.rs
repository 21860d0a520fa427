//! Run-scoped test context.
//!
//! The only state shared between suites. Every slot has exactly one
//! designated writer suite; writes from any other suite are rejected, so a
//! consumer can never clobber a producer's value.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::RunnerError;
use crate::suite::SuiteId;

/// A named context value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    /// Bearer token from login
    AccessToken,
    /// Authenticated user's id
    SubjectUserId,
    /// Id of the work the downstream suites inspect
    SubjectWorkId,
    /// Whether that work is readable anonymously
    SubjectWorkVisibility,
    /// Id of the account created by registration
    RegisteredUserId,
    /// Id of the work created during the run
    CreatedWorkId,
}

impl Slot {
    /// The only suite allowed to write this slot.
    #[must_use]
    pub const fn owner(self) -> SuiteId {
        match self {
            Self::AccessToken | Self::SubjectUserId => SuiteId::Auth,
            Self::SubjectWorkId | Self::SubjectWorkVisibility => SuiteId::Dashboard,
            Self::RegisteredUserId => SuiteId::Register,
            Self::CreatedWorkId => SuiteId::Create,
        }
    }

    /// Stable snake_case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccessToken => "access_token",
            Self::SubjectUserId => "subject_user_id",
            Self::SubjectWorkId => "subject_work_id",
            Self::SubjectWorkVisibility => "subject_work_visibility",
            Self::RegisteredUserId => "registered_user_id",
            Self::CreatedWorkId => "created_work_id",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who may read a work without credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Anonymous callers get 200
    Public,
    /// Anonymous callers get 403
    Private,
}

impl Visibility {
    /// Derive visibility from a dashboard entry's `status` and `restricted`
    /// fields. Drafts, hidden works, and restricted works are private. A
    /// posted work is public only when the entry states `restricted: false`;
    /// listings that omit the flag leave visibility unknown.
    #[must_use]
    pub fn from_listing(status: Option<&str>, restricted: Option<bool>) -> Option<Self> {
        match (status, restricted) {
            (_, Some(true)) | (Some("draft" | "hidden"), _) => Some(Self::Private),
            (Some("posted" | "published"), Some(false)) => Some(Self::Public),
            _ => None,
        }
    }

    /// Expected status for an anonymous fetch.
    #[must_use]
    pub const fn anonymous_status(self) -> u16 {
        match self {
            Self::Public => 200,
            Self::Private => 403,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "public" => Some(Self::Public),
            "private" => Some(Self::Private),
            _ => None,
        }
    }
}

/// Mutable state bag shared by reference across all suites of one run.
#[derive(Debug, Default, Clone)]
pub struct TestContext {
    slots: BTreeMap<Slot, String>,
}

impl TestContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `slot` on behalf of `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::SlotOwnership`] if `writer` is not the slot's
    /// owner.
    pub fn put(
        &mut self,
        writer: SuiteId,
        slot: Slot,
        value: impl Into<String>,
    ) -> Result<(), RunnerError> {
        let owner = slot.owner();
        if writer != owner {
            return Err(RunnerError::SlotOwnership {
                slot,
                writer,
                owner,
            });
        }
        self.slots.insert(slot, value.into());
        Ok(())
    }

    /// Read a slot.
    #[must_use]
    pub fn get(&self, slot: Slot) -> Option<&str> {
        self.slots.get(&slot).map(String::as_str)
    }

    /// Read a slot that must have been produced earlier.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::MissingContext`] when unset.
    pub fn require(&self, slot: Slot) -> Result<&str, RunnerError> {
        self.get(slot).ok_or(RunnerError::missing(slot))
    }

    /// Bearer token, if login succeeded.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.get(Slot::AccessToken)
    }

    /// Work id picked from the dashboard.
    #[must_use]
    pub fn subject_work_id(&self) -> Option<&str> {
        self.get(Slot::SubjectWorkId)
    }

    /// Id of the work created during the run.
    #[must_use]
    pub fn created_work_id(&self) -> Option<&str> {
        self.get(Slot::CreatedWorkId)
    }

    /// Visibility of the subject work, when the dashboard could tell.
    #[must_use]
    pub fn subject_work_visibility(&self) -> Option<Visibility> {
        self.get(Slot::SubjectWorkVisibility)
            .and_then(Visibility::parse)
    }

    /// Store the subject work's visibility.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::SlotOwnership`] for non-owners.
    pub fn put_visibility(
        &mut self,
        writer: SuiteId,
        visibility: Visibility,
    ) -> Result<(), RunnerError> {
        self.put(writer, Slot::SubjectWorkVisibility, visibility.as_str())
    }
}
