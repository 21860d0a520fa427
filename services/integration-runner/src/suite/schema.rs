//! Database schema contracts checked through a [`SchemaOracle`].

use std::sync::Arc;

use async_trait::async_trait;

use super::{Suite, SuiteId};
use crate::context::TestContext;
use crate::error::RunnerError;
use crate::recorder::AssertionRecorder;
use crate::schema::SchemaOracle;

/// Tables the platform cannot run without.
pub const REQUIRED_TABLES: [&str; 9] = [
    "users",
    "works",
    "chapters",
    "tags",
    "creatorship",
    "series",
    "collections",
    "bookmarks",
    "comments",
];

/// Columns the work service reads from `works`.
pub const REQUIRED_WORK_COLUMNS: [&str; 17] = [
    "id",
    "title",
    "summary",
    "notes",
    "language",
    "rating",
    "category",
    "warnings",
    "fandoms",
    "characters",
    "relationships",
    "freeform_tags",
    "series_id",
    "max_chapters",
    "chapter_count",
    "created_at",
    "updated_at",
];

/// Asks the schema oracle about every required table and `works` column.
pub struct SchemaSuite {
    oracle: Arc<dyn SchemaOracle>,
}

impl SchemaSuite {
    /// Create the suite.
    #[must_use]
    pub fn new(oracle: Arc<dyn SchemaOracle>) -> Self {
        Self { oracle }
    }

    /// Contract names in check order: `table:<name>` then
    /// `column:works.<name>`.
    #[must_use]
    pub fn contracts() -> Vec<(String, String)> {
        let tables = REQUIRED_TABLES
            .iter()
            .map(|t| (format!("table:{t}"), format!("Table '{t}' exists")));
        let columns = REQUIRED_WORK_COLUMNS
            .iter()
            .map(|c| (format!("column:works.{c}"), format!("Works table has '{c}' column")));
        tables.chain(columns).collect()
    }
}

#[async_trait]
impl Suite for SchemaSuite {
    fn id(&self) -> SuiteId {
        SuiteId::Schema
    }

    async fn execute(
        &self,
        _ctx: &mut TestContext,
        recorder: &mut AssertionRecorder,
    ) -> Result<bool, RunnerError> {
        let mut schema_ok = true;
        for (contract, name) in Self::contracts() {
            let satisfied = self.oracle.satisfies(&contract).await?;
            let detail = format!("contract {contract} not satisfied");
            schema_ok &= recorder.record(name, satisfied, detail);
        }
        Ok(schema_ok)
    }
}
