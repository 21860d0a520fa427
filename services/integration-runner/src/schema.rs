//! Schema oracle.
//!
//! Database introspection lives outside the runner. The runner only asks
//! yes/no questions of the form "does the schema satisfy contract X".

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::RunnerError;

/// Answers whether the database schema satisfies a named contract.
#[async_trait]
pub trait SchemaOracle: Send + Sync {
    /// Check one contract.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::SchemaOracle`] when no verdict can be
    /// obtained.
    async fn satisfies(&self, contract: &str) -> Result<bool, RunnerError>;
}

/// Oracle backed by an external command.
///
/// The command line is split on whitespace and invoked with the contract
/// as one extra argument; exit status 0 means satisfied, any other exit
/// status means not satisfied.
#[derive(Debug, Clone)]
pub struct CommandSchemaOracle {
    program: String,
    args: Vec<String>,
}

impl CommandSchemaOracle {
    /// Parse a command line such as `psql-check --db ao3`.
    ///
    /// Returns `None` for a blank command line.
    #[must_use]
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Program being invoked.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl SchemaOracle for CommandSchemaOracle {
    async fn satisfies(&self, contract: &str) -> Result<bool, RunnerError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(contract)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| RunnerError::SchemaOracle {
                contract: contract.to_string(),
                reason: e.to_string(),
            })?;

        debug!(contract, code = ?status.code(), "schema oracle answered");
        match status.code() {
            Some(code) => Ok(code == 0),
            None => Err(RunnerError::SchemaOracle {
                contract: contract.to_string(),
                reason: "terminated by signal".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_line() {
        let oracle = CommandSchemaOracle::parse("  check-schema --db ao3_nuclear ").unwrap();
        assert_eq!(oracle.program(), "check-schema");
        assert_eq!(oracle.args, vec!["--db", "ao3_nuclear"]);
        assert!(CommandSchemaOracle::parse("   ").is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_status_is_verdict() {
        let yes = CommandSchemaOracle::parse("true").unwrap();
        let no = CommandSchemaOracle::parse("false").unwrap();
        assert!(yes.satisfies("table:users").await.unwrap());
        assert!(!no.satisfies("table:users").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_program_is_error() {
        let oracle = CommandSchemaOracle::parse("definitely-not-a-real-schema-checker").unwrap();
        let err = oracle.satisfies("table:works").await.unwrap_err();
        assert!(matches!(err, RunnerError::SchemaOracle { .. }));
    }
}
