//! Black-box integration test orchestrator for the gateway and its backing
//! services.
//!
//! Drives real HTTP traffic against running auth, work, tag and search
//! services and the API gateway in front of them, threading a bearer token
//! and entity ids between dependent suites, and reduces the outcome to a
//! CI exit status.
//!
//! - [`endpoint`]: logical service name to base URL
//! - [`probe`]: one bounded HTTP exchange, never failing
//! - [`recorder`]: named pass/fail checks
//! - [`context`]: run-scoped state with single-writer slots
//! - [`comparator`]: gateway-vs-direct structural equivalence
//! - [`suite`]: the capability-area checks
//! - [`orchestrator`]: sequencing, isolation and the final report

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod comparator;
pub mod config;
pub mod context;
pub mod endpoint;
pub mod error;
pub mod orchestrator;
pub mod probe;
pub mod recorder;
pub mod report;
pub mod schema;
pub mod suite;

pub use comparator::{Comparison, compare, equivalent};
pub use config::{Config, ConfigError};
pub use context::{Slot, TestContext, Visibility};
pub use endpoint::{EndpointRegistry, ServiceEndpoint};
pub use error::RunnerError;
pub use orchestrator::Orchestrator;
pub use probe::{HttpProbe, ProbeBody, ProbeOutcome, ProbeRequest};
pub use recorder::{Assertion, AssertionRecorder};
pub use report::{RunReport, SuiteResult};
pub use schema::{CommandSchemaOracle, SchemaOracle};
pub use suite::{Credentials, Suite, SuiteEnv, SuiteId, build_suites};
