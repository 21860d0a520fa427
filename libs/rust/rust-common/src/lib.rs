//! Shared library for cross-cutting concerns in platform integration tooling.
//!
//! This crate provides centralized implementations for:
//! - Error types for client construction and payload handling
//! - HTTP client configuration and building
//! - Retry policies with exponential backoff
//! - Tracing subscriber setup

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod http;
pub mod retry;
pub mod tracing_config;

pub use error::PlatformError;
pub use http::{HttpConfig, build_http_client};
pub use retry::{RetryConfig, RetryPolicy};
pub use tracing_config::{TracingConfig, init_tracing};
