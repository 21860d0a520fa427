//! Shared test utilities for platform integration tooling.
//!
//! This crate provides:
//! - Proptest generators for payloads and identifiers
//! - A wiremock-backed mock of the gateway and its services
//! - Test fixtures with sample data

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod generators;
pub mod mocks;
pub mod fixtures;

pub use generators::*;
pub use mocks::{MockPlatform, MockPlatformBuilder};
