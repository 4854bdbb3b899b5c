//! AWS-oriented adapters and handlers for data-lake catalog automation.
//!
//! This crate owns runtime integration details (Lambda handlers, Glue, Lake
//! Formation and SNS clients, custom resource callbacks) on top of the
//! contracts in `lake_catalog_core`. Handlers only see the collaborator
//! traits in [`adapters`]; the AWS-backed implementations live in [`aws`].

pub mod adapters;
pub mod aws;
pub mod config;
pub mod handlers;
pub mod observability;
pub mod relay;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;
