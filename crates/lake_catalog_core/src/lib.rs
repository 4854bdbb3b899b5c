//! Shared data-lake catalog automation primitives.
//!
//! This crate owns the message contracts exchanged with the ingestion hub,
//! grant request validation, and the custom resource callback shape. It
//! intentionally excludes AWS SDK and Lambda runtime concerns, which live in
//! `lake_catalog_lambda`.

pub mod attributes;
pub mod contract;
pub mod custom_resource;
pub mod grants;
pub mod queue;
pub mod validation;
