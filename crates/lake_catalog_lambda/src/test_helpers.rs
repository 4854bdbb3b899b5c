//! In-memory collaborators for exercising handlers without AWS.
//!
//! Every fake records what it was asked to do behind a `Mutex` so tests can
//! assert on the exact calls after a handler returns.

use std::collections::HashMap;
use std::sync::Mutex;

use lake_catalog_core::contract::FeedRef;
use lake_catalog_core::custom_resource::CustomResourceResponse;
use lake_catalog_core::grants::{BatchFailure, BatchOutcome, PermissionEntry};
use serde_json::{Map, Value};

use crate::adapters::access_control::AccessControl;
use crate::adapters::catalog::{
    CatalogClient, CatalogError, PartitionSpec, StorageDescriptorLocation,
};
use crate::adapters::publisher::{NotificationPublisher, PublishRequest};
use crate::adapters::response_sender::ResponseSender;

/// Storage descriptor kept as the raw JSON attribute map.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonDescriptor(pub Map<String, Value>);

impl StorageDescriptorLocation for JsonDescriptor {
    fn with_location(&self, location: &str) -> Self {
        let mut attributes = self.0.clone();
        attributes.insert("Location".to_string(), Value::String(location.to_string()));
        Self(attributes)
    }
}

impl JsonDescriptor {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(attributes) => Self(attributes),
            _ => Self(Map::new()),
        }
    }
}

/// Catalog that remembers created partitions and reports duplicates the way
/// the real service does.
#[derive(Default)]
pub struct RecordingCatalog {
    tables: HashMap<FeedRef, JsonDescriptor>,
    partitions: Mutex<Vec<(FeedRef, PartitionSpec<JsonDescriptor>)>>,
    lookups: Mutex<Vec<FeedRef>>,
    create_failure: Option<CatalogError>,
}

impl RecordingCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: FeedRef, descriptor: JsonDescriptor) -> Self {
        self.tables.insert(table, descriptor);
        self
    }

    pub fn failing_creates(mut self, error: CatalogError) -> Self {
        self.create_failure = Some(error);
        self
    }

    pub fn partitions(&self) -> Vec<(FeedRef, PartitionSpec<JsonDescriptor>)> {
        self.partitions.lock().expect("poisoned mutex").clone()
    }

    pub fn lookups(&self) -> Vec<FeedRef> {
        self.lookups.lock().expect("poisoned mutex").clone()
    }
}

impl CatalogClient for RecordingCatalog {
    type Descriptor = JsonDescriptor;

    fn table_storage_descriptor(&self, table: &FeedRef) -> Result<JsonDescriptor, CatalogError> {
        self.lookups
            .lock()
            .expect("poisoned mutex")
            .push(table.clone());
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| CatalogError::EntityNotFound(format!("table {table} not found")))
    }

    fn create_partition(
        &self,
        table: &FeedRef,
        partition: &PartitionSpec<JsonDescriptor>,
    ) -> Result<(), CatalogError> {
        if let Some(error) = &self.create_failure {
            return Err(error.clone());
        }

        let mut partitions = self.partitions.lock().expect("poisoned mutex");
        let duplicate = partitions
            .iter()
            .any(|(existing_table, existing)| {
                existing_table == table && existing.values == partition.values
            });
        if duplicate {
            return Err(CatalogError::AlreadyExists(format!(
                "partition {:?} already exists on {table}",
                partition.values
            )));
        }

        partitions.push((table.clone(), partition.clone()));
        Ok(())
    }
}

#[derive(Default)]
pub struct CapturingPublisher {
    requests: Mutex<Vec<PublishRequest>>,
    fail: bool,
}

impl CapturingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every request, then reports it as undeliverable.
    pub fn failing() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn requests(&self) -> Vec<PublishRequest> {
        self.requests.lock().expect("poisoned mutex").clone()
    }

    pub fn messages(&self) -> Vec<Value> {
        self.requests()
            .iter()
            .map(|request| serde_json::from_str(&request.message).expect("message is JSON"))
            .collect()
    }
}

impl NotificationPublisher for CapturingPublisher {
    fn publish(&self, request: &PublishRequest) -> Result<(), String> {
        self.requests
            .lock()
            .expect("poisoned mutex")
            .push(request.clone());
        if self.fail {
            Err("notification topic unavailable".to_string())
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessCall {
    Grant(PermissionEntry),
    Revoke(PermissionEntry),
    BatchGrant(Vec<PermissionEntry>),
    BatchRevoke(Vec<PermissionEntry>),
}

#[derive(Default)]
pub struct RecordingAccessControl {
    calls: Mutex<Vec<AccessCall>>,
    batch_failures: Vec<BatchFailure>,
    error: Option<String>,
}

impl RecordingAccessControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with `message` after being recorded.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Batch calls succeed but report `failures` for individual entries.
    pub fn with_batch_failures(failures: Vec<BatchFailure>) -> Self {
        Self {
            batch_failures: failures,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<AccessCall> {
        self.calls.lock().expect("poisoned mutex").clone()
    }

    fn record(&self, call: AccessCall) -> Result<(), String> {
        self.calls.lock().expect("poisoned mutex").push(call);
        match &self.error {
            Some(message) => Err(message.clone()),
            None => Ok(()),
        }
    }

    fn batch_outcome(&self) -> BatchOutcome {
        BatchOutcome {
            failures: self.batch_failures.clone(),
        }
    }
}

impl AccessControl for RecordingAccessControl {
    fn grant_permissions(&self, entry: &PermissionEntry) -> Result<(), String> {
        self.record(AccessCall::Grant(entry.clone()))
    }

    fn revoke_permissions(&self, entry: &PermissionEntry) -> Result<(), String> {
        self.record(AccessCall::Revoke(entry.clone()))
    }

    fn batch_grant_permissions(&self, entries: &[PermissionEntry]) -> Result<BatchOutcome, String> {
        self.record(AccessCall::BatchGrant(entries.to_vec()))?;
        Ok(self.batch_outcome())
    }

    fn batch_revoke_permissions(
        &self,
        entries: &[PermissionEntry],
    ) -> Result<BatchOutcome, String> {
        self.record(AccessCall::BatchRevoke(entries.to_vec()))?;
        Ok(self.batch_outcome())
    }
}

#[derive(Default)]
pub struct CapturingResponseSender {
    responses: Mutex<Vec<(String, CustomResourceResponse)>>,
    fail: bool,
}

impl CapturingResponseSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn responses(&self) -> Vec<(String, CustomResourceResponse)> {
        self.responses.lock().expect("poisoned mutex").clone()
    }
}

impl ResponseSender for CapturingResponseSender {
    fn send_response(
        &self,
        response_url: &str,
        response: &CustomResourceResponse,
    ) -> Result<(), String> {
        self.responses
            .lock()
            .expect("poisoned mutex")
            .push((response_url.to_string(), response.clone()));
        if self.fail {
            Err("presigned url expired".to_string())
        } else {
            Ok(())
        }
    }
}
