//! Registers newly landed partitions on existing catalog tables.
//!
//! Per record: decode the body (unwrapping a topic envelope), skip anything
//! that is not a file-create success, copy the table's storage descriptor
//! with only the location replaced, and create the partition. A duplicate
//! partition counts as success so redelivered notifications stay idempotent.
//! Any other failure propagates so queue redelivery, and eventually the
//! dead-letter queue, takes over.

use lake_catalog_core::contract::{
    decode_notification_body, is_file_create_success, notify_type, outcome_notification,
    DecodeError, PartitionNotification, PARTITION_ADD_SUCCESS, PARTITION_REFRESH_SUBJECT,
};
use lake_catalog_core::queue::{is_queue_event, queue_records, QueueEventError, QueueRecord};
use lake_catalog_core::validation::ValidationError;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::adapters::catalog::{
    CatalogClient, CatalogError, PartitionSpec, StorageDescriptorLocation,
};
use crate::adapters::publisher::NotificationPublisher;
use crate::relay::relay_notification;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordOutcome {
    Skipped { notify_type: Option<String> },
    Created { table: String, values: Vec<String> },
    AlreadyExists { table: String, values: Vec<String> },
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrarError {
    #[error(transparent)]
    Event(#[from] QueueEventError),
    #[error("invalid record body: {0}")]
    Decode(#[from] DecodeError),
    #[error("invalid partition notification: {0}")]
    Validation(#[from] ValidationError),
    #[error("failed to read storage descriptor for {table}: {source}")]
    DescriptorFetch {
        table: String,
        #[source]
        source: CatalogError,
    },
    #[error("failed to create partition on {table}: {source}")]
    PartitionCreate {
        table: String,
        #[source]
        source: CatalogError,
    },
}

/// Processes every record of a queue event in delivery order.
///
/// Stops at the first hard failure and returns it, leaving the whole
/// message batch to queue redelivery.
pub fn handle_partition_event<C: CatalogClient>(
    event: &Value,
    topic_arn: &str,
    catalog: &C,
    publisher: &impl NotificationPublisher,
) -> Result<Vec<RecordOutcome>, RegistrarError> {
    let records = queue_records(event)?;
    if !is_queue_event(event) {
        warn!(
            records = records.len(),
            "event records are not tagged as queue deliveries"
        );
    }

    let mut outcomes = Vec::with_capacity(records.len());
    for raw_record in records {
        let record = QueueRecord::from_value(raw_record)?;
        outcomes.push(register_partition(&record, topic_arn, catalog, publisher)?);
    }
    Ok(outcomes)
}

pub fn register_partition<C: CatalogClient>(
    record: &QueueRecord,
    topic_arn: &str,
    catalog: &C,
    publisher: &impl NotificationPublisher,
) -> Result<RecordOutcome, RegistrarError> {
    let body = decode_notification_body(&record.body)?;

    if !is_file_create_success(&body) {
        let notify_type = notify_type(&body).map(str::to_string);
        info!(
            message_id = record.message_id.as_deref().unwrap_or_default(),
            notify_type = notify_type.as_deref().unwrap_or("<missing>"),
            "skipping notification"
        );
        return Ok(RecordOutcome::Skipped { notify_type });
    }

    let notification = PartitionNotification::from_body(&body)?;
    let table = &notification.feed;
    info!(
        database = %table.database,
        table = %table.table,
        values = ?notification.partition_value_list,
        keys = ?notification.partition_key,
        "registering partition"
    );

    let descriptor = catalog
        .table_storage_descriptor(table)
        .map_err(|source| RegistrarError::DescriptorFetch {
            table: table.to_string(),
            source,
        })?;

    let partition = PartitionSpec {
        values: notification.partition_value_list.clone(),
        storage_descriptor: descriptor.with_location(&notification.partition_prefix),
    };

    let outcome = match catalog.create_partition(table, &partition) {
        Ok(()) => {
            info!(table = %table, location = %notification.partition_prefix, "partition created");
            RecordOutcome::Created {
                table: table.to_string(),
                values: partition.values,
            }
        }
        Err(CatalogError::AlreadyExists(detail)) => {
            info!(table = %table, %detail, "partition already present");
            RecordOutcome::AlreadyExists {
                table: table.to_string(),
                values: partition.values,
            }
        }
        Err(source) => {
            error!(table = %table, error = %source, "partition creation failed");
            return Err(RegistrarError::PartitionCreate {
                table: table.to_string(),
                source,
            });
        }
    };

    let message = outcome_notification(&body, PARTITION_ADD_SUCCESS);
    relay_notification(
        publisher,
        topic_arn,
        PARTITION_REFRESH_SUBJECT,
        &message,
        record.aws_region.as_deref(),
    );

    Ok(outcome)
}
