use aws_sdk_glue::error::{DisplayErrorContext, SdkError};
use aws_sdk_glue::operation::create_partition::CreatePartitionError;
use aws_sdk_glue::operation::get_table::GetTableError;
use aws_sdk_glue::types::{PartitionInput, StorageDescriptor};
use lake_catalog_core::contract::FeedRef;

use super::block_on;
use crate::adapters::catalog::{
    CatalogClient, CatalogError, PartitionSpec, StorageDescriptorLocation,
};

impl StorageDescriptorLocation for StorageDescriptor {
    fn with_location(&self, location: &str) -> Self {
        let mut descriptor = self.clone();
        descriptor.location = Some(location.to_string());
        descriptor
    }
}

pub struct GlueCatalog {
    client: aws_sdk_glue::Client,
}

impl GlueCatalog {
    /// `endpoint_url` points the client at a VPC interface endpoint.
    pub fn new(sdk_config: &aws_config::SdkConfig, endpoint_url: Option<String>) -> Self {
        let mut builder = aws_sdk_glue::config::Builder::from(sdk_config);
        if let Some(url) = endpoint_url {
            builder = builder.endpoint_url(url);
        }
        Self {
            client: aws_sdk_glue::Client::from_conf(builder.build()),
        }
    }
}

impl CatalogClient for GlueCatalog {
    type Descriptor = StorageDescriptor;

    fn table_storage_descriptor(&self, table: &FeedRef) -> Result<StorageDescriptor, CatalogError> {
        let client = self.client.clone();
        let database_name = table.database.clone();
        let table_name = table.table.clone();

        let output = block_on(async move {
            client
                .get_table()
                .database_name(database_name)
                .name(table_name)
                .send()
                .await
        })
        .map_err(classify_get_table_error)?;

        output
            .table()
            .and_then(|value| value.storage_descriptor())
            .cloned()
            .ok_or_else(|| CatalogError::Service(format!("table {table} has no storage descriptor")))
    }

    fn create_partition(
        &self,
        table: &FeedRef,
        partition: &PartitionSpec<StorageDescriptor>,
    ) -> Result<(), CatalogError> {
        let client = self.client.clone();
        let database_name = table.database.clone();
        let table_name = table.table.clone();
        let input = PartitionInput::builder()
            .set_values(Some(partition.values.clone()))
            .storage_descriptor(partition.storage_descriptor.clone())
            .build();

        block_on(async move {
            client
                .create_partition()
                .database_name(database_name)
                .table_name(table_name)
                .partition_input(input)
                .send()
                .await
        })
        .map(|_| ())
        .map_err(classify_create_partition_error)
    }
}

fn classify_get_table_error(error: SdkError<GetTableError>) -> CatalogError {
    let message = DisplayErrorContext(&error).to_string();
    match error.as_service_error() {
        Some(GetTableError::EntityNotFoundException(_)) => CatalogError::EntityNotFound(message),
        _ => CatalogError::Service(message),
    }
}

fn classify_create_partition_error(error: SdkError<CreatePartitionError>) -> CatalogError {
    let message = DisplayErrorContext(&error).to_string();
    match error.as_service_error() {
        Some(CreatePartitionError::AlreadyExistsException(_)) => {
            CatalogError::AlreadyExists(message)
        }
        Some(CreatePartitionError::EntityNotFoundException(_)) => {
            CatalogError::EntityNotFound(message)
        }
        _ => CatalogError::Service(message),
    }
}
