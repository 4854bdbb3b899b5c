use std::fmt::Debug;

use lake_catalog_core::contract::FeedRef;

/// A table storage descriptor that can be re-pointed at a new location.
///
/// Every other attribute must survive `with_location` unchanged: partitions
/// inherit the table's format and schema exactly.
pub trait StorageDescriptorLocation: Clone + Debug {
    fn with_location(&self, location: &str) -> Self;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartitionSpec<D> {
    pub values: Vec<String>,
    pub storage_descriptor: D,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog entity not found: {0}")]
    EntityNotFound(String),
    #[error("partition already exists: {0}")]
    AlreadyExists(String),
    #[error("catalog request failed: {0}")]
    Service(String),
}

pub trait CatalogClient {
    type Descriptor: StorageDescriptorLocation;

    fn table_storage_descriptor(&self, table: &FeedRef) -> Result<Self::Descriptor, CatalogError>;

    fn create_partition(
        &self,
        table: &FeedRef,
        partition: &PartitionSpec<Self::Descriptor>,
    ) -> Result<(), CatalogError>;
}
