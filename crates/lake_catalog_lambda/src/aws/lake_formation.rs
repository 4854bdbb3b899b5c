use aws_sdk_lakeformation::error::DisplayErrorContext;
use aws_sdk_lakeformation::types::{
    BatchPermissionsFailureEntry, BatchPermissionsRequestEntry, DataLakePrincipal,
    DatabaseResource, Permission, Resource, TableResource,
};
use lake_catalog_core::grants::{BatchFailure, BatchOutcome, CatalogResource, PermissionEntry};

use super::block_on;
use crate::adapters::access_control::AccessControl;

pub struct LakeFormationAccess {
    client: aws_sdk_lakeformation::Client,
}

impl LakeFormationAccess {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_lakeformation::Client::new(sdk_config),
        }
    }
}

impl AccessControl for LakeFormationAccess {
    fn grant_permissions(&self, entry: &PermissionEntry) -> Result<(), String> {
        let client = self.client.clone();
        let principal = principal(entry);
        let resource = resource(entry)?;
        let granted = permission_list(&entry.permissions);
        let grantable = permission_list(&entry.permissions_with_grant_option);

        block_on(async move {
            client
                .grant_permissions()
                .principal(principal)
                .resource(resource)
                .set_permissions(Some(granted))
                .set_permissions_with_grant_option(Some(grantable))
                .send()
                .await
                .map(|_| ())
                .map_err(|error| {
                    format!("grant_permissions failed: {}", DisplayErrorContext(&error))
                })
        })
    }

    fn revoke_permissions(&self, entry: &PermissionEntry) -> Result<(), String> {
        let client = self.client.clone();
        let principal = principal(entry);
        let resource = resource(entry)?;
        let granted = permission_list(&entry.permissions);
        let grantable = permission_list(&entry.permissions_with_grant_option);

        block_on(async move {
            client
                .revoke_permissions()
                .principal(principal)
                .resource(resource)
                .set_permissions(Some(granted))
                .set_permissions_with_grant_option(Some(grantable))
                .send()
                .await
                .map(|_| ())
                .map_err(|error| {
                    format!("revoke_permissions failed: {}", DisplayErrorContext(&error))
                })
        })
    }

    fn batch_grant_permissions(&self, entries: &[PermissionEntry]) -> Result<BatchOutcome, String> {
        let client = self.client.clone();
        let entries = batch_entries(entries)?;

        let output = block_on(async move {
            client
                .batch_grant_permissions()
                .set_entries(Some(entries))
                .send()
                .await
                .map_err(|error| {
                    format!("batch_grant_permissions failed: {}", DisplayErrorContext(&error))
                })
        })?;
        Ok(batch_outcome(output.failures()))
    }

    fn batch_revoke_permissions(
        &self,
        entries: &[PermissionEntry],
    ) -> Result<BatchOutcome, String> {
        let client = self.client.clone();
        let entries = batch_entries(entries)?;

        let output = block_on(async move {
            client
                .batch_revoke_permissions()
                .set_entries(Some(entries))
                .send()
                .await
                .map_err(|error| {
                    format!("batch_revoke_permissions failed: {}", DisplayErrorContext(&error))
                })
        })?;
        Ok(batch_outcome(output.failures()))
    }
}

fn principal(entry: &PermissionEntry) -> DataLakePrincipal {
    DataLakePrincipal::builder()
        .data_lake_principal_identifier(&entry.principal)
        .build()
}

fn resource(entry: &PermissionEntry) -> Result<Resource, String> {
    let builder = Resource::builder();
    let builder = match &entry.resource {
        CatalogResource::Database { name } => builder.database(
            DatabaseResource::builder()
                .name(name)
                .build()
                .map_err(|error| format!("invalid database resource: {error}"))?,
        ),
        CatalogResource::Table {
            database_name,
            name,
        } => builder.table(
            TableResource::builder()
                .database_name(database_name)
                .name(name)
                .build()
                .map_err(|error| format!("invalid table resource: {error}"))?,
        ),
    };
    Ok(builder.build())
}

fn permission_list(values: &[String]) -> Vec<Permission> {
    values
        .iter()
        .map(|value| Permission::from(value.as_str()))
        .collect()
}

fn batch_entries(entries: &[PermissionEntry]) -> Result<Vec<BatchPermissionsRequestEntry>, String> {
    entries
        .iter()
        .map(|entry| {
            BatchPermissionsRequestEntry::builder()
                .id(&entry.id)
                .principal(principal(entry))
                .resource(resource(entry)?)
                .set_permissions(Some(permission_list(&entry.permissions)))
                .set_permissions_with_grant_option(Some(permission_list(
                    &entry.permissions_with_grant_option,
                )))
                .build()
                .map_err(|error| format!("invalid batch entry {}: {error}", entry.id))
        })
        .collect()
}

fn batch_outcome(failures: &[BatchPermissionsFailureEntry]) -> BatchOutcome {
    BatchOutcome {
        failures: failures
            .iter()
            .map(|failure| BatchFailure {
                entry_id: failure
                    .request_entry()
                    .map(|entry| entry.id().to_string()),
                error_code: failure
                    .error()
                    .and_then(|detail| detail.error_code())
                    .map(str::to_string),
                error_message: failure
                    .error()
                    .and_then(|detail| detail.error_message())
                    .map(str::to_string),
            })
            .collect(),
    }
}
