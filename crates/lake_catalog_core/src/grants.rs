use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::validation::{IssueCollector, ValidationError};

pub const DATABASE_PERMISSION: &str = "DESCRIBE";
pub const TABLE_PERMISSION: &str = "ALL";

const DELETE_REQUEST_TYPE: &str = "Delete";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantMode {
    Grant,
    Revoke,
}

impl GrantMode {
    /// `Delete` revokes; any other request type, or none, grants.
    pub fn from_request_type(request_type: Option<&str>) -> Self {
        match request_type {
            Some(DELETE_REQUEST_TYPE) => Self::Revoke,
            _ => Self::Grant,
        }
    }
}

impl fmt::Display for GrantMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grant => f.write_str("grant"),
            Self::Revoke => f.write_str("revoke"),
        }
    }
}

/// Share request for one database and a set of its tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantRequest {
    pub external_account: String,
    pub database_name: String,
    pub table_names: Vec<String>,
}

impl GrantRequest {
    pub fn from_value(input: &Value) -> Result<Self, ValidationError> {
        let Some(object) = input.as_object() else {
            return Err(ValidationError::single(
                "input",
                "grant request must be a JSON object",
            ));
        };

        let mut issues = IssueCollector::default();
        let external_account = issues.required_string(object, "external_account");
        let database_name = issues.required_string(object, "database_name");
        let table_names = issues.required_string_list(object, "table_name_list");
        issues.finish()?;

        match (external_account, database_name, table_names) {
            (Some(external_account), Some(database_name), Some(table_names)) => Ok(Self {
                external_account: external_account.trim().to_string(),
                database_name: database_name.trim().to_string(),
                table_names,
            }),
            _ => Err(ValidationError::single(
                "input",
                "grant request is incomplete",
            )),
        }
    }

    /// `DESCRIBE` on the database itself.
    pub fn database_entry(&self) -> PermissionEntry {
        PermissionEntry {
            id: fresh_entry_id(),
            principal: self.external_account.clone(),
            resource: CatalogResource::Database {
                name: self.database_name.clone(),
            },
            permissions: vec![DATABASE_PERMISSION.to_string()],
            permissions_with_grant_option: vec![DATABASE_PERMISSION.to_string()],
        }
    }

    /// One `ALL` entry per table, in request order, each with a fresh id.
    pub fn table_entries(&self) -> Vec<PermissionEntry> {
        self.table_names
            .iter()
            .map(|table_name| PermissionEntry {
                id: fresh_entry_id(),
                principal: self.external_account.clone(),
                resource: CatalogResource::Table {
                    database_name: self.database_name.clone(),
                    name: table_name.clone(),
                },
                permissions: vec![TABLE_PERMISSION.to_string()],
                permissions_with_grant_option: vec![TABLE_PERMISSION.to_string()],
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CatalogResource {
    Database { name: String },
    Table { database_name: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PermissionEntry {
    pub id: String,
    pub principal: String,
    pub resource: CatalogResource,
    pub permissions: Vec<String>,
    pub permissions_with_grant_option: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchFailure {
    pub entry_id: Option<String>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

/// Result of a batch grant or revoke call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchOutcome {
    pub failures: Vec<BatchFailure>,
}

pub fn fresh_entry_id() -> String {
    Uuid::new_v4().to_string()
}
