use lake_catalog_core::grants::{BatchOutcome, PermissionEntry};

pub trait AccessControl {
    fn grant_permissions(&self, entry: &PermissionEntry) -> Result<(), String>;

    fn revoke_permissions(&self, entry: &PermissionEntry) -> Result<(), String>;

    fn batch_grant_permissions(&self, entries: &[PermissionEntry]) -> Result<BatchOutcome, String>;

    fn batch_revoke_permissions(&self, entries: &[PermissionEntry])
        -> Result<BatchOutcome, String>;
}
