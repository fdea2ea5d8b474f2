use async_trait::async_trait;

use carescope_core::AppResult;
use carescope_domain::{PermissionKey, PermissionScope, Role, RolePermission};

/// Read-only port over the role permission reference table.
///
/// Implementations report transport failures as `AppError::StoreUnavailable`
/// and a missing row as `Ok(None)`.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Finds the row for one key in exactly one scope. Never falls back.
    async fn find_permission(
        &self,
        scope: PermissionScope,
        key: &PermissionKey,
    ) -> AppResult<Option<RolePermission>>;

    /// Lists every row stored in one scope.
    async fn list_permissions(&self, scope: PermissionScope) -> AppResult<Vec<RolePermission>>;
}

/// Read-only port over the role reference table.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Lists roles ordered by role code.
    async fn list_roles(&self, include_inactive: bool) -> AppResult<Vec<Role>>;
}
