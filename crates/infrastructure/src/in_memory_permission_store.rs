use std::collections::HashMap;

use async_trait::async_trait;
use carescope_application::PermissionStore;
use carescope_core::{AppError, AppResult};
use carescope_domain::{PermissionKey, PermissionScope, RolePermission};
use tokio::sync::RwLock;

/// In-memory permission store for tests and local tooling.
///
/// Each key is read under one lock acquisition, so readers never see a
/// half-applied replacement.
#[derive(Debug, Default)]
pub struct InMemoryPermissionStore {
    rows: RwLock<HashMap<(PermissionScope, PermissionKey), RolePermission>>,
}

impl InMemoryPermissionStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    /// Adds a row, rejecting a second row for the same scope and key.
    pub async fn insert(&self, permission: RolePermission) -> AppResult<()> {
        let key = (permission.scope(), permission.key().clone());
        let mut rows = self.rows.write().await;

        if rows.contains_key(&key) {
            return Err(AppError::Validation(format!(
                "permission '{}' already exists for {}",
                key.1, key.0
            )));
        }

        rows.insert(key, permission);
        Ok(())
    }

    /// Replaces the whole data set in one step.
    pub async fn replace_all(&self, permissions: Vec<RolePermission>) -> AppResult<()> {
        let mut next = HashMap::with_capacity(permissions.len());
        for permission in permissions {
            let key = (permission.scope(), permission.key().clone());
            if next.contains_key(&key) {
                return Err(AppError::Validation(format!(
                    "permission '{}' is duplicated for {}",
                    key.1, key.0
                )));
            }
            next.insert(key, permission);
        }

        *self.rows.write().await = next;
        Ok(())
    }
}

#[async_trait]
impl PermissionStore for InMemoryPermissionStore {
    async fn find_permission(
        &self,
        scope: PermissionScope,
        key: &PermissionKey,
    ) -> AppResult<Option<RolePermission>> {
        Ok(self.rows.read().await.get(&(scope, key.clone())).cloned())
    }

    async fn list_permissions(&self, scope: PermissionScope) -> AppResult<Vec<RolePermission>> {
        let rows = self.rows.read().await;

        let mut values: Vec<RolePermission> = rows
            .iter()
            .filter_map(|((stored_scope, _), row)| (stored_scope == &scope).then(|| row.clone()))
            .collect();
        values.sort_by(|left, right| left.key().cmp(right.key()));

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use carescope_application::PermissionStore;
    use carescope_core::TenantId;
    use carescope_domain::{
        PermissionFlags, PermissionKey, PermissionScope, PermissionType, ResourceType, RoleCode,
        RolePermission,
    };
    use uuid::Uuid;

    use super::InMemoryPermissionStore;

    fn row(scope: PermissionScope, role_code: &str, flags: PermissionFlags) -> RolePermission {
        RolePermission::new(
            Uuid::new_v4(),
            scope,
            PermissionKey::new(
                RoleCode::new(role_code).unwrap_or_else(|_| unreachable!()),
                ResourceType::new("residents").unwrap_or_else(|_| unreachable!()),
                PermissionType::Read,
            ),
            flags,
        )
    }

    #[tokio::test]
    async fn duplicate_scope_and_key_is_rejected() {
        let store = InMemoryPermissionStore::new();
        let tenant = PermissionScope::Tenant(TenantId::new());

        assert!(
            store
                .insert(row(tenant, "Nurse", PermissionFlags::new(true, false)))
                .await
                .is_ok()
        );
        assert!(
            store
                .insert(row(tenant, "Nurse", PermissionFlags::new(false, false)))
                .await
                .is_err()
        );
        assert!(
            store
                .insert(row(
                    PermissionScope::System,
                    "Nurse",
                    PermissionFlags::new(false, false)
                ))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn listing_is_limited_to_one_scope_and_sorted() {
        let store = InMemoryPermissionStore::new();
        let tenant = PermissionScope::Tenant(TenantId::new());
        let rows = vec![
            row(PermissionScope::System, "Nurse", PermissionFlags::new(true, false)),
            row(PermissionScope::System, "Admin", PermissionFlags::new(false, false)),
            row(tenant, "Manager", PermissionFlags::new(false, true)),
        ];
        assert!(store.replace_all(rows).await.is_ok());

        let listed = store.list_permissions(PermissionScope::System).await;

        let Ok(listed) = listed else {
            panic!("listing failed");
        };
        let role_codes: Vec<&str> = listed
            .iter()
            .map(|row| row.key().role_code.as_str())
            .collect();
        assert_eq!(role_codes, vec!["Admin", "Nurse"]);
    }

    #[tokio::test]
    async fn replace_all_rejects_duplicates_and_keeps_previous_rows() {
        let store = InMemoryPermissionStore::new();
        assert!(
            store
                .insert(row(
                    PermissionScope::System,
                    "Carer",
                    PermissionFlags::new(true, true)
                ))
                .await
                .is_ok()
        );

        let result = store
            .replace_all(vec![
                row(PermissionScope::System, "Admin", PermissionFlags::default()),
                row(PermissionScope::System, "Admin", PermissionFlags::default()),
            ])
            .await;

        assert!(result.is_err());
        let listed = store.list_permissions(PermissionScope::System).await;
        assert!(matches!(listed, Ok(rows) if rows.len() == 1));
    }
}
