use std::collections::BTreeMap;
use std::sync::Arc;

use carescope_core::{AppError, AppResult, TenantId};
use carescope_domain::{
    PermissionFlags, PermissionKey, PermissionScope, PermissionType, ResourceType, RoleCode,
};
use serde::Serialize;

use crate::PermissionStore;

/// Flags that apply to one key together with the row scope they came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectivePermission {
    /// Role/resource/operation key.
    pub key: PermissionKey,
    /// Effective scoping flags.
    pub flags: PermissionFlags,
    /// Scope of the row that supplied the flags.
    pub source: PermissionScope,
}

/// Resolves effective permission flags with tenant-over-system precedence.
#[derive(Clone)]
pub struct PermissionResolver {
    store: Arc<dyn PermissionStore>,
}

impl PermissionResolver {
    /// Creates a resolver reading from the given store.
    #[must_use]
    pub fn new(store: Arc<dyn PermissionStore>) -> Self {
        Self { store }
    }

    /// Returns the effective `assigned_only`/`branch_only` flags.
    ///
    /// Fails with `AppError::PermissionNotFound` when neither a tenant row nor
    /// a system row exists. Callers must treat that as a denial.
    pub async fn resolve(
        &self,
        role_code: &RoleCode,
        resource_type: &ResourceType,
        permission_type: PermissionType,
        tenant_id: Option<TenantId>,
    ) -> AppResult<PermissionFlags> {
        let key = PermissionKey::new(role_code.clone(), resource_type.clone(), permission_type);
        self.resolve_effective(&key, tenant_id)
            .await
            .map(|effective| effective.flags)
    }

    /// Same as [`Self::resolve`], also reporting which row applied.
    pub async fn resolve_effective(
        &self,
        key: &PermissionKey,
        tenant_id: Option<TenantId>,
    ) -> AppResult<EffectivePermission> {
        for scope in lookup_order(tenant_id) {
            if let Some(row) = self.store.find_permission(scope, key).await? {
                return Ok(EffectivePermission {
                    key: key.clone(),
                    flags: row.flags(),
                    source: row.scope(),
                });
            }
        }

        let context = tenant_id
            .map(|tenant_id| format!("tenant '{tenant_id}'"))
            .unwrap_or_else(|| "system context".to_owned());
        Err(AppError::PermissionNotFound(format!(
            "no permission row for '{key}' in {context} or in system defaults"
        )))
    }

    /// Lists every key visible to a tenant, tenant rows overriding system rows.
    ///
    /// Sorted by role, resource, then operation.
    pub async fn effective_permissions(
        &self,
        tenant_id: Option<TenantId>,
    ) -> AppResult<Vec<EffectivePermission>> {
        let mut effective = BTreeMap::new();

        // Least specific first so later scopes overwrite.
        for scope in lookup_order(tenant_id).into_iter().rev() {
            for row in self.store.list_permissions(scope).await? {
                effective.insert(
                    row.key().clone(),
                    EffectivePermission {
                        key: row.key().clone(),
                        flags: row.flags(),
                        source: row.scope(),
                    },
                );
            }
        }

        Ok(effective.into_values().collect())
    }
}

/// Candidate scopes in precedence order; the first hit wins.
fn lookup_order(tenant_id: Option<TenantId>) -> Vec<PermissionScope> {
    match tenant_id {
        Some(tenant_id) => vec![PermissionScope::Tenant(tenant_id), PermissionScope::System],
        None => vec![PermissionScope::System],
    }
}
