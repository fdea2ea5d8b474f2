use std::str::FromStr;

use async_trait::async_trait;

use carescope_application::PermissionStore;
use carescope_core::{AppError, AppResult, TenantId};
use carescope_domain::{
    PermissionFlags, PermissionKey, PermissionScope, PermissionType, ResourceType, RoleCode,
    RolePermission,
};

use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{debug, warn};
use uuid::Uuid;

const SELECT_ROLE_PERMISSIONS: &str = r#"
    SELECT
        permission_id,
        tenant_id,
        role_code,
        resource_type,
        permission_type,
        assigned_only,
        branch_only
    FROM role_permissions
    WHERE "#;

/// PostgreSQL-backed reader for the `role_permissions` table.
#[derive(Clone)]
pub struct PostgresPermissionStore {
    pool: PgPool,
}

impl PostgresPermissionStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RolePermissionRow {
    permission_id: Uuid,
    tenant_id: Option<Uuid>,
    role_code: String,
    resource_type: String,
    permission_type: String,
    assigned_only: bool,
    branch_only: bool,
}

#[async_trait]
impl PermissionStore for PostgresPermissionStore {
    async fn find_permission(
        &self,
        scope: PermissionScope,
        key: &PermissionKey,
    ) -> AppResult<Option<RolePermission>> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(SELECT_ROLE_PERMISSIONS);
        push_scope_condition(&mut builder, scope);
        builder.push(" AND role_code = ");
        builder.push_bind(key.role_code.as_str());
        builder.push(" AND resource_type = ");
        builder.push_bind(key.resource_type.as_str());
        builder.push(" AND permission_type = ");
        builder.push_bind(key.permission_type.as_str());
        builder.push(" LIMIT 1");

        let row = builder
            .build_query_as::<RolePermissionRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| {
                warn!(scope = %scope, key = %key, error = %error, "permission lookup failed");
                AppError::StoreUnavailable(format!(
                    "failed to load permission '{key}' for {scope}: {error}"
                ))
            })?;

        debug!(scope = %scope, key = %key, hit = row.is_some(), "permission lookup");

        row.map(role_permission_from_row).transpose()
    }

    async fn list_permissions(&self, scope: PermissionScope) -> AppResult<Vec<RolePermission>> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(SELECT_ROLE_PERMISSIONS);
        push_scope_condition(&mut builder, scope);
        builder.push(" ORDER BY role_code, resource_type, permission_type");

        let rows = builder
            .build_query_as::<RolePermissionRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                warn!(scope = %scope, error = %error, "permission listing failed");
                AppError::StoreUnavailable(format!(
                    "failed to list permissions for {scope}: {error}"
                ))
            })?;

        rows.into_iter().map(role_permission_from_row).collect()
    }
}

fn push_scope_condition(builder: &mut QueryBuilder<'_, Postgres>, scope: PermissionScope) {
    match scope {
        PermissionScope::Tenant(tenant_id) => {
            builder.push("tenant_id = ");
            builder.push_bind(tenant_id.as_uuid());
        }
        PermissionScope::System => {
            builder.push("tenant_id IS NULL");
        }
    }
}

fn role_permission_from_row(row: RolePermissionRow) -> AppResult<RolePermission> {
    let decode_error = |detail: String| {
        AppError::Internal(format!(
            "failed to decode role permission '{}': {detail}",
            row.permission_id
        ))
    };

    let role_code =
        RoleCode::new(row.role_code.as_str()).map_err(|error| decode_error(error.to_string()))?;
    let resource_type = ResourceType::new(row.resource_type.as_str())
        .map_err(|error| decode_error(error.to_string()))?;
    let permission_type = PermissionType::from_str(row.permission_type.as_str())
        .map_err(|error| decode_error(error.to_string()))?;

    Ok(RolePermission::new(
        row.permission_id,
        PermissionScope::from_tenant(row.tenant_id.map(TenantId::from_uuid)),
        PermissionKey::new(role_code, resource_type, permission_type),
        PermissionFlags::new(row.assigned_only, row.branch_only),
    ))
}

#[cfg(test)]
mod tests;
