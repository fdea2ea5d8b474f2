use std::sync::Arc;

use carescope_application::{PermissionResolver, PermissionStore};
use carescope_core::{AppError, TenantId};
use carescope_domain::{
    PermissionFlags, PermissionKey, PermissionScope, PermissionType, ResourceType, RoleCode,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::PostgresPermissionStore;
use crate::MIGRATOR;

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres permission tests: {error}");
    }

    Some(pool)
}

async fn ensure_tenant(pool: &PgPool, tenant_id: TenantId, name: &str) {
    let insert = sqlx::query(
        r#"
            INSERT INTO tenants (id, name)
            VALUES ($1, $2)
            ON CONFLICT (id) DO NOTHING
            "#,
    )
    .bind(tenant_id.as_uuid())
    .bind(name)
    .execute(pool)
    .await;

    assert!(insert.is_ok());
}

async fn insert_tenant_permission(
    pool: &PgPool,
    tenant_id: TenantId,
    role_code: &str,
    resource_type: &str,
    permission_type: PermissionType,
    flags: PermissionFlags,
) {
    let insert = sqlx::query(
        r#"
            INSERT INTO role_permissions
                (permission_id, tenant_id, role_code, resource_type, permission_type, assigned_only, branch_only)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
    )
    .bind(Uuid::new_v4())
    .bind(tenant_id.as_uuid())
    .bind(role_code)
    .bind(resource_type)
    .bind(permission_type.as_str())
    .bind(flags.assigned_only)
    .bind(flags.branch_only)
    .execute(pool)
    .await;

    assert!(insert.is_ok());
}

fn key(role_code: &str, resource_type: &str, permission_type: PermissionType) -> PermissionKey {
    PermissionKey::new(
        RoleCode::new(role_code).unwrap_or_else(|_| unreachable!()),
        ResourceType::new(resource_type).unwrap_or_else(|_| unreachable!()),
        permission_type,
    )
}

#[tokio::test]
async fn seeded_system_defaults_are_readable() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PostgresPermissionStore::new(pool);

    let row = store
        .find_permission(
            PermissionScope::System,
            &key("Nurse", "residents", PermissionType::Read),
        )
        .await;

    let Ok(Some(row)) = row else {
        panic!("expected seeded Nurse/residents/Read row");
    };
    assert_eq!(row.flags(), PermissionFlags::new(true, false));
    assert_eq!(row.tenant_id(), None);
}

#[tokio::test]
async fn tenant_lookup_does_not_fall_back_inside_the_store() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let tenant_id = TenantId::new();
    ensure_tenant(&pool, tenant_id, "Fallback Tenant").await;
    let store = PostgresPermissionStore::new(pool);

    let row = store
        .find_permission(
            PermissionScope::Tenant(tenant_id),
            &key("Nurse", "residents", PermissionType::Read),
        )
        .await;

    assert!(matches!(row, Ok(None)));
}

#[tokio::test]
async fn resolver_prefers_tenant_override_over_seeded_default() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let tenant_id = TenantId::new();
    ensure_tenant(&pool, tenant_id, "Override Tenant").await;
    insert_tenant_permission(
        &pool,
        tenant_id,
        "Manager",
        "residents",
        PermissionType::Read,
        PermissionFlags::new(true, true),
    )
    .await;
    let resolver = PermissionResolver::new(Arc::new(PostgresPermissionStore::new(pool)));

    let overridden = resolver
        .resolve_effective(
            &key("Manager", "residents", PermissionType::Read),
            Some(tenant_id),
        )
        .await;
    let inherited = resolver
        .resolve_effective(
            &key("Manager", "users", PermissionType::Read),
            Some(tenant_id),
        )
        .await;

    let (Ok(overridden), Ok(inherited)) = (overridden, inherited) else {
        panic!("expected both keys to resolve");
    };
    assert_eq!(overridden.flags, PermissionFlags::new(true, true));
    assert_eq!(overridden.source, PermissionScope::Tenant(tenant_id));
    assert_eq!(inherited.flags, PermissionFlags::new(false, true));
    assert_eq!(inherited.source, PermissionScope::System);
}

#[tokio::test]
async fn duplicate_tenant_row_is_rejected_by_schema() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let tenant_id = TenantId::new();
    ensure_tenant(&pool, tenant_id, "Duplicate Tenant").await;
    insert_tenant_permission(
        &pool,
        tenant_id,
        "Carer",
        "units",
        PermissionType::Read,
        PermissionFlags::new(false, true),
    )
    .await;

    let duplicate = sqlx::query(
        r#"
            INSERT INTO role_permissions
                (permission_id, tenant_id, role_code, resource_type, permission_type)
            VALUES ($1, $2, 'Carer', 'units', 'Read')
            "#,
    )
    .bind(Uuid::new_v4())
    .bind(tenant_id.as_uuid())
    .execute(&pool)
    .await;

    assert!(duplicate.is_err());
}

#[tokio::test]
async fn closed_pool_reports_store_unavailable() {
    let Some(pool) = test_pool().await else {
        return;
    };
    pool.close().await;
    let store = PostgresPermissionStore::new(pool);

    let result = store.list_permissions(PermissionScope::System).await;

    assert!(matches!(result, Err(AppError::StoreUnavailable(_))));
}
