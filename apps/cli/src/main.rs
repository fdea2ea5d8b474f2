//! Carescope access-control inspection tool.

#![forbid(unsafe_code)]

mod cli_config;
mod command;

use std::sync::Arc;

use carescope_application::{
    AccessScopeService, EffectivePermission, PermissionResolver, QueryArgument, RoleRepository,
    ScopeTargets, ScopedQuery,
};
use carescope_core::{ActingUser, AppError, AppResult, TenantId};
use carescope_domain::{PermissionFlags, PermissionKey, PermissionType, ResourceType, Role};
use carescope_infrastructure::{
    MIGRATOR, PostgresPermissionStore, PostgresRoleRepository, PostgresScopedQueryExecutor,
    ResidentSummary,
};

use clap::Parser;
use serde::Serialize;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use uuid::Uuid;

use crate::cli_config::{CliConfig, init_tracing};
use crate::command::{Cli, Command, ResidentsArgs, ResolveArgs, SummaryArgs};

#[derive(Debug, Serialize)]
struct ResolveReport {
    tenant_id: Option<TenantId>,
    permission: EffectivePermission,
}

#[derive(Debug, Serialize)]
struct ResidentsReport {
    tenant_id: Option<TenantId>,
    flags: PermissionFlags,
    sql: String,
    arguments: Vec<QueryArgument>,
    residents: Option<Vec<ResidentEntry>>,
}

#[derive(Debug, Serialize)]
struct ResidentEntry {
    resident_id: Uuid,
    first_name: String,
    last_name: String,
    branch_tag: Option<String>,
}

#[derive(Debug, Serialize)]
struct SummaryReport {
    tenant_id: Option<TenantId>,
    roles: Vec<Role>,
    permissions: Vec<EffectivePermission>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = CliConfig::load()?;
    let pool = connect_pool(&config).await?;

    match cli.command {
        Command::Migrate => {
            MIGRATOR
                .run(&pool)
                .await
                .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;
            info!("migrations applied");
            Ok(())
        }
        Command::Resolve(args) => {
            let tenant_id = args.tenant_id.or(config.default_tenant_id);
            let report = resolve(pool, args, tenant_id).await?;
            print_json(&report)
        }
        Command::Residents(args) => {
            let tenant_id = args.tenant_id.or(config.default_tenant_id);
            let report = residents(pool, args, tenant_id).await?;
            print_json(&report)
        }
        Command::Summary(args) => {
            let tenant_id = args.tenant_id.or(config.default_tenant_id);
            let report = summary(pool, args, tenant_id).await?;
            print_json(&report)
        }
    }
}

async fn connect_pool(config: &CliConfig) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(config.database_url.as_str())
        .await
        .map_err(|error| AppError::StoreUnavailable(format!("failed to connect to database: {error}")))
}

async fn resolve(
    pool: PgPool,
    args: ResolveArgs,
    tenant_id: Option<TenantId>,
) -> AppResult<ResolveReport> {
    let resolver = PermissionResolver::new(Arc::new(PostgresPermissionStore::new(pool)));
    let key = PermissionKey::new(args.role_code, args.resource_type, args.permission_type);

    let permission = resolver.resolve_effective(&key, tenant_id).await?;
    info!(
        tenant_id = ?tenant_id,
        key = %key,
        source = %permission.source,
        assigned_only = permission.flags.assigned_only,
        branch_only = permission.flags.branch_only,
        "permission resolved"
    );

    Ok(ResolveReport {
        tenant_id,
        permission,
    })
}

async fn residents(
    pool: PgPool,
    args: ResidentsArgs,
    tenant_id: Option<TenantId>,
) -> AppResult<ResidentsReport> {
    let resolver = PermissionResolver::new(Arc::new(PostgresPermissionStore::new(pool.clone())));
    let service = AccessScopeService::new(resolver);
    // Without --user nobody is assigned, so assigned-only scoping yields no rows.
    let user = ActingUser::new(
        args.user_id.unwrap_or(Uuid::nil()),
        args.role_code.as_str(),
        tenant_id,
        args.branch_tag,
    );
    let resource_type = ResourceType::new("residents")?;

    let mut query = resident_listing_query(tenant_id)?;
    let flags = service
        .scope_query(
            &user,
            &resource_type,
            PermissionType::Read,
            &mut query,
            &ScopeTargets::residents(),
        )
        .await?;
    info!(
        tenant_id = ?tenant_id,
        role_code = %args.role_code,
        assigned_only = flags.assigned_only,
        branch_only = flags.branch_only,
        "resident listing scoped"
    );

    let residents = if args.execute {
        let rows = PostgresScopedQueryExecutor::new(pool)
            .fetch_all::<ResidentSummary>(&query)
            .await?;
        Some(
            rows.into_iter()
                .map(|row| ResidentEntry {
                    resident_id: row.resident_id,
                    first_name: row.first_name,
                    last_name: row.last_name,
                    branch_tag: row.branch_tag,
                })
                .collect(),
        )
    } else {
        None
    };

    Ok(ResidentsReport {
        tenant_id,
        flags,
        sql: query.sql(),
        arguments: query.arguments().to_vec(),
        residents,
    })
}

async fn summary(
    pool: PgPool,
    args: SummaryArgs,
    tenant_id: Option<TenantId>,
) -> AppResult<SummaryReport> {
    let roles = PostgresRoleRepository::new(pool.clone())
        .list_roles(args.include_inactive)
        .await?;
    let permissions = PermissionResolver::new(Arc::new(PostgresPermissionStore::new(pool)))
        .effective_permissions(tenant_id)
        .await?;

    Ok(SummaryReport {
        tenant_id,
        roles,
        permissions,
    })
}

fn resident_listing_query(tenant_id: Option<TenantId>) -> AppResult<ScopedQuery> {
    let mut query = ScopedQuery::new(
        "SELECT r.resident_id, r.first_name, r.last_name, u.branch_tag FROM residents r LEFT JOIN units u ON u.unit_id = r.unit_id",
    )?
    .with_trailing("ORDER BY r.last_name, r.first_name");

    if let Some(tenant_id) = tenant_id {
        query.push_bound_predicate("r.tenant_id = {}", tenant_id.as_uuid())?;
    }

    Ok(query)
}

fn print_json(report: &impl Serialize) -> AppResult<()> {
    let rendered = serde_json::to_string_pretty(report)
        .map_err(|error| AppError::Internal(format!("failed to render report: {error}")))?;
    println!("{rendered}");
    Ok(())
}
