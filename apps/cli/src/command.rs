use carescope_core::{AppResult, TenantId};
use carescope_domain::{PermissionType, ResourceType, RoleCode};
use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(
    name = "carescope-cli",
    about = "Inspect role permissions and resident scoping",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    #[command(about = "Apply pending database migrations")]
    Migrate,
    #[command(about = "Resolve the effective flags for one permission key")]
    Resolve(ResolveArgs),
    #[command(about = "Scope the resident listing for an acting user")]
    Residents(ResidentsArgs),
    #[command(about = "Print roles and the effective permission matrix")]
    Summary(SummaryArgs),
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ResolveArgs {
    #[arg(value_name = "ROLE", value_parser = parse_role_code)]
    pub role_code: RoleCode,
    #[arg(value_name = "RESOURCE", value_parser = parse_resource_type)]
    pub resource_type: ResourceType,
    #[arg(
        value_name = "OPERATION",
        value_parser = parse_permission_type,
        help = "Create, Read, Update or Delete (C/R/U/D accepted)"
    )]
    pub permission_type: PermissionType,
    #[arg(long = "tenant", value_name = "UUID", value_parser = parse_tenant_id)]
    pub tenant_id: Option<TenantId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ResidentsArgs {
    #[arg(value_name = "ROLE", value_parser = parse_role_code)]
    pub role_code: RoleCode,
    #[arg(long = "tenant", value_name = "UUID", value_parser = parse_tenant_id)]
    pub tenant_id: Option<TenantId>,
    #[arg(long = "branch", value_name = "TAG")]
    pub branch_tag: Option<String>,
    #[arg(long = "user", value_name = "UUID", value_parser = parse_user_id)]
    pub user_id: Option<Uuid>,
    #[arg(long, help = "Run the scoped query and include the rows")]
    pub execute: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct SummaryArgs {
    #[arg(long = "tenant", value_name = "UUID", value_parser = parse_tenant_id)]
    pub tenant_id: Option<TenantId>,
    #[arg(long = "all-roles", help = "Include inactive roles")]
    pub include_inactive: bool,
}

fn parse_role_code(value: &str) -> AppResult<RoleCode> {
    RoleCode::new(value)
}

fn parse_resource_type(value: &str) -> AppResult<ResourceType> {
    ResourceType::new(value)
}

fn parse_permission_type(value: &str) -> AppResult<PermissionType> {
    value.parse()
}

fn parse_tenant_id(value: &str) -> AppResult<TenantId> {
    TenantId::parse(value)
}

fn parse_user_id(value: &str) -> Result<Uuid, uuid::Error> {
    Uuid::parse_str(value.trim())
}
