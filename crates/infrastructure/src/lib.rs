//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_permission_store;
mod in_memory_role_repository;
mod postgres_permission_store;
mod postgres_role_repository;
mod postgres_scoped_query_executor;

use sqlx::migrate::Migrator;

pub use in_memory_permission_store::InMemoryPermissionStore;
pub use in_memory_role_repository::InMemoryRoleRepository;
pub use postgres_permission_store::PostgresPermissionStore;
pub use postgres_role_repository::PostgresRoleRepository;
pub use postgres_scoped_query_executor::{PostgresScopedQueryExecutor, ResidentSummary};

/// Schema and reference-data migrations for the access-control tables.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");
