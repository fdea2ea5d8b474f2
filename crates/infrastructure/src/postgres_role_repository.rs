use async_trait::async_trait;

use carescope_application::RoleRepository;
use carescope_core::{AppError, AppResult};
use carescope_domain::{Role, RoleCode};

use sqlx::{FromRow, PgPool};
use tracing::warn;

/// PostgreSQL-backed reader for the `roles` table.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    role_code: String,
    description: String,
    is_active: bool,
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn list_roles(&self, include_inactive: bool) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT role_code, description, is_active
            FROM roles
            WHERE is_active OR $1
            ORDER BY role_code
            "#,
        )
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            warn!(error = %error, "role listing failed");
            AppError::StoreUnavailable(format!("failed to list roles: {error}"))
        })?;

        rows.into_iter()
            .map(|row| {
                let role_code = RoleCode::new(row.role_code.as_str()).map_err(|error| {
                    AppError::Internal(format!(
                        "failed to decode role '{}': {error}",
                        row.role_code
                    ))
                })?;
                Ok(Role::new(role_code, row.description, row.is_active))
            })
            .collect()
    }
}
