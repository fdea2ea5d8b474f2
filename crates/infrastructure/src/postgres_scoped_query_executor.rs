use carescope_application::{QueryArgument, ScopedQuery};
use carescope_core::{AppError, AppResult};

use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};
use tracing::{debug, warn};
use uuid::Uuid;

/// Resident projection returned by the scoped resident listing.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ResidentSummary {
    /// Resident identifier.
    pub resident_id: Uuid,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Branch tag of the resident's unit, if any.
    pub branch_tag: Option<String>,
}

/// Runs [`ScopedQuery`] values against PostgreSQL.
#[derive(Clone)]
pub struct PostgresScopedQueryExecutor {
    pool: PgPool,
}

impl PostgresScopedQueryExecutor {
    /// Creates an executor with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Binds the query's arguments in order and fetches every row.
    pub async fn fetch_all<T>(&self, query: &ScopedQuery) -> AppResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = query.sql();
        debug!(sql = %sql, arguments = query.arguments().len(), "executing scoped query");

        let mut statement = sqlx::query_as::<_, T>(sql.as_str());
        for argument in query.arguments() {
            statement = match argument {
                QueryArgument::Text(value) => statement.bind(value.as_str()),
                QueryArgument::Uuid(value) => statement.bind(*value),
                QueryArgument::Integer(value) => statement.bind(*value),
            };
        }

        statement.fetch_all(&self.pool).await.map_err(|error| {
            warn!(error = %error, "scoped query failed");
            AppError::StoreUnavailable(format!("failed to execute scoped query: {error}"))
        })
    }
}
