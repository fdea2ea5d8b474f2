use carescope_core::{AppError, AppResult};
use uuid::Uuid;

use super::{QueryArgument, ScopedQuery, validate_identifier};

const LINK_ALIAS: &str = "scope_assignment";

/// Link table recording which users are assigned to which records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRelation {
    table: String,
    record_column: String,
    user_column: String,
    key_column: String,
}

impl AssignmentRelation {
    /// Describes a link table.
    ///
    /// `record_column` and `user_column` live on `table`; `key_column` is the
    /// matching column on the scoped record.
    pub fn new(
        table: impl Into<String>,
        record_column: impl Into<String>,
        user_column: impl Into<String>,
        key_column: impl Into<String>,
    ) -> AppResult<Self> {
        let relation = Self {
            table: table.into(),
            record_column: record_column.into(),
            user_column: user_column.into(),
            key_column: key_column.into(),
        };

        validate_identifier("assignment table", relation.table.as_str())?;
        validate_identifier("assignment record column", relation.record_column.as_str())?;
        validate_identifier("assignment user column", relation.user_column.as_str())?;
        validate_identifier("assigned record key column", relation.key_column.as_str())?;

        Ok(relation)
    }

    /// `resident_assignments(resident_id, user_id)` keyed on `resident_id`.
    #[must_use]
    pub fn residents() -> Self {
        Self {
            table: "resident_assignments".to_owned(),
            record_column: "resident_id".to_owned(),
            user_column: "user_id".to_owned(),
            key_column: "resident_id".to_owned(),
        }
    }

    /// Returns the link table name.
    #[must_use]
    pub fn table(&self) -> &str {
        self.table.as_str()
    }
}

/// Restricts `query` to rows of `table_alias` that the user is assigned to
/// through `relation`.
///
/// Does nothing when `active` is false. The user id is bound to the next
/// positional parameter. Like the branch filter, every active call appends.
pub fn apply_assignment_filter(
    query: &mut ScopedQuery,
    user_id: Uuid,
    relation: &AssignmentRelation,
    table_alias: &str,
    active: bool,
) -> AppResult<()> {
    if !active {
        return Ok(());
    }

    validate_identifier("table alias", table_alias)?;
    if table_alias == LINK_ALIAS {
        return Err(AppError::Validation(format!(
            "table alias '{LINK_ALIAS}' is reserved for the assignment subquery"
        )));
    }

    let placeholder = query.bind(QueryArgument::Uuid(user_id));
    query.push_predicate(format!(
        "EXISTS (SELECT 1 FROM {table} {LINK_ALIAS} WHERE {LINK_ALIAS}.{record_column} = {table_alias}.{key_column} AND {LINK_ALIAS}.{user_column} = {placeholder})",
        table = relation.table,
        record_column = relation.record_column,
        key_column = relation.key_column,
        user_column = relation.user_column,
    ));

    Ok(())
}
