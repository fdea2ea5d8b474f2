use carescope_core::AppResult;

use super::{QueryArgument, ScopedQuery, validate_identifier};

/// Branch tag stored on records that explicitly belong to no branch.
pub const NO_BRANCH_TAG: &str = "-";

/// Restricts `query` to rows whose `<table_alias>.branch_tag` matches the
/// acting user's branch.
///
/// Does nothing when `active` is false. A user without a branch (absent,
/// blank, or the `'-'` marker) matches untagged rows and rows tagged `'-'`;
/// the marker is embedded as a literal and consumes no argument. A branch
/// user's tag is bound verbatim to the next positional parameter.
///
/// Every active call appends a predicate; calling twice filters twice.
pub fn apply_branch_filter(
    query: &mut ScopedQuery,
    user_branch_tag: Option<&str>,
    table_alias: &str,
    active: bool,
) -> AppResult<()> {
    if !active {
        return Ok(());
    }

    validate_identifier("table alias", table_alias)?;

    match user_branch_tag {
        Some(branch_tag) if !is_branchless(branch_tag) => {
            let placeholder = query.bind(QueryArgument::Text(branch_tag.to_owned()));
            query.push_predicate(format!("{table_alias}.branch_tag = {placeholder}"));
        }
        _ => {
            query.push_predicate(format!(
                "({table_alias}.branch_tag IS NULL OR {table_alias}.branch_tag = '{NO_BRANCH_TAG}')"
            ));
        }
    }

    Ok(())
}

fn is_branchless(branch_tag: &str) -> bool {
    let trimmed = branch_tag.trim();
    trimmed.is_empty() || trimmed == NO_BRANCH_TAG
}
