//! Structured SQL query with positional-argument bookkeeping.
//!
//! A [`ScopedQuery`] keeps its predicates apart from the base clause, so the
//! builders never inspect SQL text to decide between `WHERE` and `AND`.

mod assignment;
mod branch;

use carescope_core::{AppError, AppResult};
use serde::Serialize;
use uuid::Uuid;

pub use assignment::{AssignmentRelation, apply_assignment_filter};
pub use branch::{NO_BRANCH_TAG, apply_branch_filter};

const PLACEHOLDER_TOKEN: &str = "{}";

/// Positional argument bound at execution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryArgument {
    /// Text value.
    Text(String),
    /// UUID value.
    Uuid(Uuid),
    /// 64-bit integer value.
    Integer(i64),
}

impl From<&str> for QueryArgument {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for QueryArgument {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Uuid> for QueryArgument {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<i64> for QueryArgument {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// A query under construction: base clause, conjunctive predicates,
/// positional arguments and an optional trailing clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedQuery {
    base: String,
    predicates: Vec<String>,
    arguments: Vec<QueryArgument>,
    trailing: Option<String>,
}

impl ScopedQuery {
    /// Starts a query from a `SELECT ... FROM ...` clause.
    ///
    /// Filters belong in predicates, so a base carrying its own top-level
    /// `WHERE` is rejected. Subqueries, quoted text and quoted identifiers
    /// may still contain the keyword.
    pub fn new(base: impl Into<String>) -> AppResult<Self> {
        let base = base.into().trim_end().to_owned();
        if has_top_level_where(base.as_str()) {
            return Err(AppError::Validation(format!(
                "base clause '{base}' must not carry its own WHERE; push predicates instead"
            )));
        }

        Ok(Self {
            base,
            predicates: Vec::new(),
            arguments: Vec::new(),
            trailing: None,
        })
    }

    /// Sets the clause rendered after the predicates, e.g. `ORDER BY ...`.
    #[must_use]
    pub fn with_trailing(mut self, clause: impl Into<String>) -> Self {
        let clause = clause.into();
        let clause = clause.trim();
        self.trailing = (!clause.is_empty()).then(|| clause.to_owned());
        self
    }

    /// Appends a predicate that needs no arguments.
    pub fn push_predicate(&mut self, predicate: impl Into<String>) {
        self.predicates.push(predicate.into());
    }

    /// Appends a predicate whose single `{}` is replaced by the next
    /// positional placeholder bound to `argument`.
    pub fn push_bound_predicate(
        &mut self,
        template: &str,
        argument: impl Into<QueryArgument>,
    ) -> AppResult<()> {
        if template.matches(PLACEHOLDER_TOKEN).count() != 1 {
            return Err(AppError::Validation(format!(
                "predicate template '{template}' must contain exactly one '{PLACEHOLDER_TOKEN}'"
            )));
        }

        let placeholder = self.bind(argument.into());
        self.predicates
            .push(template.replacen(PLACEHOLDER_TOKEN, placeholder.as_str(), 1));
        Ok(())
    }

    /// Returns the marker the next bound argument will receive.
    #[must_use]
    pub fn next_placeholder(&self) -> String {
        format!("${}", self.arguments.len() + 1)
    }

    /// Returns whether rendering will emit a `WHERE` clause.
    #[must_use]
    pub fn has_filter_clause(&self) -> bool {
        !self.predicates.is_empty()
    }

    /// Returns the predicates in insertion order.
    #[must_use]
    pub fn predicates(&self) -> &[String] {
        &self.predicates
    }

    /// Returns the positional arguments; index `i` binds `$(i + 1)`.
    #[must_use]
    pub fn arguments(&self) -> &[QueryArgument] {
        &self.arguments
    }

    /// Renders the SQL text.
    #[must_use]
    pub fn sql(&self) -> String {
        let mut sql = self.base.clone();

        for (index, predicate) in self.predicates.iter().enumerate() {
            sql.push_str(if index == 0 { " WHERE " } else { " AND " });
            sql.push_str(predicate);
        }

        if let Some(trailing) = &self.trailing {
            sql.push(' ');
            sql.push_str(trailing);
        }

        sql
    }

    fn bind(&mut self, argument: QueryArgument) -> String {
        let placeholder = self.next_placeholder();
        self.arguments.push(argument);
        placeholder
    }
}

fn has_top_level_where(sql: &str) -> bool {
    let mut depth = 0_usize;
    let mut quote: Option<char> = None;
    let mut word = String::new();

    for character in sql.chars().chain(std::iter::once(' ')) {
        if let Some(open) = quote {
            if character == open {
                quote = None;
            }
            continue;
        }

        if character.is_ascii_alphanumeric() || character == '_' {
            word.push(character);
            continue;
        }

        if depth == 0 && word.eq_ignore_ascii_case("where") {
            return true;
        }
        word.clear();

        match character {
            '\'' | '"' => quote = Some(character),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    false
}

/// Fails unless `value` is a plain SQL identifier (`[A-Za-z_][A-Za-z0-9_]*`).
pub(crate) fn validate_identifier(label: &str, value: &str) -> AppResult<()> {
    let mut chars = value.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|next| next.is_ascii_alphanumeric() || next == '_')
        }
        None => false,
    };

    if !valid {
        return Err(AppError::Validation(format!(
            "{label} '{value}' is not a valid SQL identifier"
        )));
    }

    Ok(())
}
