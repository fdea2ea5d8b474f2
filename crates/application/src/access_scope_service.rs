use carescope_core::{ActingUser, AppError, AppResult};
use carescope_domain::{PermissionFlags, PermissionType, ResourceType, RoleCode};

use crate::{
    AssignmentRelation, PermissionResolver, ScopedQuery, apply_assignment_filter,
    apply_branch_filter,
};

/// Tables the scoping predicates attach to for one kind of query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeTargets {
    /// Alias of the table carrying `branch_tag`.
    pub branch_alias: String,
    /// Link table used for assigned-only scoping.
    pub assignment: AssignmentRelation,
    /// Alias of the table joined to the link table.
    pub assignment_alias: String,
}

impl ScopeTargets {
    /// Targets for `residents r LEFT JOIN units u`.
    #[must_use]
    pub fn residents() -> Self {
        Self {
            branch_alias: "u".to_owned(),
            assignment: AssignmentRelation::residents(),
            assignment_alias: "r".to_owned(),
        }
    }
}

/// Resolves the acting user's permission and scopes queries accordingly.
#[derive(Clone)]
pub struct AccessScopeService {
    resolver: PermissionResolver,
}

impl AccessScopeService {
    /// Creates the service around a permission resolver.
    #[must_use]
    pub fn new(resolver: PermissionResolver) -> Self {
        Self { resolver }
    }

    /// Narrows `query` to what `user` may see for the operation.
    ///
    /// A missing permission row is a denial (`AppError::Forbidden`). On any
    /// error `query` is left unchanged. Returns the flags that were applied.
    pub async fn scope_query(
        &self,
        user: &ActingUser,
        resource_type: &ResourceType,
        permission_type: PermissionType,
        query: &mut ScopedQuery,
        targets: &ScopeTargets,
    ) -> AppResult<PermissionFlags> {
        let role_code = RoleCode::new(user.role_code())?;
        let flags = self
            .resolver
            .resolve(&role_code, resource_type, permission_type, user.tenant_id())
            .await
            .map_err(|error| match error {
                AppError::PermissionNotFound(detail) => AppError::Forbidden(format!(
                    "role '{role_code}' may not {permission_type} '{resource_type}': {detail}"
                )),
                other => other,
            })?;

        let mut scoped = query.clone();
        apply_branch_filter(
            &mut scoped,
            user.branch_tag(),
            targets.branch_alias.as_str(),
            flags.branch_only,
        )?;
        apply_assignment_filter(
            &mut scoped,
            user.user_id(),
            &targets.assignment,
            targets.assignment_alias.as_str(),
            flags.assigned_only,
        )?;
        *query = scoped;

        Ok(flags)
    }
}
