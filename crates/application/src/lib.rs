//! Application services and ports.

#![forbid(unsafe_code)]

mod access_scope_service;
mod permission_ports;
mod permission_resolver;
mod scoped_query;

pub use access_scope_service::{AccessScopeService, ScopeTargets};
pub use permission_ports::{PermissionStore, RoleRepository};
pub use permission_resolver::{EffectivePermission, PermissionResolver};
pub use scoped_query::{
    AssignmentRelation, NO_BRANCH_TAG, QueryArgument, ScopedQuery, apply_assignment_filter,
    apply_branch_filter,
};
