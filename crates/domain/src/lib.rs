//! Access-control reference data model.

#![forbid(unsafe_code)]

mod permission;
mod role;

pub use permission::{
    PermissionFlags, PermissionKey, PermissionScope, PermissionType, RolePermission,
};
pub use role::{ResourceType, Role, RoleCode};
