use std::fmt::{Display, Formatter};
use std::str::FromStr;

use carescope_core::{AppError, TenantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ResourceType, RoleCode};

/// Operation kinds a permission row can govern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PermissionType {
    /// Creating new records.
    Create,
    /// Reading existing records.
    Read,
    /// Updating existing records.
    Update,
    /// Deleting records.
    Delete,
}

impl PermissionType {
    /// Returns a stable storage value for this operation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Read => "Read",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }

    /// Returns all known operations.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[PermissionType] = &[
            PermissionType::Create,
            PermissionType::Read,
            PermissionType::Update,
            PermissionType::Delete,
        ];

        ALL
    }
}

impl FromStr for PermissionType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "Create" | "create" | "C" => Ok(Self::Create),
            "Read" | "read" | "R" => Ok(Self::Read),
            "Update" | "update" | "U" => Ok(Self::Update),
            "Delete" | "delete" | "D" => Ok(Self::Delete),
            _ => Err(AppError::Validation(format!(
                "unknown permission type '{value}'"
            ))),
        }
    }
}

impl Display for PermissionType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Scoping flags attached to one role/resource/operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PermissionFlags {
    /// Restrict to records the acting user is assigned to.
    pub assigned_only: bool,
    /// Restrict to records in the acting user's branch.
    pub branch_only: bool,
}

impl PermissionFlags {
    /// Creates a flag pair.
    #[must_use]
    pub fn new(assigned_only: bool, branch_only: bool) -> Self {
        Self {
            assigned_only,
            branch_only,
        }
    }
}

/// Lookup key shared by tenant rows and system rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermissionKey {
    /// Role the row applies to.
    pub role_code: RoleCode,
    /// Resource category the row protects.
    pub resource_type: ResourceType,
    /// Operation the row governs.
    pub permission_type: PermissionType,
}

impl PermissionKey {
    /// Creates a permission key.
    #[must_use]
    pub fn new(
        role_code: RoleCode,
        resource_type: ResourceType,
        permission_type: PermissionType,
    ) -> Self {
        Self {
            role_code,
            resource_type,
            permission_type,
        }
    }
}

impl Display for PermissionKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}/{}/{}",
            self.role_code, self.resource_type, self.permission_type
        )
    }
}

/// Where a permission row lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionScope {
    /// Row owned by one tenant; overrides the system row with the same key.
    Tenant(TenantId),
    /// Tenant-less default row.
    System,
}

impl PermissionScope {
    /// Maps an optional tenant column value to a scope.
    #[must_use]
    pub fn from_tenant(tenant_id: Option<TenantId>) -> Self {
        tenant_id.map_or(Self::System, Self::Tenant)
    }

    /// Returns the tenant column value for this scope.
    #[must_use]
    pub fn tenant_id(&self) -> Option<TenantId> {
        match self {
            Self::Tenant(tenant_id) => Some(*tenant_id),
            Self::System => None,
        }
    }
}

impl Display for PermissionScope {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tenant(tenant_id) => write!(formatter, "tenant '{tenant_id}'"),
            Self::System => formatter.write_str("system"),
        }
    }
}

/// Persisted role permission row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermission {
    permission_id: Uuid,
    scope: PermissionScope,
    key: PermissionKey,
    flags: PermissionFlags,
}

impl RolePermission {
    /// Creates a permission row.
    #[must_use]
    pub fn new(
        permission_id: Uuid,
        scope: PermissionScope,
        key: PermissionKey,
        flags: PermissionFlags,
    ) -> Self {
        Self {
            permission_id,
            scope,
            key,
            flags,
        }
    }

    /// Returns the row identifier.
    #[must_use]
    pub fn permission_id(&self) -> Uuid {
        self.permission_id
    }

    /// Returns whether this is a tenant row or a system default.
    #[must_use]
    pub fn scope(&self) -> PermissionScope {
        self.scope
    }

    /// Returns the owning tenant, if any.
    #[must_use]
    pub fn tenant_id(&self) -> Option<TenantId> {
        self.scope.tenant_id()
    }

    /// Returns the role/resource/operation key.
    #[must_use]
    pub fn key(&self) -> &PermissionKey {
        &self.key
    }

    /// Returns the scoping flags.
    #[must_use]
    pub fn flags(&self) -> PermissionFlags {
        self.flags
    }
}
