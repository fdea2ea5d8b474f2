use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::TenantId;

/// The user on whose behalf a query is scoped.
///
/// Authentication happens upstream; this is the already-verified identity
/// handed to the access-control layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActingUser {
    user_id: Uuid,
    role_code: String,
    tenant_id: Option<TenantId>,
    branch_tag: Option<String>,
}

impl ActingUser {
    /// Creates an acting user from identity and tenancy data.
    ///
    /// A blank branch tag is treated as "no branch assignment".
    #[must_use]
    pub fn new(
        user_id: Uuid,
        role_code: impl Into<String>,
        tenant_id: Option<TenantId>,
        branch_tag: Option<String>,
    ) -> Self {
        Self {
            user_id,
            role_code: role_code.into(),
            tenant_id,
            branch_tag: branch_tag.filter(|value| !value.trim().is_empty()),
        }
    }

    /// Returns the stable user identifier.
    #[must_use]
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Returns the role code the user acts under.
    #[must_use]
    pub fn role_code(&self) -> &str {
        self.role_code.as_str()
    }

    /// Returns the tenant, or `None` in system context.
    #[must_use]
    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    /// Returns the user's branch tag, if the user belongs to a branch.
    #[must_use]
    pub fn branch_tag(&self) -> Option<&str> {
        self.branch_tag.as_deref()
    }
}
