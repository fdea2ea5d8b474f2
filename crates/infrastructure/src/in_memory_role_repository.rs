use async_trait::async_trait;
use carescope_application::RoleRepository;
use carescope_core::AppResult;
use carescope_domain::Role;
use tokio::sync::RwLock;

/// In-memory role repository for tests and local tooling.
#[derive(Debug, Default)]
pub struct InMemoryRoleRepository {
    roles: RwLock<Vec<Role>>,
}

impl InMemoryRoleRepository {
    /// Creates a repository holding the given roles.
    #[must_use]
    pub fn new(roles: Vec<Role>) -> Self {
        Self {
            roles: RwLock::new(roles),
        }
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn list_roles(&self, include_inactive: bool) -> AppResult<Vec<Role>> {
        let mut roles: Vec<Role> = self
            .roles
            .read()
            .await
            .iter()
            .filter(|role| include_inactive || role.is_active())
            .cloned()
            .collect();
        roles.sort_by(|left, right| left.role_code().cmp(right.role_code()));

        Ok(roles)
    }
}
