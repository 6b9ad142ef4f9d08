// src/services/rbac_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::RoleRepository,
    models::rbac::{Permission, RoleWithPermissions},
};

#[derive(Clone)]
pub struct RbacService {
    roles: Arc<dyn RoleRepository>,
}

impl RbacService {
    pub fn new(roles: Arc<dyn RoleRepository>) -> Self {
        Self { roles }
    }

    pub async fn list_roles(&self) -> Result<Vec<RoleWithPermissions>, AppError> {
        self.roles.list_roles_with_permissions().await
    }

    pub async fn list_permissions(&self) -> Result<Vec<Permission>, AppError> {
        self.roles.list_permissions().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::repos;

    #[tokio::test]
    async fn manager_has_everything_but_user_management() {
        let (repos, _) = repos();
        let rbac = RbacService::new(repos.roles.clone());

        let roles = rbac.list_roles().await.unwrap();
        let manager = roles.iter().find(|r| r.role.name == "Manager").unwrap();

        assert_eq!(manager.permissions.len(), 16);
        assert!(!manager.permissions.iter().any(|p| p.starts_with("Users.")));
        assert_eq!(rbac.list_permissions().await.unwrap().len(), 20);
    }
}
