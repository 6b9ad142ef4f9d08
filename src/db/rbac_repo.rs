// src/db/rbac_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::common::error::AppError;
use crate::models::rbac::{Permission, Role, RoleWithPermissions};

// Cargos e permissões são dados fixos da migração: aqui só tem leitura
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn list_roles_with_permissions(&self) -> Result<Vec<RoleWithPermissions>, AppError>;

    async fn list_permissions(&self) -> Result<Vec<Permission>, AppError>;

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, AppError>;

    async fn find_role_by_id(&self, id: i32) -> Result<Option<Role>, AppError>;
}

const ROLE_COLUMNS: &str =
    "r.id, r.name, r.description, r.created_at, r.updated_at, r.created_by, r.updated_by, r.is_active, r.is_deleted";

#[derive(Clone)]
pub struct PgRoleRepository {
    pool: PgPool,
}

impl PgRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for PgRoleRepository {
    async fn list_roles_with_permissions(&self) -> Result<Vec<RoleWithPermissions>, AppError> {
        let sql = format!(
            "SELECT {ROLE_COLUMNS}, \
                 COALESCE(array_agg(p.name ORDER BY p.id) FILTER (WHERE p.id IS NOT NULL), '{{}}')::TEXT[] AS permissions \
             FROM roles r \
             LEFT JOIN role_permissions rp ON rp.role_id = r.id AND rp.is_deleted = FALSE \
             LEFT JOIN permissions p ON p.id = rp.permission_id AND p.is_deleted = FALSE \
             WHERE r.is_deleted = FALSE \
             GROUP BY r.id \
             ORDER BY r.id"
        );
        let roles = sqlx::query_as::<_, RoleWithPermissions>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(roles)
    }

    async fn list_permissions(&self) -> Result<Vec<Permission>, AppError> {
        let permissions = sqlx::query_as::<_, Permission>(
            r#"
            SELECT id, name, description, module
            FROM permissions
            WHERE is_deleted = FALSE
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(permissions)
    }

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        let sql = format!("SELECT {ROLE_COLUMNS} FROM roles r WHERE r.name = $1 AND r.is_deleted = FALSE");
        let role = sqlx::query_as::<_, Role>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(role)
    }

    async fn find_role_by_id(&self, id: i32) -> Result<Option<Role>, AppError> {
        let sql = format!("SELECT {ROLE_COLUMNS} FROM roles r WHERE r.id = $1 AND r.is_deleted = FALSE");
        let role = sqlx::query_as::<_, Role>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(role)
    }
}
