// src/db/user_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::common::error::{map_user_unique_violation, AppError};
use crate::common::pagination::PageRequest;
use crate::db::repository::CrudRepository;
use crate::models::auth::User;
use crate::models::rbac::{RoleGrant, UserGrants};

#[async_trait]
pub trait UserRepository: CrudRepository<User> {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;

    /// Cargos e permissões do usuário (um único join usuário -> cargos -> permissões)
    async fn find_with_roles(&self, user_id: i32) -> Result<UserGrants, AppError>;

    async fn find_by_role(&self, role_name: &str) -> Result<Vec<User>, AppError>;

    async fn assign_role(&self, user_id: i32, role_id: i32, actor: &str) -> Result<(), AppError>;

    /// Devolve false se o usuário não tinha o cargo
    async fn remove_role(&self, user_id: i32, role_id: i32, actor: &str) -> Result<bool, AppError>;
}

const USER_COLUMNS: &str = "u.id, u.first_name, u.last_name, u.email, u.password_hash, \
     u.phone, u.department, u.position, u.last_login_at, \
     u.created_at, u.updated_at, u.created_by, u.updated_by, u.is_active, u.is_deleted";

// Sem o alias, para o RETURNING
const USER_RETURNING: &str = "id, first_name, last_name, email, password_hash, \
     phone, department, position, last_login_at, \
     created_at, updated_at, created_by, updated_by, is_active, is_deleted";

fn select_users(filter: &str) -> String {
    format!(
        "SELECT {USER_COLUMNS}, \
             COALESCE(array_agg(r.name ORDER BY r.id) FILTER (WHERE r.id IS NOT NULL), '{{}}')::TEXT[] AS roles \
         FROM users u \
         LEFT JOIN user_roles ur ON ur.user_id = u.id AND ur.is_deleted = FALSE \
         LEFT JOIN roles r ON r.id = ur.role_id AND r.is_deleted = FALSE \
         WHERE u.is_deleted = FALSE {filter} \
         GROUP BY u.id"
    )
}

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CrudRepository<User> for PgUserRepository {
    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        let sql = format!("{} ORDER BY u.id", select_users(""));
        let users = sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?;
        Ok(users)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let sql = select_users("AND u.id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    // Violação do UNIQUE de e-mail vira EmailAlreadyExists
    async fn add(&self, user: &User) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (first_name, last_name, email, password_hash, phone, department, \
                 position, created_at, created_by, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {USER_RETURNING}"
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.phone)
            .bind(&user.department)
            .bind(&user.position)
            .bind(user.audit.created_at)
            .bind(&user.audit.created_by)
            .bind(user.audit.is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(map_user_unique_violation)?;
        Ok(created)
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        let sql = format!(
            "UPDATE users SET first_name = $2, last_name = $3, email = $4, password_hash = $5, \
                 phone = $6, department = $7, position = $8, last_login_at = $9, \
                 updated_at = $10, updated_by = $11, is_active = $12, is_deleted = $13 \
             WHERE id = $1 AND is_deleted = FALSE \
             RETURNING {USER_RETURNING}"
        );
        let updated = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.phone)
            .bind(&user.department)
            .bind(&user.position)
            .bind(user.last_login_at)
            .bind(user.audit.updated_at)
            .bind(&user.audit.updated_by)
            .bind(user.audit.is_active)
            .bind(user.audit.is_deleted)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_user_unique_violation)?;

        let mut updated =
            updated.ok_or_else(|| AppError::not_found(format!("Usuário {} não encontrado.", user.id)))?;
        // O RETURNING não traz o agregado de cargos
        updated.roles = user.roles.clone();
        Ok(updated)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_deleted = FALSE")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn exists(&self, id: i32) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = $1 AND is_deleted = FALSE)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn find_paged(&self, page: PageRequest) -> Result<Vec<User>, AppError> {
        let sql = format!("{} ORDER BY u.id LIMIT $1 OFFSET $2", select_users(""));
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = select_users("AND u.email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        // O UNIQUE vale também para linhas excluídas, então não filtra is_deleted
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn find_with_roles(&self, user_id: i32) -> Result<UserGrants, AppError> {
        let rows = sqlx::query_as::<_, RoleGrant>(
            r#"
            SELECT r.name AS role_name, p.name AS permission_name
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id AND r.is_deleted = FALSE
            LEFT JOIN role_permissions rp ON rp.role_id = r.id AND rp.is_deleted = FALSE
            LEFT JOIN permissions p ON p.id = rp.permission_id AND p.is_deleted = FALSE
            WHERE ur.user_id = $1 AND ur.is_deleted = FALSE
            ORDER BY r.id, p.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(UserGrants::from_rows(&rows))
    }

    async fn find_by_role(&self, role_name: &str) -> Result<Vec<User>, AppError> {
        let filter = "AND u.id IN ( \
                 SELECT ur2.user_id FROM user_roles ur2 \
                 JOIN roles r2 ON r2.id = ur2.role_id \
                 WHERE r2.name = $1 AND ur2.is_deleted = FALSE AND r2.is_deleted = FALSE)";
        let sql = format!("{} ORDER BY u.id", select_users(filter));
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(role_name)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    // Reatribuir um cargo removido só reativa o vínculo
    async fn assign_role(&self, user_id: i32, role_id: i32, actor: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id, created_by)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, role_id)
            DO UPDATE SET is_deleted = FALSE, updated_at = NOW(), updated_by = EXCLUDED.created_by
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .bind(actor)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_role(&self, user_id: i32, role_id: i32, actor: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE user_roles
            SET is_deleted = TRUE, updated_at = NOW(), updated_by = $3
            WHERE user_id = $1 AND role_id = $2 AND is_deleted = FALSE
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .bind(actor)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
