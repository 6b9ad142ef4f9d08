// src/services/user_service.rs

use std::sync::Arc;

use crate::{
    common::{error::AppError, pagination::PageRequest},
    db::{RoleRepository, UserRepository},
    models::audit::Audit,
    models::auth::{CreateUserPayload, UpdateUserPayload, User},
    services::{auth::hash_password, list_page},
};

// Gestão de usuários pela tela administrativa
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, roles: Arc<dyn RoleRepository>, bcrypt_cost: u32) -> Self {
        Self { users, roles, bcrypt_cost }
    }

    pub async fn list(&self, page: Option<PageRequest>) -> Result<Vec<User>, AppError> {
        list_page(&*self.users, page).await
    }

    pub async fn get(&self, id: i32) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Usuário {} não encontrado.", id)))
    }

    /// E-mail repetido é rejeitado antes de qualquer INSERT
    pub async fn create(&self, payload: CreateUserPayload, actor: &str) -> Result<User, AppError> {
        if self.users.email_exists(&payload.email).await? {
            return Err(AppError::EmailAlreadyExists);
        }

        let password_hash = hash_password(&payload.password, self.bcrypt_cost).await?;
        let user = User {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            password_hash,
            phone: payload.phone,
            department: payload.department,
            position: payload.position,
            audit: Audit::created(actor),
            ..Default::default()
        };

        let created = self.users.add(&user).await?;
        tracing::info!("Usuário {} criado por {}", created.email, actor);
        Ok(created)
    }

    pub async fn update(&self, id: i32, payload: UpdateUserPayload, actor: &str) -> Result<User, AppError> {
        let mut user = self.get(id).await?;

        if user.email != payload.email && self.users.email_exists(&payload.email).await? {
            return Err(AppError::EmailAlreadyExists);
        }

        user.first_name = payload.first_name;
        user.last_name = payload.last_name;
        user.email = payload.email;
        user.phone = payload.phone;
        user.department = payload.department;
        user.position = payload.position;
        if let Some(active) = payload.is_active {
            user.audit.is_active = active;
        }
        user.audit.touch(actor);

        self.users.update(&user).await
    }

    pub async fn delete(&self, id: i32, actor: &str) -> Result<(), AppError> {
        let mut user = self.get(id).await?;
        user.audit.mark_deleted(actor);
        self.users.update(&user).await?;
        Ok(())
    }

    pub async fn roles_of(&self, id: i32) -> Result<Vec<String>, AppError> {
        self.get(id).await?;
        Ok(self.users.find_with_roles(id).await?.roles)
    }

    pub async fn find_by_role(&self, role_name: &str) -> Result<Vec<User>, AppError> {
        self.users.find_by_role(role_name).await
    }

    pub async fn assign_role(&self, user_id: i32, role_id: i32, actor: &str) -> Result<(), AppError> {
        self.get(user_id).await?;
        self.roles
            .find_role_by_id(role_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Cargo {} não encontrado.", role_id)))?;

        self.users.assign_role(user_id, role_id, actor).await
    }

    pub async fn remove_role(&self, user_id: i32, role_id: i32, actor: &str) -> Result<(), AppError> {
        if !self.users.remove_role(user_id, role_id, actor).await? {
            return Err(AppError::not_found("O usuário não possui esse cargo."));
        }
        Ok(())
    }
}
