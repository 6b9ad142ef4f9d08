pub mod activity_service;
pub mod auth;
pub mod company_service;
pub mod contact_service;
pub mod dashboard_service;
pub mod opportunity_service;
pub mod rbac_service;
pub mod task_service;
pub mod user_service;

use crate::common::{error::AppError, pagination::PageRequest};
use crate::db::CrudRepository;

// Referência a um registro que não existe (empresa, etapa, usuário...) é erro do cliente
pub(crate) fn ensure_found(found: bool, message: &str) -> Result<(), AppError> {
    if found {
        Ok(())
    } else {
        Err(AppError::bad_request(message))
    }
}

pub(crate) async fn ensure_optional<T, R>(
    repo: &R,
    id: Option<i32>,
    message: &str,
) -> Result<(), AppError>
where
    T: Send + Sync + 'static,
    R: CrudRepository<T> + ?Sized,
{
    match id {
        Some(id) => ensure_found(repo.exists(id).await?, message),
        None => Ok(()),
    }
}

// Com página: só aquela fatia. Sem página: a lista inteira.
pub(crate) async fn list_page<T, R>(repo: &R, page: Option<PageRequest>) -> Result<Vec<T>, AppError>
where
    T: Send + Sync + 'static,
    R: CrudRepository<T> + ?Sized,
{
    match page {
        Some(page) => repo.find_paged(page).await,
        None => repo.find_all().await,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::config::AuthConfig;
    use crate::db::{memory::InMemoryStore, CrudRepository, Repositories};
    use crate::models::audit::Audit;
    use crate::models::auth::User;
    use crate::models::company::Company;

    pub const ACTOR: &str = "tester@crm.local";

    pub fn auth_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "segredo-de-teste".to_string(),
            issuer: "CrmApi".to_string(),
            audience: "CrmClient".to_string(),
            expiry_hours: 24,
            bcrypt_cost: 4,
        }
    }

    pub fn repos() -> (Repositories, Arc<InMemoryStore>) {
        Repositories::in_memory()
    }

    pub async fn seed_user(repos: &Repositories, email: &str) -> User {
        let user = User {
            first_name: "Ana".to_string(),
            last_name: "Souza".to_string(),
            email: email.to_string(),
            password_hash: "x".to_string(),
            audit: Audit::created(ACTOR),
            ..Default::default()
        };
        repos.users.add(&user).await.unwrap()
    }

    pub async fn seed_company(repos: &Repositories, name: &str) -> Company {
        let company = Company {
            name: name.to_string(),
            audit: Audit::created(ACTOR),
            ..Default::default()
        };
        repos.companies.add(&company).await.unwrap()
    }
}
