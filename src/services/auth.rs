// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AuthConfig,
    db::{RoleRepository, UserRepository},
    models::audit::Audit,
    models::auth::{
        AuthResponse, ChangePasswordPayload, Claims, RefreshTokenPayload, RegisterUserPayload, User,
    },
};

pub const DEFAULT_ROLE: &str = "User";
pub const ADMIN_ROLE: &str = "Admin";
const SYSTEM_ACTOR: &str = "System";

// bcrypt é caro: roda fora do runtime async
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, cost))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let is_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(is_valid)
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        config: AuthConfig,
    ) -> Self {
        Self { users, roles, config }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let mut user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        if !user.audit.is_active {
            return Err(AppError::AccountDisabled);
        }

        user.last_login_at = Some(Utc::now());
        let user = self.users.update(&user).await?;

        tracing::info!("🔑 Login de {}", user.email);
        let token = self.create_token(&user).await?;
        Ok(AuthResponse {
            token,
            refresh_token: self.generate_refresh_token(),
        })
    }

    /// Auto-cadastro: o usuário novo recebe o cargo padrão
    pub async fn register(&self, payload: RegisterUserPayload) -> Result<User, AppError> {
        if self.users.email_exists(&payload.email).await? {
            return Err(AppError::EmailAlreadyExists);
        }

        let password_hash = hash_password(&payload.password, self.config.bcrypt_cost).await?;
        let user = User {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            password_hash,
            audit: Audit::created(SYSTEM_ACTOR),
            ..Default::default()
        };
        let mut created = self.users.add(&user).await?;

        if let Some(role) = self.roles.find_role_by_name(DEFAULT_ROLE).await? {
            self.users.assign_role(created.id, role.id, SYSTEM_ACTOR).await?;
            created.roles = vec![role.name];
        }

        Ok(created)
    }

    pub async fn change_password(
        &self,
        user_id: i32,
        payload: ChangePasswordPayload,
    ) -> Result<(), AppError> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Usuário não encontrado."))?;

        if !verify_password(&payload.current_password, &user.password_hash).await? {
            return Err(AppError::bad_request("A senha atual está incorreta."));
        }

        user.password_hash = hash_password(&payload.new_password, self.config.bcrypt_cost).await?;
        let actor = user.email.clone();
        user.audit.touch(&actor);
        self.users.update(&user).await?;
        Ok(())
    }

    // Refresh ainda não é suportado: o cliente faz login de novo
    pub async fn refresh_token(
        &self,
        _payload: RefreshTokenPayload,
    ) -> Result<Option<AuthResponse>, AppError> {
        Ok(None)
    }

    pub fn generate_refresh_token(&self) -> String {
        Uuid::new_v4().to_string()
    }

    /// Assinatura, validade, emissor e audiência
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.issuer.as_str()]);
        validation.set_audience(&[self.config.audience.as_str()]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims)
    }

    /// Token válido + usuário ainda existente e ativo
    pub async fn authenticate(&self, token: &str) -> Result<(User, Claims), AppError> {
        let claims = self.validate_token(token)?;

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if !user.audit.is_active {
            return Err(AppError::AccountDisabled);
        }

        Ok((user, claims))
    }

    /// Cria o administrador inicial se o e-mail ainda não existir
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<(), AppError> {
        if self.users.email_exists(email).await? {
            return Ok(());
        }

        let password_hash = hash_password(password, self.config.bcrypt_cost).await?;
        let admin = User {
            first_name: "System".to_string(),
            last_name: "Administrator".to_string(),
            email: email.to_string(),
            password_hash,
            audit: Audit::created(SYSTEM_ACTOR),
            ..Default::default()
        };
        let admin = self.users.add(&admin).await?;

        let role = self
            .roles
            .find_role_by_name(ADMIN_ROLE)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Cargo {ADMIN_ROLE} não existe no banco"))?;
        self.users.assign_role(admin.id, role.id, SYSTEM_ACTOR).await?;

        tracing::info!("👤 Administrador inicial criado: {}", email);
        Ok(())
    }

    async fn create_token(&self, user: &User) -> Result<String, AppError> {
        let grants = self.users.find_with_roles(user.id).await?;

        let now = Utc::now();
        let expires_at = now + Duration::hours(self.config.expiry_hours);

        let claims = Claims {
            sub: user.id,
            name: user.full_name(),
            email: user.email.clone(),
            roles: grants.roles,
            permissions: grants.permissions,
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{auth_config, repos};

    fn service(repos: &crate::db::Repositories) -> AuthService {
        AuthService::new(repos.users.clone(), repos.roles.clone(), auth_config())
    }

    fn register_payload(email: &str) -> RegisterUserPayload {
        RegisterUserPayload {
            first_name: "Maria".to_string(),
            last_name: "Silva".to_string(),
            email: email.to_string(),
            password: "segredo123".to_string(),
        }
    }

    #[tokio::test]
    async fn register_assigns_the_default_role() {
        let (repos, _) = repos();
        let auth = service(&repos);

        let user = auth.register(register_payload("maria@crm.local")).await.unwrap();

        assert_eq!(user.roles, vec![DEFAULT_ROLE]);
        assert_ne!(user.password_hash, "segredo123");
        let grants = repos.users.find_with_roles(user.id).await.unwrap();
        assert_eq!(grants.roles, vec![DEFAULT_ROLE]);
    }

    #[tokio::test]
    async fn register_rejects_a_taken_email() {
        let (repos, _) = repos();
        let auth = service(&repos);
        auth.register(register_payload("maria@crm.local")).await.unwrap();

        let err = auth.register(register_payload("maria@crm.local")).await.unwrap_err();

        assert!(matches!(err, AppError::EmailAlreadyExists));
        assert_eq!(repos.users.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn login_token_carries_roles_and_permissions() {
        let (repos, _) = repos();
        let auth = service(&repos);
        let user = auth.register(register_payload("maria@crm.local")).await.unwrap();
        repos.users.assign_role(user.id, 2, "teste").await.unwrap();

        let response = auth.login("maria@crm.local", "segredo123").await.unwrap();
        let claims = auth.validate_token(&response.token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.name, "Maria Silva");
        assert_eq!(claims.roles, vec!["Manager", "User"]);
        assert!(claims.has_permission("Companies.View"));
        assert!(claims.has_permission("Tasks.Delete"));
        assert!(!claims.has_permission("Users.View"));
        assert_eq!(claims.iss, "CrmApi");
        assert_eq!(claims.aud, "CrmClient");

        let stored = repos.users.find_by_id(user.id).await.unwrap().unwrap();
        assert!(stored.last_login_at.is_some());
    }

    #[tokio::test]
    async fn login_rejects_bad_password_and_disabled_accounts() {
        let (repos, _) = repos();
        let auth = service(&repos);
        let mut user = auth.register(register_payload("maria@crm.local")).await.unwrap();

        let err = auth.login("maria@crm.local", "errada").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));

        let err = auth.login("ninguem@crm.local", "segredo123").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));

        user.audit.is_active = false;
        repos.users.update(&user).await.unwrap();
        let err = auth.login("maria@crm.local", "segredo123").await.unwrap_err();
        assert!(matches!(err, AppError::AccountDisabled));
    }

    #[tokio::test]
    async fn tokens_from_another_audience_are_rejected() {
        let (repos, _) = repos();
        let auth = service(&repos);
        auth.register(register_payload("maria@crm.local")).await.unwrap();
        let token = auth.login("maria@crm.local", "segredo123").await.unwrap().token;

        let other = AuthService::new(
            repos.users.clone(),
            repos.roles.clone(),
            AuthConfig {
                audience: "OutroCliente".to_string(),
                ..auth_config()
            },
        );

        assert!(matches!(other.validate_token(&token), Err(AppError::InvalidToken)));
        assert!(matches!(auth.validate_token("lixo"), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn change_password_requires_the_current_one() {
        let (repos, _) = repos();
        let auth = service(&repos);
        let user = auth.register(register_payload("maria@crm.local")).await.unwrap();

        let wrong = ChangePasswordPayload {
            current_password: "errada".to_string(),
            new_password: "novasenha".to_string(),
        };
        assert!(matches!(
            auth.change_password(user.id, wrong).await,
            Err(AppError::BadRequest(_))
        ));

        let right = ChangePasswordPayload {
            current_password: "segredo123".to_string(),
            new_password: "novasenha".to_string(),
        };
        auth.change_password(user.id, right).await.unwrap();

        assert!(auth.login("maria@crm.local", "novasenha").await.is_ok());
        assert!(auth.login("maria@crm.local", "segredo123").await.is_err());
    }

    #[tokio::test]
    async fn refresh_is_not_supported_and_admin_bootstrap_is_idempotent() {
        let (repos, _) = repos();
        let auth = service(&repos);

        let refreshed = auth
            .refresh_token(RefreshTokenPayload {
                token: "a".to_string(),
                refresh_token: auth.generate_refresh_token(),
            })
            .await
            .unwrap();
        assert!(refreshed.is_none());

        auth.ensure_admin("admin@crm.local", "admin123").await.unwrap();
        auth.ensure_admin("admin@crm.local", "admin123").await.unwrap();

        let admins = repos.users.find_by_role(ADMIN_ROLE).await.unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].email, "admin@crm.local");
    }
}
