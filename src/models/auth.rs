// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::audit::Audit;

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(example = 1)]
    pub id: i32,

    #[schema(example = "Maria")]
    pub first_name: String,

    #[schema(example = "Silva")]
    pub last_name: String,

    #[schema(example = "maria@empresa.com")]
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,

    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,

    // Preenchido só nas listagens (array_agg dos cargos)
    #[sqlx(default)]
    #[schema(example = json!(["Manager"]))]
    pub roles: Vec<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(length(min = 1, max = 100, message = "O nome é obrigatório."))]
    #[schema(example = "Maria")]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "O sobrenome é obrigatório."))]
    #[schema(example = "Silva")]
    pub last_name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "maria@empresa.com")]
    pub email: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    #[schema(example = "segredo123")]
    pub password: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "maria@empresa.com")]
    pub email: String,

    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    #[schema(example = "segredo123")]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    #[validate(length(min = 1, message = "A senha atual é obrigatória."))]
    pub current_password: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenPayload {
    #[validate(length(min = 1, message = "O token é obrigatório."))]
    pub token: String,

    #[validate(length(min = 1, message = "O refresh token é obrigatório."))]
    pub refresh_token: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,      // Subject (ID do usuário)
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    pub iss: String,
    pub aud: String,
    pub exp: usize,    // Expiration time (quando o token expira)
    pub iat: usize,    // Issued At (quando o token foi criado)
}

impl Claims {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

// Cadastro de usuário feito por um administrador (tela de Usuários)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 1, max = 100, message = "O nome é obrigatório."))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "O sobrenome é obrigatório."))]
    pub last_name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    #[validate(length(max = 100))]
    pub position: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    // Se vier, precisa bater com o ID da rota
    pub id: Option<i32>,

    #[validate(length(min = 1, max = 100, message = "O nome é obrigatório."))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "O sobrenome é obrigatório."))]
    pub last_name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    #[validate(length(max = 100))]
    pub position: Option<String>,

    #[schema(example = true)]
    pub is_active: Option<bool>,
}
