// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::{error::AppError, extract::AppJson},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{
        AuthResponse, ChangePasswordPayload, LoginUserPayload, RefreshTokenPayload,
        RegisterUserPayload, User,
    },
};

// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "Usuário registrado com o cargo padrão", body = User),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail já cadastrado")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<RegisterUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = app_state.auth_service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login bem-sucedido", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas ou conta desativada")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<LoginUserPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let response = app_state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;
    Ok(Json(response))
}

// POST /api/auth/refresh
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "Auth",
    request_body = RefreshTokenPayload,
    responses(
        (status = 200, description = "Novo token", body = AuthResponse),
        (status = 400, description = "Token ou refresh token ausente"),
        (status = 401, description = "Refresh não disponível ou token inválido")
    )
)]
pub async fn refresh(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<RefreshTokenPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    app_state
        .auth_service
        .refresh_token(payload)
        .await?
        .map(Json)
        .ok_or(AppError::InvalidToken)
}

// POST /api/auth/change-password
#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    tag = "Auth",
    request_body = ChangePasswordPayload,
    responses(
        (status = 204, description = "Senha alterada"),
        (status = 400, description = "Dados inválidos ou senha atual incorreta"),
        (status = 401, description = "Token ausente ou inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_password(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    AppJson(payload): AppJson<ChangePasswordPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;

    app_state
        .auth_service
        .change_password(auth.user.id, payload)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuário autenticado", body = User),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(auth: AuthenticatedUser) -> Json<User> {
    let mut user = auth.user;
    user.roles = auth.claims.roles;
    Json(user)
}
