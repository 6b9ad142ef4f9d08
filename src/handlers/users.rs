// src/handlers/users.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::{error::AppError, extract::AppJson, pagination::PageParams},
    config::AppState,
    handlers::check_path_id,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{RequirePermission, UsersCreate, UsersDelete, UsersUpdate, UsersView},
    },
    models::auth::{CreateUserPayload, UpdateUserPayload, User},
};

// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    params(PageParams),
    responses(
        (status = 200, description = "Lista de usuários", body = Vec<User>),
        (status = 403, description = "Sem a permissão Users.View")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    _perm: RequirePermission<UsersView>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = app_state.user_service.list(params.page_request()).await?;
    Ok(Json(users))
}

// GET /api/users/{id}
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = i32, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário", body = User),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_user(
    State(app_state): State<AppState>,
    _perm: RequirePermission<UsersView>,
    Path(id): Path<i32>,
) -> Result<Json<User>, AppError> {
    Ok(Json(app_state.user_service.get(id).await?))
}

// POST /api/users
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = User),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    _perm: RequirePermission<UsersCreate>,
    auth: AuthenticatedUser,
    AppJson(payload): AppJson<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = app_state.user_service.create(payload, auth.actor()).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

// PUT /api/users/{id}
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = i32, Path, description = "ID do usuário")),
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "Usuário atualizado", body = User),
        (status = 400, description = "Dados inválidos ou ID divergente"),
        (status = 404, description = "Usuário não encontrado"),
        (status = 409, description = "E-mail já usado por outro usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    _perm: RequirePermission<UsersUpdate>,
    auth: AuthenticatedUser,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateUserPayload>,
) -> Result<Json<User>, AppError> {
    check_path_id(id, payload.id)?;
    payload.validate()?;

    let user = app_state.user_service.update(id, payload, auth.actor()).await?;
    Ok(Json(user))
}

// DELETE /api/users/{id}
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = i32, Path, description = "ID do usuário")),
    responses(
        (status = 204, description = "Usuário excluído"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    _perm: RequirePermission<UsersDelete>,
    auth: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    app_state.user_service.delete(id, auth.actor()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/users/{id}/roles
#[utoipa::path(
    get,
    path = "/api/users/{id}/roles",
    tag = "Users",
    params(("id" = i32, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Nomes dos cargos do usuário", body = Vec<String>),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_user_roles(
    State(app_state): State<AppState>,
    _perm: RequirePermission<UsersView>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(app_state.user_service.roles_of(id).await?))
}

// POST /api/users/{id}/roles/{roleId}
#[utoipa::path(
    post,
    path = "/api/users/{id}/roles/{roleId}",
    tag = "Users",
    params(
        ("id" = i32, Path, description = "ID do usuário"),
        ("roleId" = i32, Path, description = "ID do cargo")
    ),
    responses(
        (status = 204, description = "Cargo atribuído"),
        (status = 404, description = "Usuário ou cargo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_role(
    State(app_state): State<AppState>,
    _perm: RequirePermission<UsersUpdate>,
    auth: AuthenticatedUser,
    Path((id, role_id)): Path<(i32, i32)>,
) -> Result<StatusCode, AppError> {
    app_state
        .user_service
        .assign_role(id, role_id, auth.actor())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// DELETE /api/users/{id}/roles/{roleId}
#[utoipa::path(
    delete,
    path = "/api/users/{id}/roles/{roleId}",
    tag = "Users",
    params(
        ("id" = i32, Path, description = "ID do usuário"),
        ("roleId" = i32, Path, description = "ID do cargo")
    ),
    responses(
        (status = 204, description = "Cargo removido"),
        (status = 404, description = "O usuário não tinha esse cargo")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_role(
    State(app_state): State<AppState>,
    _perm: RequirePermission<UsersUpdate>,
    auth: AuthenticatedUser,
    Path((id, role_id)): Path<(i32, i32)>,
) -> Result<StatusCode, AppError> {
    app_state
        .user_service
        .remove_role(id, role_id, auth.actor())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/users/by-role/{name}
#[utoipa::path(
    get,
    path = "/api/users/by-role/{name}",
    tag = "Users",
    params(("name" = String, Path, description = "Nome do cargo")),
    responses((status = 200, description = "Usuários com o cargo", body = Vec<User>)),
    security(("api_jwt" = []))
)]
pub async fn users_by_role(
    State(app_state): State<AppState>,
    _perm: RequirePermission<UsersView>,
    Path(name): Path<String>,
) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(app_state.user_service.find_by_role(&name).await?))
}
