// src/handlers/rbac.rs

use axum::{extract::State, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{RequirePermission, UsersView},
    models::rbac::{Permission, RoleWithPermissions},
};

// GET /api/roles
#[utoipa::path(
    get,
    path = "/api/roles",
    tag = "RBAC",
    responses(
        (status = 200, description = "Cargos com suas permissões", body = Vec<RoleWithPermissions>),
        (status = 403, description = "Sem a permissão Users.View")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_roles(
    State(app_state): State<AppState>,
    _perm: RequirePermission<UsersView>,
) -> Result<Json<Vec<RoleWithPermissions>>, AppError> {
    Ok(Json(app_state.rbac_service.list_roles().await?))
}

// GET /api/permissions
#[utoipa::path(
    get,
    path = "/api/permissions",
    tag = "RBAC",
    responses(
        (status = 200, description = "Lista de permissões do sistema", body = Vec<Permission>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_permissions(
    State(app_state): State<AppState>,
    _perm: RequirePermission<UsersView>,
) -> Result<Json<Vec<Permission>>, AppError> {
    Ok(Json(app_state.rbac_service.list_permissions().await?))
}
