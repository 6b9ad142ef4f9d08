// src/handlers/activities.rs

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
        rbac::{RequirePermission, TasksCreate, TasksDelete, TasksUpdate, TasksView},
    },
    models::activity::{Activity, ActivityPayload, DateRange, TypeCount},
};

// Atividades usam as permissões do módulo Tasks

// GET /api/activities
#[utoipa::path(
    get,
    path = "/api/activities",
    tag = "Activities",
    params(PageParams),
    responses(
        (status = 200, description = "Atividades, das mais recentes para as mais antigas", body = Vec<Activity>),
        (status = 403, description = "Sem a permissão Tasks.View")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_activities(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksView>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<Activity>>, AppError> {
    Ok(Json(app_state.activity_service.list(params.page_request()).await?))
}

// GET /api/activities/{id}
#[utoipa::path(
    get,
    path = "/api/activities/{id}",
    tag = "Activities",
    params(("id" = i32, Path, description = "ID da atividade")),
    responses(
        (status = 200, description = "Atividade", body = Activity),
        (status = 404, description = "Atividade não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_activity(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksView>,
    Path(id): Path<i32>,
) -> Result<Json<Activity>, AppError> {
    Ok(Json(app_state.activity_service.get(id).await?))
}

// POST /api/activities
#[utoipa::path(
    post,
    path = "/api/activities",
    tag = "Activities",
    request_body = ActivityPayload,
    responses(
        (status = 201, description = "Atividade registrada", body = Activity),
        (status = 400, description = "Dados inválidos ou referência inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_activity(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksCreate>,
    auth: AuthenticatedUser,
    AppJson(payload): AppJson<ActivityPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let activity = app_state
        .activity_service
        .create(payload, auth.actor())
        .await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

// PUT /api/activities/{id}
#[utoipa::path(
    put,
    path = "/api/activities/{id}",
    tag = "Activities",
    params(("id" = i32, Path, description = "ID da atividade")),
    request_body = ActivityPayload,
    responses(
        (status = 200, description = "Atividade atualizada", body = Activity),
        (status = 400, description = "Dados inválidos ou ID divergente"),
        (status = 404, description = "Atividade não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_activity(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksUpdate>,
    auth: AuthenticatedUser,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ActivityPayload>,
) -> Result<Json<Activity>, AppError> {
    check_path_id(id, payload.id)?;
    payload.validate()?;

    let activity = app_state
        .activity_service
        .update(id, payload, auth.actor())
        .await?;
    Ok(Json(activity))
}

// DELETE /api/activities/{id}
#[utoipa::path(
    delete,
    path = "/api/activities/{id}",
    tag = "Activities",
    params(("id" = i32, Path, description = "ID da atividade")),
    responses(
        (status = 204, description = "Atividade excluída"),
        (status = 404, description = "Atividade não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_activity(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksDelete>,
    auth: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    app_state.activity_service.delete(id, auth.actor()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/activities/user/{userId}
#[utoipa::path(
    get,
    path = "/api/activities/user/{userId}",
    tag = "Activities",
    params(("userId" = i32, Path, description = "ID do usuário")),
    responses((status = 200, description = "Atividades do usuário", body = Vec<Activity>)),
    security(("api_jwt" = []))
)]
pub async fn activities_by_user(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksView>,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<Activity>>, AppError> {
    Ok(Json(app_state.activity_service.find_by_user(user_id).await?))
}

// GET /api/activities/company/{id}
#[utoipa::path(
    get,
    path = "/api/activities/company/{id}",
    tag = "Activities",
    params(("id" = i32, Path, description = "ID da empresa")),
    responses((status = 200, description = "Atividades da empresa", body = Vec<Activity>)),
    security(("api_jwt" = []))
)]
pub async fn activities_by_company(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksView>,
    Path(company_id): Path<i32>,
) -> Result<Json<Vec<Activity>>, AppError> {
    Ok(Json(app_state.activity_service.find_by_company(company_id).await?))
}

// GET /api/activities/contact/{id}
#[utoipa::path(
    get,
    path = "/api/activities/contact/{id}",
    tag = "Activities",
    params(("id" = i32, Path, description = "ID do contato")),
    responses((status = 200, description = "Atividades do contato", body = Vec<Activity>)),
    security(("api_jwt" = []))
)]
pub async fn activities_by_contact(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksView>,
    Path(contact_id): Path<i32>,
) -> Result<Json<Vec<Activity>>, AppError> {
    Ok(Json(app_state.activity_service.find_by_contact(contact_id).await?))
}

// GET /api/activities/opportunity/{id}
#[utoipa::path(
    get,
    path = "/api/activities/opportunity/{id}",
    tag = "Activities",
    params(("id" = i32, Path, description = "ID da oportunidade")),
    responses((status = 200, description = "Atividades da oportunidade", body = Vec<Activity>)),
    security(("api_jwt" = []))
)]
pub async fn activities_by_opportunity(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksView>,
    Path(opportunity_id): Path<i32>,
) -> Result<Json<Vec<Activity>>, AppError> {
    Ok(Json(
        app_state
            .activity_service
            .find_by_opportunity(opportunity_id)
            .await?,
    ))
}

// GET /api/activities/range?start=&end=
#[utoipa::path(
    get,
    path = "/api/activities/range",
    tag = "Activities",
    params(DateRange),
    responses(
        (status = 200, description = "Atividades agendadas no intervalo (inclusive)", body = Vec<Activity>),
        (status = 400, description = "Início depois do fim")
    ),
    security(("api_jwt" = []))
)]
pub async fn activities_in_range(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksView>,
    Query(range): Query<DateRange>,
) -> Result<Json<Vec<Activity>>, AppError> {
    Ok(Json(
        app_state
            .activity_service
            .find_by_date_range(range.start, range.end)
            .await?,
    ))
}

// GET /api/activities/upcoming/{userId}
#[utoipa::path(
    get,
    path = "/api/activities/upcoming/{userId}",
    tag = "Activities",
    params(("userId" = i32, Path, description = "ID do usuário")),
    responses((status = 200, description = "Próximas atividades do usuário", body = Vec<Activity>)),
    security(("api_jwt" = []))
)]
pub async fn upcoming_activities(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksView>,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<Activity>>, AppError> {
    Ok(Json(app_state.activity_service.upcoming(user_id).await?))
}

// GET /api/activities/summary/types
#[utoipa::path(
    get,
    path = "/api/activities/summary/types",
    tag = "Activities",
    responses((status = 200, description = "Quantidade de atividades por tipo", body = Vec<TypeCount>)),
    security(("api_jwt" = []))
)]
pub async fn type_summary(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksView>,
) -> Result<Json<Vec<TypeCount>>, AppError> {
    Ok(Json(app_state.activity_service.type_summary().await?))
}
