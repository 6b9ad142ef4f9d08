// src/handlers/tasks.rs

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
    models::task::{
        CommentPayload, CrmTask, StatusCount, TaskComment, TaskPayload, TaskStatus, TaskWithComments,
    },
};

// =============================================================================
//  CRUD
// =============================================================================

// GET /api/tasks
#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "Tasks",
    params(PageParams),
    responses(
        (status = 200, description = "Lista de tarefas", body = Vec<CrmTask>),
        (status = 403, description = "Sem a permissão Tasks.View")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_tasks(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksView>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<CrmTask>>, AppError> {
    Ok(Json(app_state.task_service.list(params.page_request()).await?))
}

// GET /api/tasks/{id}
#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    tag = "Tasks",
    params(("id" = i32, Path, description = "ID da tarefa")),
    responses(
        (status = 200, description = "Tarefa", body = CrmTask),
        (status = 404, description = "Tarefa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_task(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksView>,
    Path(id): Path<i32>,
) -> Result<Json<CrmTask>, AppError> {
    Ok(Json(app_state.task_service.get(id).await?))
}

// GET /api/tasks/{id}/details
#[utoipa::path(
    get,
    path = "/api/tasks/{id}/details",
    tag = "Tasks",
    params(("id" = i32, Path, description = "ID da tarefa")),
    responses(
        (status = 200, description = "Tarefa com os comentários", body = TaskWithComments),
        (status = 404, description = "Tarefa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn task_details(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksView>,
    Path(id): Path<i32>,
) -> Result<Json<TaskWithComments>, AppError> {
    Ok(Json(app_state.task_service.details(id).await?))
}

// POST /api/tasks
#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = "Tasks",
    request_body = TaskPayload,
    responses(
        (status = 201, description = "Tarefa criada", body = CrmTask),
        (status = 400, description = "Dados inválidos ou referência inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_task(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksCreate>,
    auth: AuthenticatedUser,
    AppJson(payload): AppJson<TaskPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let task = app_state.task_service.create(payload, auth.actor()).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

// PUT /api/tasks/{id}
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    tag = "Tasks",
    params(("id" = i32, Path, description = "ID da tarefa")),
    request_body = TaskPayload,
    responses(
        (status = 200, description = "Tarefa atualizada", body = CrmTask),
        (status = 400, description = "Dados inválidos ou ID divergente"),
        (status = 404, description = "Tarefa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_task(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksUpdate>,
    auth: AuthenticatedUser,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<TaskPayload>,
) -> Result<Json<CrmTask>, AppError> {
    check_path_id(id, payload.id)?;
    payload.validate()?;

    let task = app_state.task_service.update(id, payload, auth.actor()).await?;
    Ok(Json(task))
}

// DELETE /api/tasks/{id}
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    tag = "Tasks",
    params(("id" = i32, Path, description = "ID da tarefa")),
    responses(
        (status = 204, description = "Tarefa excluída"),
        (status = 404, description = "Tarefa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_task(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksDelete>,
    auth: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    app_state.task_service.delete(id, auth.actor()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/tasks/{id}/complete
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/complete",
    tag = "Tasks",
    params(("id" = i32, Path, description = "ID da tarefa")),
    responses(
        (status = 204, description = "Tarefa concluída"),
        (status = 404, description = "Tarefa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn complete_task(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksUpdate>,
    auth: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    app_state.task_service.complete(id, auth.actor()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  COMENTÁRIOS
// =============================================================================

// GET /api/tasks/{id}/comments
#[utoipa::path(
    get,
    path = "/api/tasks/{id}/comments",
    tag = "Tasks",
    params(("id" = i32, Path, description = "ID da tarefa")),
    responses(
        (status = 200, description = "Comentários, do mais antigo ao mais novo", body = Vec<TaskComment>),
        (status = 404, description = "Tarefa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_comments(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksView>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<TaskComment>>, AppError> {
    Ok(Json(app_state.task_service.comments(id).await?))
}

// POST /api/tasks/{id}/comments
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/comments",
    tag = "Tasks",
    params(("id" = i32, Path, description = "ID da tarefa")),
    request_body = CommentPayload,
    responses(
        (status = 201, description = "Comentário adicionado", body = TaskComment),
        (status = 404, description = "Tarefa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_comment(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksUpdate>,
    auth: AuthenticatedUser,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CommentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let comment = app_state
        .task_service
        .add_comment(id, payload, &auth.user)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

// =============================================================================
//  CONSULTAS
// =============================================================================

// GET /api/tasks/user/{userId}
#[utoipa::path(
    get,
    path = "/api/tasks/user/{userId}",
    tag = "Tasks",
    params(("userId" = i32, Path, description = "ID do responsável")),
    responses((status = 200, description = "Tarefas do usuário", body = Vec<CrmTask>)),
    security(("api_jwt" = []))
)]
pub async fn tasks_by_user(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksView>,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<CrmTask>>, AppError> {
    Ok(Json(app_state.task_service.find_by_user(user_id).await?))
}

// GET /api/tasks/status/{status}
#[utoipa::path(
    get,
    path = "/api/tasks/status/{status}",
    tag = "Tasks",
    params(("status" = TaskStatus, Path, description = "Pending, InProgress, Completed ou Cancelled")),
    responses(
        (status = 200, description = "Tarefas no status", body = Vec<CrmTask>),
        (status = 400, description = "Status desconhecido")
    ),
    security(("api_jwt" = []))
)]
pub async fn tasks_by_status(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksView>,
    Path(status): Path<TaskStatus>,
) -> Result<Json<Vec<CrmTask>>, AppError> {
    Ok(Json(app_state.task_service.find_by_status(status).await?))
}

// GET /api/tasks/overdue
#[utoipa::path(
    get,
    path = "/api/tasks/overdue",
    tag = "Tasks",
    responses((status = 200, description = "Tarefas vencidas e não concluídas", body = Vec<CrmTask>)),
    security(("api_jwt" = []))
)]
pub async fn overdue_tasks(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksView>,
) -> Result<Json<Vec<CrmTask>>, AppError> {
    Ok(Json(app_state.task_service.overdue().await?))
}

// GET /api/tasks/due-today
#[utoipa::path(
    get,
    path = "/api/tasks/due-today",
    tag = "Tasks",
    responses((status = 200, description = "Tarefas que vencem hoje (UTC)", body = Vec<CrmTask>)),
    security(("api_jwt" = []))
)]
pub async fn tasks_due_today(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksView>,
) -> Result<Json<Vec<CrmTask>>, AppError> {
    Ok(Json(app_state.task_service.due_today().await?))
}

// GET /api/tasks/summary/status
#[utoipa::path(
    get,
    path = "/api/tasks/summary/status",
    tag = "Tasks",
    responses((status = 200, description = "Quantidade de tarefas por status", body = Vec<StatusCount>)),
    security(("api_jwt" = []))
)]
pub async fn status_summary(
    State(app_state): State<AppState>,
    _perm: RequirePermission<TasksView>,
) -> Result<Json<Vec<StatusCount>>, AppError> {
    Ok(Json(app_state.task_service.status_summary().await?))
}
