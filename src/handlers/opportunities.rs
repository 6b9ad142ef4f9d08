// src/handlers/opportunities.rs

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
        rbac::{
            OpportunitiesCreate, OpportunitiesDelete, OpportunitiesUpdate, OpportunitiesView,
            RequirePermission,
        },
    },
    models::opportunity::{
        Opportunity, OpportunityPayload, SalesStage, StageValue, TotalValueResponse,
    },
};

// =============================================================================
//  CRUD
// =============================================================================

// GET /api/opportunities
#[utoipa::path(
    get,
    path = "/api/opportunities",
    tag = "Opportunities",
    params(PageParams),
    responses(
        (status = 200, description = "Lista de oportunidades", body = Vec<Opportunity>),
        (status = 403, description = "Sem a permissão Opportunities.View")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_opportunities(
    State(app_state): State<AppState>,
    _perm: RequirePermission<OpportunitiesView>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<Opportunity>>, AppError> {
    let opportunities = app_state
        .opportunity_service
        .list(params.page_request())
        .await?;
    Ok(Json(opportunities))
}

// GET /api/opportunities/{id}
#[utoipa::path(
    get,
    path = "/api/opportunities/{id}",
    tag = "Opportunities",
    params(("id" = i32, Path, description = "ID da oportunidade")),
    responses(
        (status = 200, description = "Oportunidade", body = Opportunity),
        (status = 404, description = "Oportunidade não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_opportunity(
    State(app_state): State<AppState>,
    _perm: RequirePermission<OpportunitiesView>,
    Path(id): Path<i32>,
) -> Result<Json<Opportunity>, AppError> {
    Ok(Json(app_state.opportunity_service.get(id).await?))
}

// POST /api/opportunities
#[utoipa::path(
    post,
    path = "/api/opportunities",
    tag = "Opportunities",
    request_body = OpportunityPayload,
    responses(
        (status = 201, description = "Oportunidade criada", body = Opportunity),
        (status = 400, description = "Dados inválidos ou referência inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_opportunity(
    State(app_state): State<AppState>,
    _perm: RequirePermission<OpportunitiesCreate>,
    auth: AuthenticatedUser,
    AppJson(payload): AppJson<OpportunityPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let opportunity = app_state
        .opportunity_service
        .create(payload, auth.actor())
        .await?;
    Ok((StatusCode::CREATED, Json(opportunity)))
}

// PUT /api/opportunities/{id}
#[utoipa::path(
    put,
    path = "/api/opportunities/{id}",
    tag = "Opportunities",
    params(("id" = i32, Path, description = "ID da oportunidade")),
    request_body = OpportunityPayload,
    responses(
        (status = 200, description = "Oportunidade atualizada", body = Opportunity),
        (status = 400, description = "Dados inválidos ou ID divergente"),
        (status = 404, description = "Oportunidade não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_opportunity(
    State(app_state): State<AppState>,
    _perm: RequirePermission<OpportunitiesUpdate>,
    auth: AuthenticatedUser,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<OpportunityPayload>,
) -> Result<Json<Opportunity>, AppError> {
    check_path_id(id, payload.id)?;
    payload.validate()?;

    let opportunity = app_state
        .opportunity_service
        .update(id, payload, auth.actor())
        .await?;
    Ok(Json(opportunity))
}

// DELETE /api/opportunities/{id}
#[utoipa::path(
    delete,
    path = "/api/opportunities/{id}",
    tag = "Opportunities",
    params(("id" = i32, Path, description = "ID da oportunidade")),
    responses(
        (status = 204, description = "Oportunidade excluída"),
        (status = 404, description = "Oportunidade não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_opportunity(
    State(app_state): State<AppState>,
    _perm: RequirePermission<OpportunitiesDelete>,
    auth: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    app_state.opportunity_service.delete(id, auth.actor()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  FUNIL
// =============================================================================

// GET /api/opportunities/user/{userId}
#[utoipa::path(
    get,
    path = "/api/opportunities/user/{userId}",
    tag = "Opportunities",
    params(("userId" = i32, Path, description = "ID do responsável")),
    responses((status = 200, description = "Oportunidades do usuário", body = Vec<Opportunity>)),
    security(("api_jwt" = []))
)]
pub async fn opportunities_by_user(
    State(app_state): State<AppState>,
    _perm: RequirePermission<OpportunitiesView>,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<Opportunity>>, AppError> {
    Ok(Json(app_state.opportunity_service.find_by_user(user_id).await?))
}

// GET /api/opportunities/stage/{stageId}
#[utoipa::path(
    get,
    path = "/api/opportunities/stage/{stageId}",
    tag = "Opportunities",
    params(("stageId" = i32, Path, description = "ID da etapa")),
    responses((status = 200, description = "Oportunidades na etapa", body = Vec<Opportunity>)),
    security(("api_jwt" = []))
)]
pub async fn opportunities_by_stage(
    State(app_state): State<AppState>,
    _perm: RequirePermission<OpportunitiesView>,
    Path(stage_id): Path<i32>,
) -> Result<Json<Vec<Opportunity>>, AppError> {
    Ok(Json(app_state.opportunity_service.find_by_stage(stage_id).await?))
}

// GET /api/opportunities/company/{companyId}
#[utoipa::path(
    get,
    path = "/api/opportunities/company/{companyId}",
    tag = "Opportunities",
    params(("companyId" = i32, Path, description = "ID da empresa")),
    responses((status = 200, description = "Oportunidades da empresa", body = Vec<Opportunity>)),
    security(("api_jwt" = []))
)]
pub async fn opportunities_by_company(
    State(app_state): State<AppState>,
    _perm: RequirePermission<OpportunitiesView>,
    Path(company_id): Path<i32>,
) -> Result<Json<Vec<Opportunity>>, AppError> {
    Ok(Json(app_state.opportunity_service.find_by_company(company_id).await?))
}

// GET /api/opportunities/user/{userId}/total-value
#[utoipa::path(
    get,
    path = "/api/opportunities/user/{userId}/total-value",
    tag = "Opportunities",
    params(("userId" = i32, Path, description = "ID do responsável")),
    responses((status = 200, description = "Soma do valor estimado", body = TotalValueResponse)),
    security(("api_jwt" = []))
)]
pub async fn total_value_by_user(
    State(app_state): State<AppState>,
    _perm: RequirePermission<OpportunitiesView>,
    Path(user_id): Path<i32>,
) -> Result<Json<TotalValueResponse>, AppError> {
    Ok(Json(app_state.opportunity_service.total_value_by_user(user_id).await?))
}

// PUT /api/opportunities/{id}/stage/{stageId}
#[utoipa::path(
    put,
    path = "/api/opportunities/{id}/stage/{stageId}",
    tag = "Opportunities",
    params(
        ("id" = i32, Path, description = "ID da oportunidade"),
        ("stageId" = i32, Path, description = "ID da nova etapa")
    ),
    responses(
        (status = 200, description = "Oportunidade movida", body = Opportunity),
        (status = 400, description = "Etapa inexistente"),
        (status = 404, description = "Oportunidade não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn move_to_stage(
    State(app_state): State<AppState>,
    _perm: RequirePermission<OpportunitiesUpdate>,
    auth: AuthenticatedUser,
    Path((id, stage_id)): Path<(i32, i32)>,
) -> Result<Json<Opportunity>, AppError> {
    let opportunity = app_state
        .opportunity_service
        .move_to_stage(id, stage_id, auth.actor())
        .await?;
    Ok(Json(opportunity))
}

// GET /api/opportunities/summary/by-stage
#[utoipa::path(
    get,
    path = "/api/opportunities/summary/by-stage",
    tag = "Opportunities",
    responses((status = 200, description = "Valor somado por etapa, na ordem do funil", body = Vec<StageValue>)),
    security(("api_jwt" = []))
)]
pub async fn value_by_stage(
    State(app_state): State<AppState>,
    _perm: RequirePermission<OpportunitiesView>,
) -> Result<Json<Vec<StageValue>>, AppError> {
    Ok(Json(app_state.opportunity_service.value_by_stage().await?))
}

// GET /api/sales-stages
#[utoipa::path(
    get,
    path = "/api/sales-stages",
    tag = "Opportunities",
    responses((status = 200, description = "Etapas do funil em ordem", body = Vec<SalesStage>)),
    security(("api_jwt" = []))
)]
pub async fn list_sales_stages(
    State(app_state): State<AppState>,
    _perm: RequirePermission<OpportunitiesView>,
) -> Result<Json<Vec<SalesStage>>, AppError> {
    Ok(Json(app_state.opportunity_service.list_stages().await?))
}
