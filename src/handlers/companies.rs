// src/handlers/companies.rs

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
        rbac::{CompaniesCreate, CompaniesDelete, CompaniesUpdate, CompaniesView, RequirePermission},
    },
    models::{
        company::{Company, CompanyDetails, CompanyPayload, CountResponse, NameSearch},
        contact::Contact,
    },
};

// =============================================================================
//  CRUD
// =============================================================================

// GET /api/companies
#[utoipa::path(
    get,
    path = "/api/companies",
    tag = "Companies",
    params(PageParams),
    responses(
        (status = 200, description = "Lista de empresas", body = Vec<Company>),
        (status = 401, description = "Não autorizado"),
        (status = 403, description = "Sem a permissão Companies.View")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_companies(
    State(app_state): State<AppState>,
    _perm: RequirePermission<CompaniesView>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<Company>>, AppError> {
    let companies = app_state.company_service.list(params.page_request()).await?;
    Ok(Json(companies))
}

// GET /api/companies/{id}
#[utoipa::path(
    get,
    path = "/api/companies/{id}",
    tag = "Companies",
    params(("id" = i32, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Empresa", body = Company),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_company(
    State(app_state): State<AppState>,
    _perm: RequirePermission<CompaniesView>,
    Path(id): Path<i32>,
) -> Result<Json<Company>, AppError> {
    Ok(Json(app_state.company_service.get(id).await?))
}

// POST /api/companies
#[utoipa::path(
    post,
    path = "/api/companies",
    tag = "Companies",
    request_body = CompanyPayload,
    responses(
        (status = 201, description = "Empresa criada", body = Company),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_company(
    State(app_state): State<AppState>,
    _perm: RequirePermission<CompaniesCreate>,
    auth: AuthenticatedUser,
    AppJson(payload): AppJson<CompanyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let company = app_state.company_service.create(payload, auth.actor()).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

// PUT /api/companies/{id}
#[utoipa::path(
    put,
    path = "/api/companies/{id}",
    tag = "Companies",
    params(("id" = i32, Path, description = "ID da empresa")),
    request_body = CompanyPayload,
    responses(
        (status = 200, description = "Empresa atualizada", body = Company),
        (status = 400, description = "Dados inválidos ou ID divergente"),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_company(
    State(app_state): State<AppState>,
    _perm: RequirePermission<CompaniesUpdate>,
    auth: AuthenticatedUser,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CompanyPayload>,
) -> Result<Json<Company>, AppError> {
    check_path_id(id, payload.id)?;
    payload.validate()?;

    let company = app_state
        .company_service
        .update(id, payload, auth.actor())
        .await?;
    Ok(Json(company))
}

// DELETE /api/companies/{id}
#[utoipa::path(
    delete,
    path = "/api/companies/{id}",
    tag = "Companies",
    params(("id" = i32, Path, description = "ID da empresa")),
    responses(
        (status = 204, description = "Empresa excluída"),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_company(
    State(app_state): State<AppState>,
    _perm: RequirePermission<CompaniesDelete>,
    auth: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    app_state.company_service.delete(id, auth.actor()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  CONSULTAS
// =============================================================================

// GET /api/companies/search?name=
#[utoipa::path(
    get,
    path = "/api/companies/search",
    tag = "Companies",
    params(NameSearch),
    responses((status = 200, description = "Empresas cujo nome contém o trecho", body = Vec<Company>)),
    security(("api_jwt" = []))
)]
pub async fn search_companies(
    State(app_state): State<AppState>,
    _perm: RequirePermission<CompaniesView>,
    Query(search): Query<NameSearch>,
) -> Result<Json<Vec<Company>>, AppError> {
    Ok(Json(app_state.company_service.search_by_name(&search.name).await?))
}

// GET /api/companies/industry/{industry}
#[utoipa::path(
    get,
    path = "/api/companies/industry/{industry}",
    tag = "Companies",
    params(("industry" = String, Path, description = "Setor")),
    responses((status = 200, description = "Empresas do setor", body = Vec<Company>)),
    security(("api_jwt" = []))
)]
pub async fn companies_by_industry(
    State(app_state): State<AppState>,
    _perm: RequirePermission<CompaniesView>,
    Path(industry): Path<String>,
) -> Result<Json<Vec<Company>>, AppError> {
    Ok(Json(app_state.company_service.find_by_industry(&industry).await?))
}

// GET /api/companies/count
#[utoipa::path(
    get,
    path = "/api/companies/count",
    tag = "Companies",
    responses((status = 200, description = "Total de empresas ativas", body = CountResponse)),
    security(("api_jwt" = []))
)]
pub async fn count_companies(
    State(app_state): State<AppState>,
    _perm: RequirePermission<CompaniesView>,
) -> Result<Json<CountResponse>, AppError> {
    let count = app_state.company_service.count().await?;
    Ok(Json(CountResponse { count }))
}

// GET /api/companies/{id}/details
#[utoipa::path(
    get,
    path = "/api/companies/{id}/details",
    tag = "Companies",
    params(("id" = i32, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Empresa com contatos e oportunidades", body = CompanyDetails),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn company_details(
    State(app_state): State<AppState>,
    _perm: RequirePermission<CompaniesView>,
    Path(id): Path<i32>,
) -> Result<Json<CompanyDetails>, AppError> {
    Ok(Json(app_state.company_service.details(id).await?))
}

// =============================================================================
//  CONTATOS DA EMPRESA
// =============================================================================

// GET /api/companies/{id}/contacts
#[utoipa::path(
    get,
    path = "/api/companies/{id}/contacts",
    tag = "Companies",
    params(("id" = i32, Path, description = "ID da empresa")),
    responses((status = 200, description = "Contatos da empresa", body = Vec<Contact>)),
    security(("api_jwt" = []))
)]
pub async fn company_contacts(
    State(app_state): State<AppState>,
    _perm: RequirePermission<CompaniesView>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Contact>>, AppError> {
    Ok(Json(app_state.contact_service.find_by_company(id).await?))
}

// GET /api/companies/{id}/primary-contact
#[utoipa::path(
    get,
    path = "/api/companies/{id}/primary-contact",
    tag = "Companies",
    params(("id" = i32, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Contato principal", body = Contact),
        (status = 404, description = "Empresa inexistente ou sem contato principal")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_primary_contact(
    State(app_state): State<AppState>,
    _perm: RequirePermission<CompaniesView>,
    Path(id): Path<i32>,
) -> Result<Json<Contact>, AppError> {
    Ok(Json(app_state.contact_service.primary_contact(id).await?))
}

// PUT /api/companies/{id}/primary-contact/{contactId}
#[utoipa::path(
    put,
    path = "/api/companies/{id}/primary-contact/{contactId}",
    tag = "Companies",
    params(
        ("id" = i32, Path, description = "ID da empresa"),
        ("contactId" = i32, Path, description = "ID do contato")
    ),
    responses(
        (status = 204, description = "Contato principal trocado"),
        (status = 400, description = "O contato não pertence à empresa"),
        (status = 404, description = "Empresa ou contato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_primary_contact(
    State(app_state): State<AppState>,
    _perm: RequirePermission<CompaniesUpdate>,
    auth: AuthenticatedUser,
    Path((id, contact_id)): Path<(i32, i32)>,
) -> Result<StatusCode, AppError> {
    app_state
        .contact_service
        .set_primary_contact(id, contact_id, auth.actor())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
