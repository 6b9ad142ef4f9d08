// src/handlers/contacts.rs

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
        rbac::{ContactsCreate, ContactsDelete, ContactsUpdate, ContactsView, RequirePermission},
    },
    models::{
        company::NameSearch,
        contact::{Contact, ContactPayload, EmailQuery},
    },
};

// GET /api/contacts
#[utoipa::path(
    get,
    path = "/api/contacts",
    tag = "Contacts",
    params(PageParams),
    responses(
        (status = 200, description = "Lista de contatos", body = Vec<Contact>),
        (status = 403, description = "Sem a permissão Contacts.View")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_contacts(
    State(app_state): State<AppState>,
    _perm: RequirePermission<ContactsView>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<Contact>>, AppError> {
    let contacts = app_state.contact_service.list(params.page_request()).await?;
    Ok(Json(contacts))
}

// GET /api/contacts/{id}
#[utoipa::path(
    get,
    path = "/api/contacts/{id}",
    tag = "Contacts",
    params(("id" = i32, Path, description = "ID do contato")),
    responses(
        (status = 200, description = "Contato", body = Contact),
        (status = 404, description = "Contato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_contact(
    State(app_state): State<AppState>,
    _perm: RequirePermission<ContactsView>,
    Path(id): Path<i32>,
) -> Result<Json<Contact>, AppError> {
    Ok(Json(app_state.contact_service.get(id).await?))
}

// POST /api/contacts
#[utoipa::path(
    post,
    path = "/api/contacts",
    tag = "Contacts",
    request_body = ContactPayload,
    responses(
        (status = 201, description = "Contato criado", body = Contact),
        (status = 400, description = "Dados inválidos ou empresa inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_contact(
    State(app_state): State<AppState>,
    _perm: RequirePermission<ContactsCreate>,
    auth: AuthenticatedUser,
    AppJson(payload): AppJson<ContactPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let contact = app_state.contact_service.create(payload, auth.actor()).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

// PUT /api/contacts/{id}
#[utoipa::path(
    put,
    path = "/api/contacts/{id}",
    tag = "Contacts",
    params(("id" = i32, Path, description = "ID do contato")),
    request_body = ContactPayload,
    responses(
        (status = 200, description = "Contato atualizado", body = Contact),
        (status = 400, description = "Dados inválidos ou ID divergente"),
        (status = 404, description = "Contato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_contact(
    State(app_state): State<AppState>,
    _perm: RequirePermission<ContactsUpdate>,
    auth: AuthenticatedUser,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ContactPayload>,
) -> Result<Json<Contact>, AppError> {
    check_path_id(id, payload.id)?;
    payload.validate()?;

    let contact = app_state
        .contact_service
        .update(id, payload, auth.actor())
        .await?;
    Ok(Json(contact))
}

// DELETE /api/contacts/{id}
#[utoipa::path(
    delete,
    path = "/api/contacts/{id}",
    tag = "Contacts",
    params(("id" = i32, Path, description = "ID do contato")),
    responses(
        (status = 204, description = "Contato excluído"),
        (status = 404, description = "Contato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_contact(
    State(app_state): State<AppState>,
    _perm: RequirePermission<ContactsDelete>,
    auth: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    app_state.contact_service.delete(id, auth.actor()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/contacts/company/{companyId}
#[utoipa::path(
    get,
    path = "/api/contacts/company/{companyId}",
    tag = "Contacts",
    params(("companyId" = i32, Path, description = "ID da empresa")),
    responses((status = 200, description = "Contatos da empresa", body = Vec<Contact>)),
    security(("api_jwt" = []))
)]
pub async fn contacts_by_company(
    State(app_state): State<AppState>,
    _perm: RequirePermission<ContactsView>,
    Path(company_id): Path<i32>,
) -> Result<Json<Vec<Contact>>, AppError> {
    Ok(Json(app_state.contact_service.find_by_company(company_id).await?))
}

// GET /api/contacts/search?name=
#[utoipa::path(
    get,
    path = "/api/contacts/search",
    tag = "Contacts",
    params(NameSearch),
    responses((status = 200, description = "Contatos cujo nome completo contém o trecho", body = Vec<Contact>)),
    security(("api_jwt" = []))
)]
pub async fn search_contacts(
    State(app_state): State<AppState>,
    _perm: RequirePermission<ContactsView>,
    Query(search): Query<NameSearch>,
) -> Result<Json<Vec<Contact>>, AppError> {
    Ok(Json(app_state.contact_service.search_by_name(&search.name).await?))
}

// GET /api/contacts/by-email?email=
#[utoipa::path(
    get,
    path = "/api/contacts/by-email",
    tag = "Contacts",
    params(EmailQuery),
    responses(
        (status = 200, description = "Contato com o e-mail", body = Contact),
        (status = 404, description = "Nenhum contato com esse e-mail")
    ),
    security(("api_jwt" = []))
)]
pub async fn contact_by_email(
    State(app_state): State<AppState>,
    _perm: RequirePermission<ContactsView>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Contact>, AppError> {
    Ok(Json(app_state.contact_service.find_by_email(&query.email).await?))
}
