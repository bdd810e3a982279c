// src/handlers/clients.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        pagination::{effective_limit, effective_offset},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::clients::{
        Client, ClientActivityLog, ClientContact, ClientContract, ClientDocument, ClientSite,
        ClientStatus, ClientType, CreateClientDocumentPayload, CreateClientPayload,
        CreateContactPayload, CreateContractPayload, CreateSitePayload, UpdateClientPayload,
    },
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ClientListParams {
    pub status: Option<ClientStatus>,
    pub client_type: Option<ClientType>,
    // Busca em nome, número de cliente e e-mail
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GdprConsentPayload {
    pub consent: bool,
}

// =============================================================================
//  CLIENTES
// =============================================================================

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clients",
    request_body = CreateClientPayload,
    responses(
        (status = 201, description = "Cliente criado", body = Client),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateClientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let client = app_state
        .client_service
        .create_client(&app_state.db_pool, &payload, Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(client)))
}

// GET /api/clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clients",
    params(ClientListParams),
    responses(
        (status = 200, description = "Lista de clientes", body = Vec<Client>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(params): Query<ClientListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let clients = app_state
        .client_service
        .list_clients(
            params.status,
            params.client_type,
            params.q.as_deref(),
            effective_limit(params.limit, 50, 200),
            effective_offset(params.offset),
        )
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(clients)))
}

// GET /api/clients/{id}
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "Clients",
    responses(
        (status = 200, description = "Detalhe do cliente", body = Client),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let client = app_state
        .client_service
        .get_client(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(client)))
}

// PUT /api/clients/{id}
#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "Clients",
    request_body = UpdateClientPayload,
    responses(
        (status = 200, description = "Cliente atualizado", body = Client),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let client = app_state
        .client_service
        .update_client(&app_state.db_pool, id, &payload, Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(client)))
}

// DELETE /api/clients/{id}
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "Clients",
    responses(
        (status = 204, description = "Cliente removido"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .client_service
        .delete_client(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/clients/{id}/gdpr-consent
#[utoipa::path(
    post,
    path = "/api/clients/{id}/gdpr-consent",
    tag = "Clients",
    request_body = GdprConsentPayload,
    responses(
        (status = 200, description = "Consentimento registrado", body = Client)
    ),
    security(("api_jwt" = []))
)]
pub async fn record_gdpr_consent(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<GdprConsentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let client = app_state
        .client_service
        .record_gdpr_consent(&app_state.db_pool, id, payload.consent, Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(client)))
}

// GET /api/clients/{id}/activity
#[utoipa::path(
    get,
    path = "/api/clients/{id}/activity",
    tag = "Clients",
    responses(
        (status = 200, description = "Journal d'activité", body = Vec<ClientActivityLog>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_activity(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = app_state
        .client_service
        .list_activity(id, 100)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(entries)))
}

// =============================================================================
//  SITES
// =============================================================================

// POST /api/clients/{id}/sites
#[utoipa::path(
    post,
    path = "/api/clients/{id}/sites",
    tag = "Clients",
    request_body = CreateSitePayload,
    responses(
        (status = 201, description = "Site criado", body = ClientSite)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_site(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateSitePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let site = app_state
        .client_service
        .create_site(&app_state.db_pool, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(site)))
}

// GET /api/clients/{id}/sites
#[utoipa::path(
    get,
    path = "/api/clients/{id}/sites",
    tag = "Clients",
    responses(
        (status = 200, description = "Sites do cliente", body = Vec<ClientSite>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_sites(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let sites = app_state
        .client_service
        .list_sites(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(sites)))
}

// DELETE /api/clients/sites/{site_id}
#[utoipa::path(
    delete,
    path = "/api/clients/sites/{site_id}",
    tag = "Clients",
    responses(
        (status = 204, description = "Site removido")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_site(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(site_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .client_service
        .delete_site(&app_state.db_pool, site_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  CONTACTS / CONTRATS / DOCUMENTS
// =============================================================================

// POST /api/clients/{id}/contacts
#[utoipa::path(
    post,
    path = "/api/clients/{id}/contacts",
    tag = "Clients",
    request_body = CreateContactPayload,
    responses(
        (status = 201, description = "Contato criado", body = ClientContact)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_contact(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateContactPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let contact = app_state
        .client_service
        .create_contact(&app_state.db_pool, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(contact)))
}

// GET /api/clients/{id}/contacts
#[utoipa::path(
    get,
    path = "/api/clients/{id}/contacts",
    tag = "Clients",
    responses(
        (status = 200, description = "Contatos do cliente", body = Vec<ClientContact>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_contacts(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let contacts = app_state
        .client_service
        .list_contacts(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(contacts)))
}

// DELETE /api/clients/contacts/{contact_id}
#[utoipa::path(
    delete,
    path = "/api/clients/contacts/{contact_id}",
    tag = "Clients",
    responses(
        (status = 204, description = "Contato removido")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_contact(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(contact_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .client_service
        .delete_contact(&app_state.db_pool, contact_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/clients/{id}/contracts
#[utoipa::path(
    post,
    path = "/api/clients/{id}/contracts",
    tag = "Clients",
    request_body = CreateContractPayload,
    responses(
        (status = 201, description = "Contrato criado", body = ClientContract),
        (status = 409, description = "Número de contrato duplicado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_contract(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateContractPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let contract = app_state
        .client_service
        .create_contract(&app_state.db_pool, id, &payload, Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(contract)))
}

// GET /api/clients/{id}/contracts
#[utoipa::path(
    get,
    path = "/api/clients/{id}/contracts",
    tag = "Clients",
    responses(
        (status = 200, description = "Contratos do cliente", body = Vec<ClientContract>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_contracts(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let contracts = app_state
        .client_service
        .list_contracts(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(contracts)))
}

// POST /api/clients/{id}/documents
#[utoipa::path(
    post,
    path = "/api/clients/{id}/documents",
    tag = "Clients",
    request_body = CreateClientDocumentPayload,
    responses(
        (status = 201, description = "Documento registrado", body = ClientDocument)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_document(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateClientDocumentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let document = app_state
        .client_service
        .create_document(&app_state.db_pool, id, &payload, Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(document)))
}

// GET /api/clients/{id}/documents
#[utoipa::path(
    get,
    path = "/api/clients/{id}/documents",
    tag = "Clients",
    responses(
        (status = 200, description = "Documentos do cliente", body = Vec<ClientDocument>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_documents(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let documents = app_state
        .client_service
        .list_documents(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(documents)))
}
