// src/handlers/inspections.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        pagination::{effective_limit, effective_offset},
    },
    config::AppState,
    middleware::i18n::Locale,
    models::inspections::{
        CreateInspectionPayload, CreateItemPayload, CreateMediaPayload, CreateSignaturePayload,
        CreateTemplatePayload, Inspection, InspectionItem, InspectionMedia, InspectionSignature,
        InspectionStatus, InspectionTemplate, RejectPayload, UpdateInspectionPayload,
        UpdateItemValuePayload,
    },
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct InspectionListParams {
    pub status: Option<InspectionStatus>,
    pub client_id: Option<Uuid>,
    pub inspector: Option<Uuid>,
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// =============================================================================
//  MODÈLES
// =============================================================================

// POST /api/inspections/templates
#[utoipa::path(
    post,
    path = "/api/inspections/templates",
    tag = "Inspections",
    request_body = CreateTemplatePayload,
    responses(
        (status = 201, description = "Modelo criado", body = InspectionTemplate)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_template(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CreateTemplatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let template = app_state
        .inspection_service
        .create_template(&app_state.db_pool, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(template)))
}

// GET /api/inspections/templates
#[utoipa::path(
    get,
    path = "/api/inspections/templates",
    tag = "Inspections",
    responses(
        (status = 200, description = "Modelos ativos", body = Vec<InspectionTemplate>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_templates(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let templates = app_state
        .inspection_service
        .list_templates(true)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(templates)))
}

// =============================================================================
//  INSPECTIONS
// =============================================================================

// POST /api/inspections
#[utoipa::path(
    post,
    path = "/api/inspections",
    tag = "Inspections",
    request_body = CreateInspectionPayload,
    responses(
        (status = 201, description = "Inspeção criada", body = Inspection)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_inspection(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CreateInspectionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let inspection = app_state
        .inspection_service
        .create_inspection(&app_state.db_pool, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(inspection)))
}

// GET /api/inspections
#[utoipa::path(
    get,
    path = "/api/inspections",
    tag = "Inspections",
    params(InspectionListParams),
    responses(
        (status = 200, description = "Lista de inspeções", body = Vec<Inspection>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_inspections(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(params): Query<InspectionListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let inspections = app_state
        .inspection_service
        .list_inspections(
            params.status,
            params.client_id,
            params.inspector,
            params.q.as_deref(),
            effective_limit(params.limit, 50, 200),
            effective_offset(params.offset),
        )
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(inspections)))
}

// GET /api/inspections/{id}
#[utoipa::path(
    get,
    path = "/api/inspections/{id}",
    tag = "Inspections",
    responses(
        (status = 200, description = "Detalhe da inspeção", body = Inspection),
        (status = 404, description = "Inspeção não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_inspection(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let inspection = app_state
        .inspection_service
        .get_inspection(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(inspection)))
}

// PUT /api/inspections/{id}
#[utoipa::path(
    put,
    path = "/api/inspections/{id}",
    tag = "Inspections",
    request_body = UpdateInspectionPayload,
    responses(
        (status = 200, description = "Inspeção atualizada", body = Inspection)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_inspection(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInspectionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let inspection = app_state
        .inspection_service
        .update_inspection(&app_state.db_pool, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(inspection)))
}

// DELETE /api/inspections/{id}
#[utoipa::path(
    delete,
    path = "/api/inspections/{id}",
    tag = "Inspections",
    responses(
        (status = 204, description = "Inspeção removida")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_inspection(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .inspection_service
        .delete_inspection(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  WORKFLOW
// =============================================================================

// POST /api/inspections/{id}/start
#[utoipa::path(
    post,
    path = "/api/inspections/{id}/start",
    tag = "Inspections",
    responses(
        (status = 200, description = "Inspeção iniciada", body = Inspection),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn start_inspection(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let inspection = app_state
        .inspection_service
        .start(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(inspection)))
}

// POST /api/inspections/{id}/complete
#[utoipa::path(
    post,
    path = "/api/inspections/{id}/complete",
    tag = "Inspections",
    responses(
        (status = 200, description = "Inspeção concluída", body = Inspection),
        (status = 400, description = "Campos obrigatórios pendentes"),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn complete_inspection(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let inspection = app_state
        .inspection_service
        .complete(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(inspection)))
}

// POST /api/inspections/{id}/validate
#[utoipa::path(
    post,
    path = "/api/inspections/{id}/validate",
    tag = "Inspections",
    responses(
        (status = 200, description = "Inspeção validada", body = Inspection),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn validate_inspection(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let inspection = app_state
        .inspection_service
        .validate(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(inspection)))
}

// POST /api/inspections/{id}/reject
#[utoipa::path(
    post,
    path = "/api/inspections/{id}/reject",
    tag = "Inspections",
    request_body = RejectPayload,
    responses(
        (status = 200, description = "Inspeção rejeitada", body = Inspection),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_inspection(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let inspection = app_state
        .inspection_service
        .reject(&app_state.db_pool, id, &payload.reason)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(inspection)))
}

// =============================================================================
//  ITEMS / MÉDIAS / SIGNATURES
// =============================================================================

// POST /api/inspections/{id}/items
#[utoipa::path(
    post,
    path = "/api/inspections/{id}/items",
    tag = "Inspections",
    request_body = CreateItemPayload,
    responses(
        (status = 201, description = "Campo criado", body = InspectionItem)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let item = app_state
        .inspection_service
        .create_item(&app_state.db_pool, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(item)))
}

// GET /api/inspections/{id}/items
#[utoipa::path(
    get,
    path = "/api/inspections/{id}/items",
    tag = "Inspections",
    responses(
        (status = 200, description = "Campos do formulário", body = Vec<InspectionItem>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_items(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let items = app_state
        .inspection_service
        .list_items(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(items)))
}

// PUT /api/inspections/items/{item_id}
#[utoipa::path(
    put,
    path = "/api/inspections/items/{item_id}",
    tag = "Inspections",
    request_body = UpdateItemValuePayload,
    responses(
        (status = 200, description = "Valor registrado", body = InspectionItem)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_item_value(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<UpdateItemValuePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let item = app_state
        .inspection_service
        .update_item_value(&app_state.db_pool, item_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(item)))
}

// POST /api/inspections/{id}/media
#[utoipa::path(
    post,
    path = "/api/inspections/{id}/media",
    tag = "Inspections",
    request_body = CreateMediaPayload,
    responses(
        (status = 201, description = "Mídia registrada", body = InspectionMedia)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_media(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateMediaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let media = app_state
        .inspection_service
        .create_media(&app_state.db_pool, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(media)))
}

// GET /api/inspections/{id}/media
#[utoipa::path(
    get,
    path = "/api/inspections/{id}/media",
    tag = "Inspections",
    responses(
        (status = 200, description = "Mídias da inspeção", body = Vec<InspectionMedia>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_media(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let media = app_state
        .inspection_service
        .list_media(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(media)))
}

// POST /api/inspections/{id}/signatures
#[utoipa::path(
    post,
    path = "/api/inspections/{id}/signatures",
    tag = "Inspections",
    request_body = CreateSignaturePayload,
    responses(
        (status = 201, description = "Assinatura registrada", body = InspectionSignature)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_signature(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateSignaturePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let signature = app_state
        .inspection_service
        .create_signature(&app_state.db_pool, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(signature)))
}

// GET /api/inspections/{id}/signatures
#[utoipa::path(
    get,
    path = "/api/inspections/{id}/signatures",
    tag = "Inspections",
    responses(
        (status = 200, description = "Assinaturas da inspeção", body = Vec<InspectionSignature>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_signatures(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let signatures = app_state
        .inspection_service
        .list_signatures(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(signatures)))
}
