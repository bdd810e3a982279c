// src/handlers/reports.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
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
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::reports::{
        CreateReportPayload, CreateReportTemplatePayload, InterventionReport, ReportExport,
        ReportHistory, ReportStatus, ReportTemplate, ReviewPayload, UpdateReportPayload,
    },
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ReportListParams {
    pub status: Option<ReportStatus>,
    pub intervention_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// =============================================================================
//  TEMPLATES
// =============================================================================

// POST /api/reports/templates
#[utoipa::path(
    post,
    path = "/api/reports/templates",
    tag = "Reports",
    request_body = CreateReportTemplatePayload,
    responses(
        (status = 201, description = "Template criado", body = ReportTemplate)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_template(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateReportTemplatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let template = app_state
        .report_service
        .create_template(&app_state.db_pool, &payload, Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(template)))
}

// GET /api/reports/templates
#[utoipa::path(
    get,
    path = "/api/reports/templates",
    tag = "Reports",
    responses(
        (status = 200, description = "Templates ativos", body = Vec<ReportTemplate>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_templates(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let templates = app_state
        .report_service
        .list_templates(true)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(templates)))
}

// =============================================================================
//  RAPPORTS
// =============================================================================

// POST /api/reports
#[utoipa::path(
    post,
    path = "/api/reports",
    tag = "Reports",
    request_body = CreateReportPayload,
    responses(
        (status = 201, description = "Rapport criado", body = InterventionReport)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_report(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateReportPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let report = app_state
        .report_service
        .create_report(&app_state.db_pool, &payload, Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(report)))
}

// GET /api/reports
#[utoipa::path(
    get,
    path = "/api/reports",
    tag = "Reports",
    params(ReportListParams),
    responses(
        (status = 200, description = "Lista de rapports", body = Vec<InterventionReport>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_reports(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(params): Query<ReportListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let reports = app_state
        .report_service
        .list_reports(
            params.status,
            params.intervention_id,
            effective_limit(params.limit, 50, 200),
            effective_offset(params.offset),
        )
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(reports)))
}

// GET /api/reports/{id}
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    tag = "Reports",
    responses(
        (status = 200, description = "Detalhe do rapport", body = InterventionReport),
        (status = 404, description = "Rapport não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_report(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .report_service
        .get_report(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(report)))
}

// PUT /api/reports/{id}
#[utoipa::path(
    put,
    path = "/api/reports/{id}",
    tag = "Reports",
    request_body = UpdateReportPayload,
    responses(
        (status = 200, description = "Rapport atualizado", body = InterventionReport),
        (status = 409, description = "Rapport não editável neste status")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_report(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReportPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let report = app_state
        .report_service
        .update_report(&app_state.db_pool, id, &payload, Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(report)))
}

// DELETE /api/reports/{id}
#[utoipa::path(
    delete,
    path = "/api/reports/{id}",
    tag = "Reports",
    responses(
        (status = 204, description = "Rapport removido")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_report(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .report_service
        .delete_report(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/reports/{id}/history
#[utoipa::path(
    get,
    path = "/api/reports/{id}/history",
    tag = "Reports",
    responses(
        (status = 200, description = "Trilha de auditoria", body = Vec<ReportHistory>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_history(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let history = app_state
        .report_service
        .list_history(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(history)))
}

// =============================================================================
//  WORKFLOW
// =============================================================================

// POST /api/reports/{id}/submit
#[utoipa::path(
    post,
    path = "/api/reports/{id}/submit",
    tag = "Reports",
    responses(
        (status = 200, description = "Enviado para revisão", body = InterventionReport),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn submit_report(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .report_service
        .submit(&app_state.db_pool, id, Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(report)))
}

// POST /api/reports/{id}/approve
#[utoipa::path(
    post,
    path = "/api/reports/{id}/approve",
    tag = "Reports",
    request_body = ReviewPayload,
    responses(
        (status = 200, description = "Rapport aprovado", body = InterventionReport),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_report(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .report_service
        .approve(&app_state.db_pool, id, payload.notes.as_deref(), Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(report)))
}

// POST /api/reports/{id}/reject
#[utoipa::path(
    post,
    path = "/api/reports/{id}/reject",
    tag = "Reports",
    request_body = ReviewPayload,
    responses(
        (status = 200, description = "Rapport rejeitado", body = InterventionReport),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_report(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .report_service
        .reject(&app_state.db_pool, id, payload.notes.as_deref(), Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(report)))
}

// POST /api/reports/{id}/archive
#[utoipa::path(
    post,
    path = "/api/reports/{id}/archive",
    tag = "Reports",
    responses(
        (status = 200, description = "Rapport arquivado", body = InterventionReport),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn archive_report(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .report_service
        .archive(&app_state.db_pool, id, Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(report)))
}

// =============================================================================
//  EXPORT
// =============================================================================

// POST /api/reports/{id}/export — devolve o PDF gerado
#[utoipa::path(
    post,
    path = "/api/reports/{id}/export",
    tag = "Reports",
    responses(
        (status = 200, description = "PDF do rapport", body = Vec<u8>, content_type = "application/pdf"),
        (status = 409, description = "Só rapports aprovados podem ser exportados")
    ),
    security(("api_jwt" = []))
)]
pub async fn export_report(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let (_, bytes) = app_state
        .report_service
        .export_pdf(&app_state.db_pool, id, Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"rapport-{}.pdf\"", id),
            ),
        ],
        bytes,
    ))
}

// GET /api/reports/{id}/exports
#[utoipa::path(
    get,
    path = "/api/reports/{id}/exports",
    tag = "Reports",
    responses(
        (status = 200, description = "Histórico de exports", body = Vec<ReportExport>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_exports(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let exports = app_state
        .report_service
        .list_exports(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(exports)))
}
