// src/handlers/interventions.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
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
    models::interventions::{
        CreateInterventionDocumentPayload, CreateInterventionPayload, CreateNotePayload,
        CreateTaskPayload, Intervention, InterventionDocument, InterventionNote,
        InterventionPriority, InterventionStats, InterventionStatus, InterventionTask,
        InterventionType, PostponePayload, TaskStatus, UpdateInterventionPayload,
    },
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct InterventionListParams {
    pub status: Option<InterventionStatus>,
    pub priority: Option<InterventionPriority>,
    pub intervention_type: Option<InterventionType>,
    pub client_id: Option<Uuid>,
    pub technician: Option<Uuid>,
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct CalendarParams {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub technician: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusPayload {
    pub status: TaskStatus,
}

// =============================================================================
//  CRUD
// =============================================================================

// POST /api/interventions
#[utoipa::path(
    post,
    path = "/api/interventions",
    tag = "Interventions",
    request_body = CreateInterventionPayload,
    responses(
        (status = 201, description = "Intervenção criada", body = Intervention)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_intervention(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateInterventionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let intervention = app_state
        .intervention_service
        .create_intervention(&app_state.db_pool, &payload, Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(intervention)))
}

// GET /api/interventions
#[utoipa::path(
    get,
    path = "/api/interventions",
    tag = "Interventions",
    params(InterventionListParams),
    responses(
        (status = 200, description = "Lista de intervenções", body = Vec<Intervention>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_interventions(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(params): Query<InterventionListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let interventions = app_state
        .intervention_service
        .list_interventions(
            params.status,
            params.priority,
            params.intervention_type,
            params.client_id,
            params.technician,
            params.q.as_deref(),
            effective_limit(params.limit, 50, 200),
            effective_offset(params.offset),
        )
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(interventions)))
}

// GET /api/interventions/calendar
#[utoipa::path(
    get,
    path = "/api/interventions/calendar",
    tag = "Interventions",
    params(CalendarParams),
    responses(
        (status = 200, description = "Janela do calendário", body = Vec<Intervention>)
    ),
    security(("api_jwt" = []))
)]
pub async fn calendar(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(params): Query<CalendarParams>,
) -> Result<impl IntoResponse, ApiError> {
    let interventions = app_state
        .intervention_service
        .list_calendar(params.from, params.to, params.technician)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(interventions)))
}

// GET /api/interventions/stats
#[utoipa::path(
    get,
    path = "/api/interventions/stats",
    tag = "Interventions",
    responses(
        (status = 200, description = "Indicadores de planejamento", body = InterventionStats)
    ),
    security(("api_jwt" = []))
)]
pub async fn stats(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let stats = app_state
        .intervention_service
        .stats()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(stats)))
}

// GET /api/interventions/{id}
#[utoipa::path(
    get,
    path = "/api/interventions/{id}",
    tag = "Interventions",
    responses(
        (status = 200, description = "Detalhe da intervenção", body = Intervention),
        (status = 404, description = "Intervenção não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_intervention(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let intervention = app_state
        .intervention_service
        .get_intervention(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(intervention)))
}

// PUT /api/interventions/{id}
#[utoipa::path(
    put,
    path = "/api/interventions/{id}",
    tag = "Interventions",
    request_body = UpdateInterventionPayload,
    responses(
        (status = 200, description = "Intervenção atualizada", body = Intervention)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_intervention(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInterventionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let intervention = app_state
        .intervention_service
        .update_intervention(&app_state.db_pool, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(intervention)))
}

// DELETE /api/interventions/{id}
#[utoipa::path(
    delete,
    path = "/api/interventions/{id}",
    tag = "Interventions",
    responses(
        (status = 204, description = "Intervenção removida")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_intervention(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .intervention_service
        .delete_intervention(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  WORKFLOW
// =============================================================================

// POST /api/interventions/{id}/start
#[utoipa::path(
    post,
    path = "/api/interventions/{id}/start",
    tag = "Interventions",
    responses(
        (status = 200, description = "Intervenção iniciada", body = Intervention),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn start_intervention(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let intervention = app_state
        .intervention_service
        .start(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(intervention)))
}

// POST /api/interventions/{id}/complete
#[utoipa::path(
    post,
    path = "/api/interventions/{id}/complete",
    tag = "Interventions",
    responses(
        (status = 200, description = "Intervenção concluída", body = Intervention),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn complete_intervention(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let intervention = app_state
        .intervention_service
        .complete(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(intervention)))
}

// POST /api/interventions/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/interventions/{id}/cancel",
    tag = "Interventions",
    responses(
        (status = 200, description = "Intervenção cancelada", body = Intervention),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_intervention(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let intervention = app_state
        .intervention_service
        .cancel(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(intervention)))
}

// POST /api/interventions/{id}/postpone
#[utoipa::path(
    post,
    path = "/api/interventions/{id}/postpone",
    tag = "Interventions",
    request_body = PostponePayload,
    responses(
        (status = 200, description = "Intervenção adiada", body = Intervention),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn postpone_intervention(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<PostponePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let intervention = app_state
        .intervention_service
        .postpone(&app_state.db_pool, id, payload.new_scheduled_date)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(intervention)))
}

// =============================================================================
//  TÂCHES / DOCUMENTS / NOTES
// =============================================================================

// POST /api/interventions/{id}/tasks
#[utoipa::path(
    post,
    path = "/api/interventions/{id}/tasks",
    tag = "Interventions",
    request_body = CreateTaskPayload,
    responses(
        (status = 201, description = "Tarefa criada", body = InterventionTask)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_task(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateTaskPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let task = app_state
        .intervention_service
        .create_task(&app_state.db_pool, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(task)))
}

// GET /api/interventions/{id}/tasks
#[utoipa::path(
    get,
    path = "/api/interventions/{id}/tasks",
    tag = "Interventions",
    responses(
        (status = 200, description = "Tarefas da intervenção", body = Vec<InterventionTask>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_tasks(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let tasks = app_state
        .intervention_service
        .list_tasks(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(tasks)))
}

// PUT /api/interventions/tasks/{task_id}/status
#[utoipa::path(
    put,
    path = "/api/interventions/tasks/{task_id}/status",
    tag = "Interventions",
    request_body = TaskStatusPayload,
    responses(
        (status = 200, description = "Status da tarefa atualizado", body = InterventionTask)
    ),
    security(("api_jwt" = []))
)]
pub async fn set_task_status(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<TaskStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let task = app_state
        .intervention_service
        .set_task_status(&app_state.db_pool, task_id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(task)))
}

// DELETE /api/interventions/tasks/{task_id}
#[utoipa::path(
    delete,
    path = "/api/interventions/tasks/{task_id}",
    tag = "Interventions",
    responses(
        (status = 204, description = "Tarefa removida")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_task(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(task_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .intervention_service
        .delete_task(&app_state.db_pool, task_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/interventions/{id}/documents
#[utoipa::path(
    post,
    path = "/api/interventions/{id}/documents",
    tag = "Interventions",
    request_body = CreateInterventionDocumentPayload,
    responses(
        (status = 201, description = "Documento registrado", body = InterventionDocument)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_document(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateInterventionDocumentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let document = app_state
        .intervention_service
        .create_document(&app_state.db_pool, id, &payload, Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(document)))
}

// GET /api/interventions/{id}/documents
#[utoipa::path(
    get,
    path = "/api/interventions/{id}/documents",
    tag = "Interventions",
    responses(
        (status = 200, description = "Documentos da intervenção", body = Vec<InterventionDocument>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_documents(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let documents = app_state
        .intervention_service
        .list_documents(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(documents)))
}

// POST /api/interventions/{id}/notes
#[utoipa::path(
    post,
    path = "/api/interventions/{id}/notes",
    tag = "Interventions",
    request_body = CreateNotePayload,
    responses(
        (status = 201, description = "Nota criada", body = InterventionNote)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_note(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateNotePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let note = app_state
        .intervention_service
        .create_note(&app_state.db_pool, id, &payload, Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(note)))
}

// GET /api/interventions/{id}/notes
#[utoipa::path(
    get,
    path = "/api/interventions/{id}/notes",
    tag = "Interventions",
    responses(
        (status = 200, description = "Notas da intervenção", body = Vec<InterventionNote>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_notes(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let notes = app_state
        .intervention_service
        .list_notes(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(notes)))
}
