// src/handlers/notifications.rs

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
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::notifications::{
        CreateNotificationPayload, CreateNotificationTemplatePayload, Notification,
        NotificationLog, NotificationPreference, NotificationStatus, NotificationTemplate,
        UnreadCount, UpdatePreferencePayload,
    },
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListParams {
    pub status: Option<NotificationStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// =============================================================================
//  TEMPLATES
// =============================================================================

// POST /api/notifications/templates
#[utoipa::path(
    post,
    path = "/api/notifications/templates",
    tag = "Notifications",
    request_body = CreateNotificationTemplatePayload,
    responses(
        (status = 201, description = "Template criado", body = NotificationTemplate)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_template(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateNotificationTemplatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let template = app_state
        .notification_service
        .create_template(&payload, Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(template)))
}

// GET /api/notifications/templates
#[utoipa::path(
    get,
    path = "/api/notifications/templates",
    tag = "Notifications",
    responses(
        (status = 200, description = "Templates ativos", body = Vec<NotificationTemplate>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_templates(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let templates = app_state
        .notification_service
        .list_templates()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(templates)))
}

// =============================================================================
//  NOTIFICATIONS
// =============================================================================

// POST /api/notifications
#[utoipa::path(
    post,
    path = "/api/notifications",
    tag = "Notifications",
    request_body = CreateNotificationPayload,
    responses(
        (status = 201, description = "Notificação criada e despachada", body = Notification)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_notification(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CreateNotificationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let notification = app_state
        .notification_service
        .create_notification(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(notification)))
}

// GET /api/notifications — as notificações do usuário autenticado
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    params(NotificationListParams),
    responses(
        (status = 200, description = "Notificações do usuário", body = Vec<Notification>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_my_notifications(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(params): Query<NotificationListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let notifications = app_state
        .notification_service
        .list_for_recipient(
            user.0.id,
            params.status,
            effective_limit(params.limit, 50, 200),
            effective_offset(params.offset),
        )
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(notifications)))
}

// GET /api/notifications/unread-count
#[utoipa::path(
    get,
    path = "/api/notifications/unread-count",
    tag = "Notifications",
    responses(
        (status = 200, description = "Contador do sino", body = UnreadCount)
    ),
    security(("api_jwt" = []))
)]
pub async fn unread_count(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let unread = app_state
        .notification_service
        .count_unread(user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(UnreadCount { unread })))
}

// POST /api/notifications/{id}/mark-read
#[utoipa::path(
    post,
    path = "/api/notifications/{id}/mark-read",
    tag = "Notifications",
    responses(
        (status = 200, description = "Notificação lida", body = Notification)
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_read(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let notification = app_state
        .notification_service
        .mark_read(id, user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(notification)))
}

// POST /api/notifications/{id}/mark-delivered — recibo de entrega do provedor
#[utoipa::path(
    post,
    path = "/api/notifications/{id}/mark-delivered",
    tag = "Notifications",
    responses(
        (status = 200, description = "Entrega confirmada", body = Notification)
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_delivered(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let notification = app_state
        .notification_service
        .mark_delivered(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(notification)))
}

// POST /api/notifications/{id}/retry
#[utoipa::path(
    post,
    path = "/api/notifications/{id}/retry",
    tag = "Notifications",
    responses(
        (status = 200, description = "Reenvio enfileirado", body = Notification),
        (status = 409, description = "Não falhou ou esgotou as tentativas")
    ),
    security(("api_jwt" = []))
)]
pub async fn retry_notification(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let notification = app_state
        .notification_service
        .retry(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(notification)))
}

// GET /api/notifications/{id}/logs
#[utoipa::path(
    get,
    path = "/api/notifications/{id}/logs",
    tag = "Notifications",
    responses(
        (status = 200, description = "Log de entrega", body = Vec<NotificationLog>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_logs(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let logs = app_state
        .notification_service
        .list_logs(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(logs)))
}

// =============================================================================
//  PRÉFÉRENCES
// =============================================================================

// GET /api/notifications/preferences
#[utoipa::path(
    get,
    path = "/api/notifications/preferences",
    tag = "Notifications",
    responses(
        (status = 200, description = "Preferências do usuário", body = NotificationPreference)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_preferences(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let preferences = app_state
        .notification_service
        .get_preferences(user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(preferences)))
}

// PUT /api/notifications/preferences
#[utoipa::path(
    put,
    path = "/api/notifications/preferences",
    tag = "Notifications",
    request_body = UpdatePreferencePayload,
    responses(
        (status = 200, description = "Preferências atualizadas", body = NotificationPreference)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_preferences(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<UpdatePreferencePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let preferences = app_state
        .notification_service
        .update_preferences(user.0.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(preferences)))
}
