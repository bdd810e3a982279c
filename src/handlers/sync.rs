// src/handlers/sync.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    common::{error::ApiError, pagination::effective_limit},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::sync::{SyncConflict, SyncEntity, SyncItem, SyncPushResponse},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncPushPayload {
    pub items: Vec<SyncItem>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SyncPullParams {
    pub entity: SyncEntity,
    pub since: DateTime<Utc>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ConflictListParams {
    pub mine: Option<bool>,
    pub limit: Option<i64>,
}

// POST /api/sync/push — lote de mutações feitas offline
#[utoipa::path(
    post,
    path = "/api/sync/push",
    tag = "Sync",
    request_body = SyncPushPayload,
    responses(
        (status = 200, description = "Resultado item a item", body = SyncPushResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn push(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<SyncPushPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let response = app_state
        .sync_service
        .push(&app_state.db_pool, user.0.id, &payload.items)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(response)))
}

// GET /api/sync/pull — linhas alteradas desde um instante
#[utoipa::path(
    get,
    path = "/api/sync/pull",
    tag = "Sync",
    params(SyncPullParams),
    responses(
        (status = 200, description = "Linhas alteradas desde 'since'")
    ),
    security(("api_jwt" = []))
)]
pub async fn pull(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(params): Query<SyncPullParams>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = app_state
        .sync_service
        .pull(
            params.entity,
            params.since,
            effective_limit(params.limit, 100, 500),
        )
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(rows)))
}

// GET /api/sync/conflicts
#[utoipa::path(
    get,
    path = "/api/sync/conflicts",
    tag = "Sync",
    params(ConflictListParams),
    responses(
        (status = 200, description = "Conflitos registrados", body = Vec<SyncConflict>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_conflicts(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(params): Query<ConflictListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let user_filter = if params.mine.unwrap_or(false) {
        Some(user.0.id)
    } else {
        None
    };

    let conflicts = app_state
        .sync_service
        .list_conflicts(user_filter, effective_limit(params.limit, 100, 500))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(conflicts)))
}
