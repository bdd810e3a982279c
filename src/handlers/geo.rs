// src/handlers/geo.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::geo::{
        DistanceResult, GeoBounds, GeocodeResult, GeoPoint, NearbyEntry, NearbyKind,
        ReverseGeocodeResult,
    },
    services::geo_service,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct GeocodeParams {
    #[param(example = "12 Rue de la Paix, Paris")]
    pub address: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReverseParams {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct NearbyParams {
    pub kind: NearbyKind,
    pub lat: f64,
    pub lon: f64,
    // Raio em metros
    pub radius: f64,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DistancePayload {
    pub from: GeoPoint,
    pub to: GeoPoint,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoundsPayload {
    pub points: Vec<GeoPoint>,
}

// GET /api/geo/geocode
#[utoipa::path(
    get,
    path = "/api/geo/geocode",
    tag = "Geo",
    params(GeocodeParams),
    responses(
        (status = 200, description = "Coordenadas do endereço", body = GeocodeResult),
        (status = 404, description = "Endereço não localizado"),
        (status = 503, description = "Serviço externo indisponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn geocode(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(params): Query<GeocodeParams>,
) -> Result<impl IntoResponse, ApiError> {
    let result = app_state
        .geo_service
        .geocode(&params.address)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(result)))
}

// GET /api/geo/reverse
#[utoipa::path(
    get,
    path = "/api/geo/reverse",
    tag = "Geo",
    params(ReverseParams),
    responses(
        (status = 200, description = "Endereço das coordenadas", body = ReverseGeocodeResult),
        (status = 400, description = "Coordenadas inválidas"),
        (status = 503, description = "Serviço externo indisponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn reverse_geocode(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(params): Query<ReverseParams>,
) -> Result<impl IntoResponse, ApiError> {
    let result = app_state
        .geo_service
        .reverse_geocode(params.lat, params.lon)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(result)))
}

// POST /api/geo/distance
#[utoipa::path(
    post,
    path = "/api/geo/distance",
    tag = "Geo",
    request_body = DistancePayload,
    responses(
        (status = 200, description = "Distância em metros", body = DistanceResult),
        (status = 400, description = "Coordenadas inválidas")
    ),
    security(("api_jwt" = []))
)]
pub async fn distance(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<DistancePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let meters = app_state
        .geo_service
        .distance(payload.from, payload.to)
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(DistanceResult { meters })))
}

// GET /api/geo/nearby
#[utoipa::path(
    get,
    path = "/api/geo/nearby",
    tag = "Geo",
    params(NearbyParams),
    responses(
        (status = 200, description = "Clientes/sites no raio, por distância", body = Vec<NearbyEntry>),
        (status = 400, description = "Coordenadas ou raio inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn nearby(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(params): Query<NearbyParams>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = app_state
        .geo_service
        .nearby(
            params.kind,
            params.lat,
            params.lon,
            params.radius,
            params.limit.unwrap_or(50).clamp(1, 200),
        )
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(entries)))
}

// POST /api/geo/bounds
#[utoipa::path(
    post,
    path = "/api/geo/bounds",
    tag = "Geo",
    request_body = BoundsPayload,
    responses(
        (status = 200, description = "Caixa envolvente dos pontos (null sem pontos)", body = GeoBounds)
    ),
    security(("api_jwt" = []))
)]
pub async fn bounds(
    Json(payload): Json<BoundsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let result = geo_service::bounds(&payload.points);

    Ok((StatusCode::OK, Json(result)))
}
