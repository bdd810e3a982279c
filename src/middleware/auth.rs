// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{common::error::ApiError, config::AppState, models::auth::User};

// Middleware que protege as rotas: valida o Bearer token e injeta o
// usuário autenticado nos extensions da requisição.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: axum::extract::Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(TypedHeader(bearer)) = bearer else {
        return Err(unauthorized());
    };

    let user = app_state
        .auth_service
        .validate_token(bearer.token())
        .await
        .map_err(|_| unauthorized())?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn unauthorized() -> ApiError {
    ApiError::new(
        StatusCode::UNAUTHORIZED,
        "Invalid or missing authentication token.",
    )
}

// Extrator para obter o usuário autenticado diretamente nos handlers.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or_else(unauthorized)
    }
}
