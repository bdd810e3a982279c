// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use thiserror::Error;

use crate::middleware::i18n::Locale;

// Nosso tipo de erro de domínio, com `thiserror` para melhor ergonomia.
// Os handlers convertem para `ApiError` (que conhece HTTP) via `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Validação dinâmica do form_data das inspeções: chave do campo -> código do erro
    #[error("Erro de validação do formulário")]
    FormValidationError(HashMap<String, String>),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    // O nome da entidade vai na mensagem ("cliente", "intervenção", ...)
    #[error("Recurso não encontrado: {0}")]
    NotFound(&'static str),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    // Guarda de workflow: a ação não é permitida no status atual.
    #[error("Ação '{action}' não permitida no status '{current}'")]
    InvalidTransition {
        entity: &'static str,
        current: String,
        action: &'static str,
    },

    #[error("Limite de tentativas de envio atingido")]
    RetryLimitReached,

    #[error("Coordenadas inválidas: lat={0}, lon={1}")]
    InvalidCoordinates(f64, f64),

    #[error("Serviço de geocodificação indisponível")]
    GeocodingUnavailable,

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O erro que atravessa a fronteira HTTP. Já sabe status e mensagem final.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => Json(json!({ "error": self.message, "details": details })),
            None => Json(json!({ "error": self.message })),
        };
        (self.status, body).into_response()
    }
}

impl AppError {
    // Traduz o erro de domínio para HTTP, localizando a mensagem pelo
    // Accept-Language do request ("fr" para os técnicos em campo, "en" padrão).
    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let fr = locale.0 == "fr";

        match self {
            AppError::ValidationError(errors) => {
                let mut details = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    message: pick(fr, "Un ou plusieurs champs sont invalides.", "One or more fields are invalid."),
                    details: Some(json!(details)),
                }
            }

            AppError::FormValidationError(errors) => ApiError {
                status: StatusCode::BAD_REQUEST,
                message: pick(fr, "Le formulaire contient des champs invalides.", "The form contains invalid fields."),
                details: Some(json!(errors)),
            },

            AppError::EmailAlreadyExists => ApiError::new(
                StatusCode::CONFLICT,
                pick(fr, "Cet e-mail est déjà utilisé.", "This e-mail is already in use."),
            ),
            AppError::InvalidCredentials => ApiError::new(
                StatusCode::UNAUTHORIZED,
                pick(fr, "E-mail ou mot de passe invalide.", "Invalid e-mail or password."),
            ),
            AppError::InvalidToken => ApiError::new(
                StatusCode::UNAUTHORIZED,
                pick(fr, "Jeton d'authentification invalide ou absent.", "Invalid or missing authentication token."),
            ),
            AppError::UserNotFound => ApiError::new(
                StatusCode::NOT_FOUND,
                pick(fr, "Utilisateur introuvable.", "User not found."),
            ),

            AppError::NotFound(entity) => ApiError::new(
                StatusCode::NOT_FOUND,
                if fr {
                    format!("Ressource introuvable: {}.", entity)
                } else {
                    format!("Resource not found: {}.", entity)
                },
            ),

            AppError::UniqueConstraintViolation(what) => ApiError::new(
                StatusCode::CONFLICT,
                if fr {
                    format!("Valeur déjà enregistrée: {}.", what)
                } else {
                    format!("Value already registered: {}.", what)
                },
            ),

            AppError::InvalidTransition { entity, current, action } => ApiError::new(
                StatusCode::CONFLICT,
                if fr {
                    format!("Action '{}' impossible: {} au statut '{}'.", action, entity, current)
                } else {
                    format!("Action '{}' not allowed: {} is in status '{}'.", action, entity, current)
                },
            ),

            AppError::RetryLimitReached => ApiError::new(
                StatusCode::CONFLICT,
                pick(fr, "Nombre maximal de tentatives d'envoi atteint.", "Maximum number of send attempts reached."),
            ),

            AppError::InvalidCoordinates(lat, lon) => ApiError::new(
                StatusCode::BAD_REQUEST,
                if fr {
                    format!("Coordonnées invalides: lat={}, lon={}.", lat, lon)
                } else {
                    format!("Invalid coordinates: lat={}, lon={}.", lat, lon)
                },
            ),

            AppError::GeocodingUnavailable => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                pick(fr, "Service de géocodage indisponible.", "Geocoding service unavailable."),
            ),

            // Todos os outros (DatabaseError, InternalServerError, Bcrypt, JWT...)
            // viram 500. O `tracing` loga a mensagem detalhada do `thiserror`.
            other => {
                tracing::error!("Erro interno do servidor: {}", other);
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    pick(fr, "Une erreur inattendue est survenue.", "An unexpected error occurred."),
                )
            }
        }
    }
}

fn pick(fr: bool, msg_fr: &str, msg_en: &str) -> String {
    if fr { msg_fr.to_string() } else { msg_en.to_string() }
}

// Monta um erro de validação de um único campo, com código em vez de frase.
pub fn field_error(field: &str, code: &'static str) -> AppError {
    let mut errors = validator::ValidationErrors::new();
    let mut err = validator::ValidationError::new(code);
    err.message = Some(code.into());

    // Leak seguro para o nome estático exigido pelo validator
    let static_field: &'static str = Box::leak(field.to_string().into_boxed_str());
    errors.add(static_field, err);

    AppError::ValidationError(errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locale(lang: &str) -> Locale {
        Locale(lang.to_string())
    }

    #[test]
    fn invalid_transition_is_conflict() {
        let err = AppError::InvalidTransition {
            entity: "intervention",
            current: "completed".to_string(),
            action: "start",
        };
        let api = err.to_api_error(&locale("en"));
        assert_eq!(api.status, StatusCode::CONFLICT);
        assert!(api.message.contains("completed"));
        assert!(api.message.contains("start"));
    }

    #[test]
    fn not_found_localizes_to_french() {
        let api = AppError::NotFound("client").to_api_error(&locale("fr"));
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert!(api.message.contains("introuvable"));
    }

    #[test]
    fn form_validation_carries_field_codes() {
        let mut fields = HashMap::new();
        fields.insert("flow_rate".to_string(), "invalid_number".to_string());
        let api = AppError::FormValidationError(fields).to_api_error(&locale("en"));
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("details");
        assert_eq!(details["flow_rate"], "invalid_number");
    }

    #[test]
    fn database_errors_become_opaque_500() {
        let api = AppError::DatabaseError(sqlx::Error::PoolClosed).to_api_error(&locale("en"));
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.message.contains("Pool"));
    }
}
