// src/models/inspections.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "inspection_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InspectionStatus {
    Draft,
    InProgress,
    Completed,
    Validated,
    Rejected,
}

impl InspectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InspectionStatus::Draft => "draft",
            InspectionStatus::InProgress => "in_progress",
            InspectionStatus::Completed => "completed",
            InspectionStatus::Validated => "validated",
            InspectionStatus::Rejected => "rejected",
        }
    }
}

// Tipos de campo do formulário dinâmico
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "field_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Boolean,
    Select,
    Multiselect,
}

// --- MODELOS ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InspectionTemplate {
    pub id: Uuid,

    #[schema(example = "Contrôle annuel chaufferie")]
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub id: Uuid,

    pub client_id: Uuid,
    pub site_id: Option<Uuid>,
    pub intervention_id: Option<Uuid>,
    pub template_id: Option<Uuid>,

    #[schema(example = "Inspection réseau eau chaude sanitaire")]
    pub title: String,
    pub description: Option<String>,
    pub status: InspectionStatus,

    pub scheduled_date: DateTime<Utc>,
    pub completed_date: Option<DateTime<Utc>>,

    pub inspector: Option<Uuid>,

    // Dados do formulário preenchidos em campo ({ "pressure_bar": 3.2, ... })
    pub form_data: Value,

    // Preenchido quando a inspeção concluída é rejeitada
    pub rejection_reason: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Campo tipado do formulário de uma inspeção (o "molde" de cada resposta)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InspectionItem {
    pub id: Uuid,
    pub inspection_id: Uuid,

    #[schema(example = "Pression du réseau")]
    pub name: String,
    #[schema(example = "pressure_bar")]
    pub key_name: String,
    pub description: Option<String>,

    pub field_type: FieldType,

    // Opções para Select/Multiselect (ex: ["conforme", "non conforme"])
    pub options: Option<Value>,
    pub is_required: bool,

    // Valor coletado em campo
    pub value: Option<Value>,
    pub is_checked: bool,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InspectionMedia {
    pub id: Uuid,
    pub inspection_id: Uuid,

    pub title: String,
    pub description: Option<String>,
    pub file_path: String,

    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InspectionSignature {
    pub id: Uuid,
    pub inspection_id: Uuid,

    #[schema(example = "Mme Dubois (gardienne)")]
    pub signer_name: String,
    pub signature_path: String,
    pub signed_at: DateTime<Utc>,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplatePayload {
    #[validate(length(min = 2, message = "required"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInspectionPayload {
    pub client_id: Uuid,
    pub site_id: Option<Uuid>,
    pub intervention_id: Option<Uuid>,
    pub template_id: Option<Uuid>,

    #[validate(length(min = 1, message = "required"))]
    pub title: String,
    pub description: Option<String>,

    pub scheduled_date: DateTime<Utc>,
    pub inspector: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInspectionPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub site_id: Option<Uuid>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub inspector: Option<Uuid>,
    // Substitui o form_data inteiro (o app móvel envia o documento completo)
    pub form_data: Option<Value>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Pression du réseau")]
    pub name: String,
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "pressure_bar")]
    pub key_name: String,
    pub description: Option<String>,

    pub field_type: FieldType,
    #[schema(example = json!(["conforme", "non conforme"]))]
    pub options: Option<Value>,
    #[serde(default)]
    pub is_required: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemValuePayload {
    pub value: Option<Value>,
    #[serde(default)]
    pub is_checked: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMediaPayload {
    #[validate(length(min = 1, message = "required"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub file_path: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSignaturePayload {
    #[validate(length(min = 1, message = "required"))]
    pub signer_name: String,
    #[validate(length(min = 1, message = "required"))]
    pub signature_path: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectPayload {
    pub reason: String,
}
