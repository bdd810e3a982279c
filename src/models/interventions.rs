// src/models/interventions.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "intervention_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InterventionType {
    Inspection,
    Repair,
    Maintenance,
    Emergency,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "intervention_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InterventionStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    Postponed,
}

impl InterventionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterventionStatus::Scheduled => "scheduled",
            InterventionStatus::InProgress => "in_progress",
            InterventionStatus::Completed => "completed",
            InterventionStatus::Cancelled => "cancelled",
            InterventionStatus::Postponed => "postponed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "intervention_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InterventionPriority {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "intervention_document_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InterventionDocumentType {
    Photo,
    Video,
    Audio,
    Report,
    Invoice,
    Other,
}

// --- ORDEM DE SERVIÇO ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Intervention {
    pub id: Uuid,

    // Referência única gerada na criação (INT-2026-001)
    #[schema(example = "INT-2026-014")]
    pub reference: String,

    #[schema(example = "Recherche de fuite - colonne d'eau froide")]
    pub title: String,
    pub description: String,
    pub intervention_type: InterventionType,
    pub status: InterventionStatus,
    pub priority: InterventionPriority,

    pub client_id: Uuid,
    pub site_id: Option<Uuid>,

    // Planejamento
    pub scheduled_date: DateTime<Utc>,
    pub estimated_duration_minutes: Option<i32>,
    pub actual_start_date: Option<DateTime<Utc>>,
    pub actual_end_date: Option<DateTime<Utc>>,

    pub assigned_technician: Option<Uuid>,
    pub created_by: Option<Uuid>,

    // Localização
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,

    pub notes: Option<String>,
    pub materials_needed: Option<String>,
    pub special_instructions: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InterventionTask {
    pub id: Uuid,
    pub intervention_id: Uuid,

    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    #[schema(example = 1)]
    pub position: i32,

    pub assigned_to: Option<Uuid>,

    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InterventionDocument {
    pub id: Uuid,
    pub intervention_id: Uuid,
    pub task_id: Option<Uuid>,

    pub title: String,
    pub document_type: InterventionDocumentType,
    pub file_path: String,
    pub description: Option<String>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub uploaded_by: Option<Uuid>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InterventionNote {
    pub id: Uuid,
    pub intervention_id: Uuid,
    pub task_id: Option<Uuid>,

    pub title: String,
    pub content: String,
    pub is_internal: bool,

    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Contagens para o painel de planejamento
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InterventionStats {
    pub total: i64,
    pub scheduled: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub overdue: i64,
    pub today: i64,
    pub this_week: i64,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInterventionPayload {
    #[validate(length(min = 1, message = "required"))]
    pub title: String,
    #[validate(length(min = 1, message = "required"))]
    pub description: String,
    pub intervention_type: InterventionType,
    pub priority: Option<InterventionPriority>,

    pub client_id: Uuid,
    pub site_id: Option<Uuid>,

    pub scheduled_date: DateTime<Utc>,
    #[validate(range(min = 1, message = "invalid_duration"))]
    pub estimated_duration_minutes: Option<i32>,

    pub assigned_technician: Option<Uuid>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,

    pub notes: Option<String>,
    pub materials_needed: Option<String>,
    pub special_instructions: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInterventionPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub intervention_type: Option<InterventionType>,
    pub priority: Option<InterventionPriority>,

    pub site_id: Option<Uuid>,
    pub scheduled_date: Option<DateTime<Utc>>,
    #[validate(range(min = 1, message = "invalid_duration"))]
    pub estimated_duration_minutes: Option<i32>,
    pub assigned_technician: Option<Uuid>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,

    pub notes: Option<String>,
    pub materials_needed: Option<String>,
    pub special_instructions: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    #[validate(length(min = 1, message = "required"))]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub position: i32,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInterventionDocumentPayload {
    #[validate(length(min = 1, message = "required"))]
    pub title: String,
    pub document_type: InterventionDocumentType,
    #[validate(length(min = 1, message = "required"))]
    pub file_path: String,
    pub description: Option<String>,
    pub task_id: Option<Uuid>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotePayload {
    #[validate(length(min = 1, message = "required"))]
    pub title: String,
    #[validate(length(min = 1, message = "required"))]
    pub content: String,
    #[serde(default = "default_true")]
    pub is_internal: bool,
    pub task_id: Option<Uuid>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostponePayload {
    pub new_scheduled_date: DateTime<Utc>,
    pub reason: Option<String>,
}
