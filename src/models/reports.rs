// src/models/reports.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "report_template_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportTemplateType {
    Inspection,
    Intervention,
    Summary,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "report_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Preliminary,
    Final,
    FollowUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "report_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Draft,
    PendingReview,
    Approved,
    Rejected,
    Archived,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Draft => "draft",
            ReportStatus::PendingReview => "pending_review",
            ReportStatus::Approved => "approved",
            ReportStatus::Rejected => "rejected",
            ReportStatus::Archived => "archived",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "report_export_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportExportStatus {
    Pending,
    Completed,
    Failed,
}

// --- MODELOS ---

// Template de relatório: a configuração das seções é um JSON dinâmico
// (lista de seções, cada uma com seus campos).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportTemplate {
    pub id: Uuid,

    #[schema(example = "Rapport final de recherche de fuite")]
    pub name: String,
    pub description: Option<String>,
    pub template_type: ReportTemplateType,
    pub is_active: bool,

    #[schema(example = json!([{"key": "findings", "title": "Constatations"}]))]
    pub sections: Value,

    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InterventionReport {
    pub id: Uuid,

    pub intervention_id: Uuid,
    pub template_id: Option<Uuid>,

    pub report_type: ReportType,
    pub status: ReportStatus,

    #[schema(example = "Rapport final - INT-2026-014")]
    pub title: String,
    pub summary: Option<String>,
    pub recommendations: Option<String>,
    pub next_steps: Option<String>,

    // Dados das seções, chaveados pela key do template
    pub content: Value,

    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: Option<String>,

    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Trilha de auditoria do workflow de aprovação
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportHistory {
    pub id: Uuid,
    pub report_id: Uuid,

    #[schema(example = "submitted")]
    pub action: String,
    pub detail: Option<String>,

    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportExport {
    pub id: Uuid,
    pub report_id: Uuid,

    #[schema(example = "pdf")]
    pub format: String,
    pub status: ReportExportStatus,
    pub file_size: Option<i32>,
    pub error_message: Option<String>,

    pub generated_by: Option<Uuid>,
    pub generated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportTemplatePayload {
    #[validate(length(min = 2, message = "required"))]
    pub name: String,
    pub description: Option<String>,
    pub template_type: ReportTemplateType,
    #[schema(example = json!([{"key": "findings", "title": "Constatations"}]))]
    pub sections: Value,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportPayload {
    pub intervention_id: Uuid,
    pub template_id: Option<Uuid>,
    pub report_type: Option<ReportType>,

    #[validate(length(min = 1, message = "required"))]
    pub title: String,
    pub summary: Option<String>,
    pub recommendations: Option<String>,
    pub next_steps: Option<String>,

    // Conteúdo inicial das seções; mesclado com o esqueleto do template
    pub content: Option<Value>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReportPayload {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub recommendations: Option<String>,
    pub next_steps: Option<String>,
    pub content: Option<Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPayload {
    pub notes: Option<String>,
}
