// src/models/notifications.rs

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "notification_channel", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Email,
    Sms,
    Push,
    InApp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "notification_trigger", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationTrigger {
    InterventionScheduled,
    InterventionStarted,
    InterventionCompleted,
    InspectionScheduled,
    InspectionCompleted,
    ReportGenerated,
    OverdueIntervention,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "notification_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Pending,
    Sent,
    Delivered,
    Read,
    Failed,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Pending => "pending",
            NotificationStatus::Sent => "sent",
            NotificationStatus::Delivered => "delivered",
            NotificationStatus::Read => "read",
            NotificationStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "notification_log_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationLogAction {
    Sent,
    Delivered,
    Read,
    Failed,
    Retry,
    Skipped,
}

// --- MODELOS ---

// Template com placeholders no formato {{nome}} substituídos no envio
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationTemplate {
    pub id: Uuid,

    #[schema(example = "Intervention terminée")]
    pub name: String,
    pub channel: NotificationChannel,
    pub trigger: NotificationTrigger,
    pub is_active: bool,

    #[schema(example = "Intervention {{reference}} terminée")]
    pub subject: String,
    #[schema(example = "L'intervention {{reference}} chez {{client_name}} est terminée.")]
    pub message: String,

    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,

    pub title: String,
    pub message: String,
    pub channel: NotificationChannel,
    pub status: NotificationStatus,

    pub recipient: Uuid,
    pub template_id: Option<Uuid>,

    // Objeto de negócio que originou a notificação
    #[schema(example = "intervention")]
    pub related_object_type: Option<String>,
    pub related_object_id: Option<Uuid>,

    pub sent_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub read_at: Option<DateTime<Utc>>,

    pub error_message: Option<String>,
    pub retry_count: i32,

    pub data: Value,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreference {
    pub id: Uuid,
    pub user_id: Uuid,

    pub email_enabled: bool,
    pub sms_enabled: bool,
    pub push_enabled: bool,
    pub in_app_enabled: bool,

    // Janela silenciosa: apenas registrada no log, o envio não é adiado
    pub quiet_hours_start: Option<NaiveTime>,
    pub quiet_hours_end: Option<NaiveTime>,
    #[schema(example = "Europe/Paris")]
    pub timezone: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationLog {
    pub id: Uuid,
    pub notification_id: Uuid,

    pub action: NotificationLogAction,
    pub details: Option<String>,

    pub created_at: DateTime<Utc>,
}

// Resumo para o sino do app
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    pub unread: i64,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationTemplatePayload {
    #[validate(length(min = 2, message = "required"))]
    pub name: String,
    pub channel: NotificationChannel,
    pub trigger: NotificationTrigger,

    #[validate(length(min = 1, message = "required"))]
    pub subject: String,
    #[validate(length(min = 1, message = "required"))]
    pub message: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationPayload {
    pub recipient: Uuid,
    pub channel: Option<NotificationChannel>,

    // Ou um template + contexto, ou título/mensagem diretos
    pub template_id: Option<Uuid>,
    #[schema(example = json!({"reference": "INT-2026-014", "client_name": "Les Tilleuls"}))]
    pub context: Option<Value>,

    pub title: Option<String>,
    pub message: Option<String>,

    pub related_object_type: Option<String>,
    pub related_object_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencePayload {
    pub email_enabled: Option<bool>,
    pub sms_enabled: Option<bool>,
    pub push_enabled: Option<bool>,
    pub in_app_enabled: Option<bool>,
    pub quiet_hours_start: Option<NaiveTime>,
    pub quiet_hours_end: Option<NaiveTime>,
    pub timezone: Option<String>,
}
