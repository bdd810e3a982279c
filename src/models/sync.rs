// src/models/sync.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sync_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sync_entity", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SyncEntity {
    Client,
    Intervention,
    Inspection,
}

// Resultado por item do push
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    Applied,
    Conflict,
    Missing,
    // Mutação que o servidor não sabe aplicar (ex: create de um client offline)
    Unsupported,
}

// --- PAYLOADS / RESPOSTAS ---

// Uma mutação feita offline pelo app móvel
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncItem {
    pub action: SyncAction,
    pub entity: SyncEntity,
    pub object_id: Uuid,
    // Campos alterados, no formato da entidade
    pub payload: Value,
    // Quando o app gravou a mudança localmente
    pub client_modified_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncItemResult {
    pub object_id: Uuid,
    pub outcome: SyncOutcome,
    // Em caso de conflito, a versão do servidor que prevaleceu
    pub server_version: Option<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncPushResponse {
    pub applied: usize,
    pub conflicts: usize,
    pub missing: usize,
    pub results: Vec<SyncItemResult>,
}

// Conflito persistido para inspeção posterior
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncConflict {
    pub id: Uuid,

    pub entity: SyncEntity,
    pub object_id: Uuid,
    pub user_id: Uuid,

    pub client_payload: Value,
    pub server_payload: Value,

    pub client_modified_at: DateTime<Utc>,
    pub server_modified_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
}
