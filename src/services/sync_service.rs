// src/services/sync_service.rs

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{InspectionRepository, SyncRepository},
    models::{
        inspections::CreateInspectionPayload,
        sync::{
            SyncAction, SyncConflict, SyncEntity, SyncItem, SyncItemResult, SyncOutcome,
            SyncPushResponse,
        },
    },
};

// A decisão tomada para um item do push, antes de tocar no banco.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDecision {
    // A mudança do app prevalece (update/delete)
    Apply,
    // O objeto não existe e o app o criou offline
    CreateNew,
    // A versão do servidor é mais recente: servidor vence
    Conflict,
    // Update/delete de um objeto que não existe (mais)
    Missing,
    // Criação offline de uma entidade que só nasce no servidor
    Unsupported,
}

// Resolução last-write-wins por timestamp. O servidor vence quando a sua
// versão é estritamente mais recente que a gravação do app.
pub fn resolve(
    action: SyncAction,
    entity: SyncEntity,
    server_modified_at: Option<DateTime<Utc>>,
    client_modified_at: DateTime<Utc>,
) -> SyncDecision {
    match (action, server_modified_at) {
        (SyncAction::Create, None) => {
            // Só inspeções nascem em campo; clients/interventions vêm do back-office
            if entity == SyncEntity::Inspection {
                SyncDecision::CreateNew
            } else {
                SyncDecision::Unsupported
            }
        }
        // Create de algo que já existe é tratado como update
        (SyncAction::Create, Some(server_at))
        | (SyncAction::Update, Some(server_at))
        | (SyncAction::Delete, Some(server_at)) => {
            if server_at > client_modified_at {
                SyncDecision::Conflict
            } else {
                SyncDecision::Apply
            }
        }
        (SyncAction::Update, None) | (SyncAction::Delete, None) => SyncDecision::Missing,
    }
}

#[derive(Clone)]
pub struct SyncService {
    repo: SyncRepository,
    inspection_repo: InspectionRepository,
}

impl SyncService {
    pub fn new(repo: SyncRepository, inspection_repo: InspectionRepository) -> Self {
        Self {
            repo,
            inspection_repo,
        }
    }

    // Processa o lote de mutações offline. Cada item tem a sua própria
    // transação: um conflito não desfaz os demais.
    pub async fn push(
        &self,
        pool: &PgPool,
        user_id: Uuid,
        items: &[SyncItem],
    ) -> Result<SyncPushResponse, AppError> {
        let mut results = Vec::with_capacity(items.len());

        for item in items {
            let result = self.process_item(pool, user_id, item).await?;
            results.push(result);
        }

        let applied = results
            .iter()
            .filter(|r| r.outcome == SyncOutcome::Applied)
            .count();
        let conflicts = results
            .iter()
            .filter(|r| r.outcome == SyncOutcome::Conflict)
            .count();
        let missing = results
            .iter()
            .filter(|r| r.outcome == SyncOutcome::Missing)
            .count();

        tracing::info!(
            "Sincronização do usuário {}: {} aplicadas, {} conflitos, {} ausentes",
            user_id,
            applied,
            conflicts,
            missing
        );

        Ok(SyncPushResponse {
            applied,
            conflicts,
            missing,
            results,
        })
    }

    async fn process_item(
        &self,
        pool: &PgPool,
        user_id: Uuid,
        item: &SyncItem,
    ) -> Result<SyncItemResult, AppError> {
        let mut tx = pool.begin().await?;

        let server = self
            .repo
            .fetch_server_version(&mut *tx, item.entity, item.object_id)
            .await?;

        let decision = resolve(
            item.action,
            item.entity,
            server.as_ref().map(|s| s.updated_at),
            item.client_modified_at,
        );

        let result = match decision {
            SyncDecision::Apply => {
                match item.action {
                    SyncAction::Delete => {
                        self.repo
                            .delete_object(&mut *tx, item.entity, item.object_id)
                            .await?;
                    }
                    _ => {
                        self.repo
                            .apply_patch(&mut *tx, item.entity, item.object_id, &item.payload)
                            .await?;
                    }
                }

                SyncItemResult {
                    object_id: item.object_id,
                    outcome: SyncOutcome::Applied,
                    server_version: None,
                }
            }

            SyncDecision::CreateNew => {
                match serde_json::from_value::<CreateInspectionPayload>(item.payload.clone()) {
                    Ok(payload) => {
                        self.inspection_repo
                            .create_inspection(&mut *tx, &payload)
                            .await?;

                        SyncItemResult {
                            object_id: item.object_id,
                            outcome: SyncOutcome::Applied,
                            server_version: None,
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Payload de criação offline inválido para {}: {}",
                            item.object_id,
                            e
                        );
                        SyncItemResult {
                            object_id: item.object_id,
                            outcome: SyncOutcome::Unsupported,
                            server_version: None,
                        }
                    }
                }
            }

            SyncDecision::Conflict => {
                // Servidor vence; as duas versões ficam registradas
                let server = server.expect("conflito implica versão do servidor");

                self.repo
                    .record_conflict(
                        &mut *tx,
                        item.entity,
                        item.object_id,
                        user_id,
                        &item.payload,
                        &server.row,
                        item.client_modified_at,
                        server.updated_at,
                    )
                    .await?;

                SyncItemResult {
                    object_id: item.object_id,
                    outcome: SyncOutcome::Conflict,
                    server_version: Some(server.row),
                }
            }

            SyncDecision::Missing => SyncItemResult {
                object_id: item.object_id,
                outcome: SyncOutcome::Missing,
                server_version: None,
            },

            SyncDecision::Unsupported => SyncItemResult {
                object_id: item.object_id,
                outcome: SyncOutcome::Unsupported,
                server_version: None,
            },
        };

        tx.commit().await?;

        Ok(result)
    }

    // Pull incremental: linhas alteradas desde o instante dado
    pub async fn pull(
        &self,
        entity: SyncEntity,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Value>, AppError> {
        self.repo.list_changed_since(entity, since, limit).await
    }

    pub async fn list_conflicts(
        &self,
        user_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<SyncConflict>, AppError> {
        self.repo.list_conflicts(user_id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 14, hour, 0, 0).unwrap()
    }

    #[test]
    fn update_of_missing_object_is_missing() {
        let decision = resolve(SyncAction::Update, SyncEntity::Inspection, None, at(10));
        assert_eq!(decision, SyncDecision::Missing);
    }

    #[test]
    fn newer_server_version_wins() {
        let decision = resolve(
            SyncAction::Update,
            SyncEntity::Intervention,
            Some(at(12)),
            at(10),
        );
        assert_eq!(decision, SyncDecision::Conflict);
    }

    #[test]
    fn newer_client_change_applies() {
        let decision = resolve(
            SyncAction::Update,
            SyncEntity::Intervention,
            Some(at(8)),
            at(10),
        );
        assert_eq!(decision, SyncDecision::Apply);
    }

    #[test]
    fn equal_timestamps_apply_client_change() {
        let decision = resolve(
            SyncAction::Update,
            SyncEntity::Client,
            Some(at(10)),
            at(10),
        );
        assert_eq!(decision, SyncDecision::Apply);
    }

    #[test]
    fn delete_follows_same_timestamp_rule() {
        assert_eq!(
            resolve(SyncAction::Delete, SyncEntity::Inspection, Some(at(12)), at(10)),
            SyncDecision::Conflict
        );
        assert_eq!(
            resolve(SyncAction::Delete, SyncEntity::Inspection, None, at(10)),
            SyncDecision::Missing
        );
    }

    #[test]
    fn offline_create_only_for_inspections() {
        assert_eq!(
            resolve(SyncAction::Create, SyncEntity::Inspection, None, at(10)),
            SyncDecision::CreateNew
        );
        assert_eq!(
            resolve(SyncAction::Create, SyncEntity::Client, None, at(10)),
            SyncDecision::Unsupported
        );
    }

    #[test]
    fn create_of_existing_object_degrades_to_update() {
        assert_eq!(
            resolve(SyncAction::Create, SyncEntity::Inspection, Some(at(8)), at(10)),
            SyncDecision::Apply
        );
    }
}
