// src/db/sync_repo.rs

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres, Row};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sync::{SyncConflict, SyncEntity},
};

// Versão de uma linha do ponto de vista da sincronização:
// o documento completo + o updated_at do servidor.
pub struct ServerVersion {
    pub row: Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SyncRepository {
    pool: PgPool,
}

impl SyncRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn table(entity: SyncEntity) -> &'static str {
        match entity {
            SyncEntity::Client => "clients",
            SyncEntity::Intervention => "interventions",
            SyncEntity::Inspection => "inspections",
        }
    }

    // Carrega a versão atual do servidor (linha inteira como JSON).
    pub async fn fetch_server_version<'e, E>(
        &self,
        executor: E,
        entity: SyncEntity,
        object_id: Uuid,
    ) -> Result<Option<ServerVersion>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT row_to_json(t)::jsonb AS row, t.updated_at FROM {} t WHERE t.id = $1",
            Self::table(entity)
        );

        let row = sqlx::query(&sql)
            .bind(object_id)
            .fetch_optional(executor)
            .await?;

        match row {
            Some(row) => Ok(Some(ServerVersion {
                row: row.try_get("row").map_err(AppError::from)?,
                updated_at: row.try_get("updated_at").map_err(AppError::from)?,
            })),
            None => Ok(None),
        }
    }

    // Aplica uma mutação vinda do app. Só os campos JSON simples são
    // mesclados; as colunas estruturais (ids, referências) não mudam aqui.
    pub async fn apply_patch<'e, E>(
        &self,
        executor: E,
        entity: SyncEntity,
        object_id: Uuid,
        patch: &Value,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Cada entidade expõe um subconjunto de colunas editáveis offline.
        let sql = match entity {
            SyncEntity::Client => {
                r#"
                UPDATE clients SET
                    notes = COALESCE($2->>'notes', notes),
                    visit_preferences = COALESCE($2->>'visitPreferences', visit_preferences),
                    access_constraints = COALESCE($2->>'accessConstraints', access_constraints),
                    updated_at = NOW()
                WHERE id = $1
                "#
            }
            SyncEntity::Intervention => {
                r#"
                UPDATE interventions SET
                    notes = COALESCE($2->>'notes', notes),
                    materials_needed = COALESCE($2->>'materialsNeeded', materials_needed),
                    special_instructions = COALESCE($2->>'specialInstructions', special_instructions),
                    updated_at = NOW()
                WHERE id = $1
                "#
            }
            SyncEntity::Inspection => {
                r#"
                UPDATE inspections SET
                    form_data = COALESCE($2->'formData', form_data),
                    description = COALESCE($2->>'description', description),
                    updated_at = NOW()
                WHERE id = $1
                "#
            }
        };

        let result = sqlx::query(sql)
            .bind(object_id)
            .bind(patch)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_object<'e, E>(
        &self,
        executor: E,
        entity: SyncEntity,
        object_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("DELETE FROM {} WHERE id = $1", Self::table(entity));

        let result = sqlx::query(&sql)
            .bind(object_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    // Linhas alteradas desde um instante, para o pull incremental do app.
    pub async fn list_changed_since(
        &self,
        entity: SyncEntity,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Value>, AppError> {
        let sql = format!(
            r#"
            SELECT row_to_json(t)::jsonb AS row FROM {} t
            WHERE t.updated_at > $1
            ORDER BY t.updated_at ASC
            LIMIT $2
            "#,
            Self::table(entity)
        );

        let rows = sqlx::query(&sql)
            .bind(since)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| row.try_get("row").map_err(AppError::from))
            .collect()
    }

    // =========================================================================
    //  CONFLITS
    // =========================================================================

    pub async fn record_conflict<'e, E>(
        &self,
        executor: E,
        entity: SyncEntity,
        object_id: Uuid,
        user_id: Uuid,
        client_payload: &Value,
        server_payload: &Value,
        client_modified_at: DateTime<Utc>,
        server_modified_at: DateTime<Utc>,
    ) -> Result<SyncConflict, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let conflict = sqlx::query_as::<_, SyncConflict>(
            r#"
            INSERT INTO sync_conflicts (
                entity, object_id, user_id, client_payload, server_payload,
                client_modified_at, server_modified_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(entity)
        .bind(object_id)
        .bind(user_id)
        .bind(client_payload)
        .bind(server_payload)
        .bind(client_modified_at)
        .bind(server_modified_at)
        .fetch_one(executor)
        .await?;

        Ok(conflict)
    }

    pub async fn list_conflicts(
        &self,
        user_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<SyncConflict>, AppError> {
        let conflicts = sqlx::query_as::<_, SyncConflict>(
            r#"
            SELECT * FROM sync_conflicts
            WHERE ($1::uuid IS NULL OR user_id = $1)
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(conflicts)
    }
}
