// src/db/inspection_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::inspections::{
        CreateInspectionPayload, CreateItemPayload, CreateMediaPayload, CreateSignaturePayload,
        CreateTemplatePayload, Inspection, InspectionItem, InspectionMedia, InspectionSignature,
        InspectionStatus, InspectionTemplate, UpdateInspectionPayload, UpdateItemValuePayload,
    },
};

#[derive(Clone)]
pub struct InspectionRepository {
    pool: PgPool,
}

impl InspectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  MODÈLES D'INSPECTION
    // =========================================================================

    pub async fn create_template<'e, E>(
        &self,
        executor: E,
        payload: &CreateTemplatePayload,
    ) -> Result<InspectionTemplate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let template = sqlx::query_as::<_, InspectionTemplate>(
            r#"
            INSERT INTO inspection_templates (name, description)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.description)
        .fetch_one(executor)
        .await?;

        Ok(template)
    }

    pub async fn list_templates(&self, only_active: bool) -> Result<Vec<InspectionTemplate>, AppError> {
        let templates = sqlx::query_as::<_, InspectionTemplate>(
            r#"
            SELECT * FROM inspection_templates
            WHERE (NOT $1 OR is_active)
            ORDER BY name ASC
            "#,
        )
        .bind(only_active)
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }

    // =========================================================================
    //  INSPECTIONS
    // =========================================================================

    pub async fn create_inspection<'e, E>(
        &self,
        executor: E,
        payload: &CreateInspectionPayload,
    ) -> Result<Inspection, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let inspection = sqlx::query_as::<_, Inspection>(
            r#"
            INSERT INTO inspections (
                client_id, site_id, intervention_id, template_id,
                title, description, scheduled_date, inspector
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(payload.client_id)
        .bind(payload.site_id)
        .bind(payload.intervention_id)
        .bind(payload.template_id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.scheduled_date)
        .bind(payload.inspector)
        .fetch_one(executor)
        .await?;

        Ok(inspection)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Inspection>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let inspection = sqlx::query_as::<_, Inspection>("SELECT * FROM inspections WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(inspection)
    }

    pub async fn list_inspections(
        &self,
        status: Option<InspectionStatus>,
        client_id: Option<Uuid>,
        inspector: Option<Uuid>,
        q: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Inspection>, AppError> {
        let inspections = sqlx::query_as::<_, Inspection>(
            r#"
            SELECT * FROM inspections
            WHERE ($1::inspection_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR client_id = $2)
              AND ($3::uuid IS NULL OR inspector = $3)
              AND ($4::text IS NULL OR title ILIKE '%' || $4 || '%')
            ORDER BY scheduled_date DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(status)
        .bind(client_id)
        .bind(inspector)
        .bind(q)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(inspections)
    }

    pub async fn update_inspection<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &UpdateInspectionPayload,
    ) -> Result<Inspection, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Inspection>(
            r#"
            UPDATE inspections SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                site_id = COALESCE($4, site_id),
                scheduled_date = COALESCE($5, scheduled_date),
                inspector = COALESCE($6, inspector),
                form_data = COALESCE($7, form_data),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.site_id)
        .bind(payload.scheduled_date)
        .bind(payload.inspector)
        .bind(&payload.form_data)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("inspection"))
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: InspectionStatus,
        completed_date: Option<DateTime<Utc>>,
    ) -> Result<Inspection, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Inspection>(
            r#"
            UPDATE inspections SET
                status = $2,
                completed_date = COALESCE($3, completed_date),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(completed_date)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("inspection"))
    }

    pub async fn update_status_with_reason<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: InspectionStatus,
        reason: &str,
    ) -> Result<Inspection, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Inspection>(
            r#"
            UPDATE inspections SET
                status = $2,
                rejection_reason = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(reason)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("inspection"))
    }

    pub async fn delete_inspection<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM inspections WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  ITEMS (champs du formulaire)
    // =========================================================================

    pub async fn create_item<'e, E>(
        &self,
        executor: E,
        inspection_id: Uuid,
        payload: &CreateItemPayload,
    ) -> Result<InspectionItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, InspectionItem>(
            r#"
            INSERT INTO inspection_items (
                inspection_id, name, key_name, description, field_type, options, is_required
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(inspection_id)
        .bind(&payload.name)
        .bind(&payload.key_name)
        .bind(&payload.description)
        .bind(payload.field_type)
        .bind(&payload.options)
        .bind(payload.is_required)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(format!(
                        "clé de champ '{}'",
                        payload.key_name
                    ));
                }
            }
            e.into()
        })
    }

    pub async fn list_items<'e, E>(
        &self,
        executor: E,
        inspection_id: Uuid,
    ) -> Result<Vec<InspectionItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, InspectionItem>(
            "SELECT * FROM inspection_items WHERE inspection_id = $1 ORDER BY created_at ASC",
        )
        .bind(inspection_id)
        .fetch_all(executor)
        .await?;

        Ok(items)
    }

    pub async fn update_item_value<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        payload: &UpdateItemValuePayload,
    ) -> Result<InspectionItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, InspectionItem>(
            r#"
            UPDATE inspection_items SET
                value = $2,
                is_checked = $3,
                notes = COALESCE($4, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(&payload.value)
        .bind(payload.is_checked)
        .bind(&payload.notes)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("inspection item"))
    }

    // =========================================================================
    //  MÉDIAS / SIGNATURES
    // =========================================================================

    pub async fn create_media<'e, E>(
        &self,
        executor: E,
        inspection_id: Uuid,
        payload: &CreateMediaPayload,
    ) -> Result<InspectionMedia, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let media = sqlx::query_as::<_, InspectionMedia>(
            r#"
            INSERT INTO inspection_media (inspection_id, title, description, file_path)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(inspection_id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(&payload.file_path)
        .fetch_one(executor)
        .await?;

        Ok(media)
    }

    pub async fn list_media(&self, inspection_id: Uuid) -> Result<Vec<InspectionMedia>, AppError> {
        let media = sqlx::query_as::<_, InspectionMedia>(
            "SELECT * FROM inspection_media WHERE inspection_id = $1 ORDER BY uploaded_at DESC",
        )
        .bind(inspection_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(media)
    }

    pub async fn create_signature<'e, E>(
        &self,
        executor: E,
        inspection_id: Uuid,
        payload: &CreateSignaturePayload,
    ) -> Result<InspectionSignature, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let signature = sqlx::query_as::<_, InspectionSignature>(
            r#"
            INSERT INTO inspection_signatures (inspection_id, signer_name, signature_path)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(inspection_id)
        .bind(&payload.signer_name)
        .bind(&payload.signature_path)
        .fetch_one(executor)
        .await?;

        Ok(signature)
    }

    pub async fn list_signatures(
        &self,
        inspection_id: Uuid,
    ) -> Result<Vec<InspectionSignature>, AppError> {
        let signatures = sqlx::query_as::<_, InspectionSignature>(
            "SELECT * FROM inspection_signatures WHERE inspection_id = $1 ORDER BY signed_at DESC",
        )
        .bind(inspection_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(signatures)
    }
}
