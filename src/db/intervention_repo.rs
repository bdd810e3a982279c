// src/db/intervention_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::interventions::{
        CreateInterventionDocumentPayload, CreateInterventionPayload, CreateNotePayload,
        CreateTaskPayload, Intervention, InterventionDocument, InterventionNote,
        InterventionPriority, InterventionStats, InterventionStatus, InterventionTask,
        InterventionType, TaskStatus, UpdateInterventionPayload,
    },
};

#[derive(Clone)]
pub struct InterventionRepository {
    pool: PgPool,
}

impl InterventionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  INTERVENTIONS
    // =========================================================================

    // A referência (INT-AAAA-NNN) é sequencial por ano; contamos dentro da
    // transação de criação para evitar furos na numeração.
    pub async fn count_for_year<'e, E>(&self, executor: E, year: i32) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM interventions WHERE reference LIKE $1",
        )
        .bind(format!("INT-{}-%", year))
        .fetch_one(executor)
        .await?;

        Ok(count)
    }

    pub async fn create_intervention<'e, E>(
        &self,
        executor: E,
        reference: &str,
        payload: &CreateInterventionPayload,
        created_by: Option<Uuid>,
    ) -> Result<Intervention, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Intervention>(
            r#"
            INSERT INTO interventions (
                reference, title, description, intervention_type, priority,
                client_id, site_id, scheduled_date, estimated_duration_minutes,
                assigned_technician, latitude, longitude, address,
                notes, materials_needed, special_instructions, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING *
            "#,
        )
        .bind(reference)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.intervention_type)
        .bind(payload.priority.unwrap_or(InterventionPriority::Medium))
        .bind(payload.client_id)
        .bind(payload.site_id)
        .bind(payload.scheduled_date)
        .bind(payload.estimated_duration_minutes)
        .bind(payload.assigned_technician)
        .bind(payload.latitude)
        .bind(payload.longitude)
        .bind(&payload.address)
        .bind(&payload.notes)
        .bind(&payload.materials_needed)
        .bind(&payload.special_instructions)
        .bind(created_by)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(format!(
                        "référence '{}'",
                        reference
                    ));
                }
            }
            e.into()
        })
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Intervention>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let intervention =
            sqlx::query_as::<_, Intervention>("SELECT * FROM interventions WHERE id = $1")
                .bind(id)
                .fetch_optional(executor)
                .await?;

        Ok(intervention)
    }

    pub async fn list_interventions(
        &self,
        status: Option<InterventionStatus>,
        priority: Option<InterventionPriority>,
        intervention_type: Option<InterventionType>,
        client_id: Option<Uuid>,
        technician: Option<Uuid>,
        q: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Intervention>, AppError> {
        let interventions = sqlx::query_as::<_, Intervention>(
            r#"
            SELECT * FROM interventions
            WHERE ($1::intervention_status IS NULL OR status = $1)
              AND ($2::intervention_priority IS NULL OR priority = $2)
              AND ($3::intervention_type IS NULL OR intervention_type = $3)
              AND ($4::uuid IS NULL OR client_id = $4)
              AND ($5::uuid IS NULL OR assigned_technician = $5)
              AND ($6::text IS NULL OR
                   title ILIKE '%' || $6 || '%'
                   OR description ILIKE '%' || $6 || '%'
                   OR reference ILIKE '%' || $6 || '%')
            ORDER BY scheduled_date DESC
            LIMIT $7 OFFSET $8
            "#,
        )
        .bind(status)
        .bind(priority)
        .bind(intervention_type)
        .bind(client_id)
        .bind(technician)
        .bind(q)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(interventions)
    }

    // Janela do calendário: tudo que está planejado entre duas datas
    pub async fn list_calendar(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        technician: Option<Uuid>,
    ) -> Result<Vec<Intervention>, AppError> {
        let interventions = sqlx::query_as::<_, Intervention>(
            r#"
            SELECT * FROM interventions
            WHERE scheduled_date >= $1 AND scheduled_date < $2
              AND ($3::uuid IS NULL OR assigned_technician = $3)
            ORDER BY scheduled_date ASC
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(technician)
        .fetch_all(&self.pool)
        .await?;

        Ok(interventions)
    }

    pub async fn update_intervention<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &UpdateInterventionPayload,
    ) -> Result<Intervention, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Intervention>(
            r#"
            UPDATE interventions SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                intervention_type = COALESCE($4, intervention_type),
                priority = COALESCE($5, priority),
                site_id = COALESCE($6, site_id),
                scheduled_date = COALESCE($7, scheduled_date),
                estimated_duration_minutes = COALESCE($8, estimated_duration_minutes),
                assigned_technician = COALESCE($9, assigned_technician),
                latitude = COALESCE($10, latitude),
                longitude = COALESCE($11, longitude),
                address = COALESCE($12, address),
                notes = COALESCE($13, notes),
                materials_needed = COALESCE($14, materials_needed),
                special_instructions = COALESCE($15, special_instructions),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.intervention_type)
        .bind(payload.priority)
        .bind(payload.site_id)
        .bind(payload.scheduled_date)
        .bind(payload.estimated_duration_minutes)
        .bind(payload.assigned_technician)
        .bind(payload.latitude)
        .bind(payload.longitude)
        .bind(&payload.address)
        .bind(&payload.notes)
        .bind(&payload.materials_needed)
        .bind(&payload.special_instructions)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("intervention"))
    }

    // Transição de status com os carimbos de data correspondentes.
    // A guarda de workflow fica no service; aqui só gravamos.
    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: InterventionStatus,
        actual_start: Option<DateTime<Utc>>,
        actual_end: Option<DateTime<Utc>>,
        new_scheduled_date: Option<DateTime<Utc>>,
    ) -> Result<Intervention, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Intervention>(
            r#"
            UPDATE interventions SET
                status = $2,
                actual_start_date = COALESCE($3, actual_start_date),
                actual_end_date = COALESCE($4, actual_end_date),
                scheduled_date = COALESCE($5, scheduled_date),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(actual_start)
        .bind(actual_end)
        .bind(new_scheduled_date)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("intervention"))
    }

    pub async fn delete_intervention<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM interventions WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn stats(&self) -> Result<InterventionStats, AppError> {
        // Uma única passada com agregações condicionais
        let row = sqlx::query_as::<_, InterventionStats>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'scheduled') AS scheduled,
                COUNT(*) FILTER (WHERE status = 'in_progress') AS in_progress,
                COUNT(*) FILTER (WHERE status = 'completed') AS completed,
                COUNT(*) FILTER (
                    WHERE status IN ('scheduled', 'in_progress') AND scheduled_date < NOW()
                ) AS overdue,
                COUNT(*) FILTER (WHERE scheduled_date::date = CURRENT_DATE) AS today,
                COUNT(*) FILTER (
                    WHERE scheduled_date::date >= CURRENT_DATE - INTERVAL '7 days'
                      AND scheduled_date::date <= CURRENT_DATE
                ) AS this_week
            FROM interventions
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    // =========================================================================
    //  TÂCHES
    // =========================================================================

    pub async fn create_task<'e, E>(
        &self,
        executor: E,
        intervention_id: Uuid,
        payload: &CreateTaskPayload,
    ) -> Result<InterventionTask, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let task = sqlx::query_as::<_, InterventionTask>(
            r#"
            INSERT INTO intervention_tasks (intervention_id, title, description, position, assigned_to)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(intervention_id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.position)
        .bind(payload.assigned_to)
        .fetch_one(executor)
        .await?;

        Ok(task)
    }

    pub async fn list_tasks(&self, intervention_id: Uuid) -> Result<Vec<InterventionTask>, AppError> {
        let tasks = sqlx::query_as::<_, InterventionTask>(
            "SELECT * FROM intervention_tasks WHERE intervention_id = $1 ORDER BY position ASC",
        )
        .bind(intervention_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    pub async fn update_task_status<'e, E>(
        &self,
        executor: E,
        task_id: Uuid,
        status: TaskStatus,
        started_at: Option<DateTime<Utc>>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<InterventionTask, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, InterventionTask>(
            r#"
            UPDATE intervention_tasks SET
                status = $2,
                started_at = COALESCE($3, started_at),
                completed_at = COALESCE($4, completed_at),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(task_id)
        .bind(status)
        .bind(started_at)
        .bind(completed_at)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("task"))
    }

    pub async fn delete_task<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM intervention_tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  DOCUMENTS / NOTES
    // =========================================================================

    pub async fn create_document<'e, E>(
        &self,
        executor: E,
        intervention_id: Uuid,
        payload: &CreateInterventionDocumentPayload,
        uploaded_by: Option<Uuid>,
    ) -> Result<InterventionDocument, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let document = sqlx::query_as::<_, InterventionDocument>(
            r#"
            INSERT INTO intervention_documents (
                intervention_id, task_id, title, document_type, file_path,
                description, latitude, longitude, uploaded_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(intervention_id)
        .bind(payload.task_id)
        .bind(&payload.title)
        .bind(payload.document_type)
        .bind(&payload.file_path)
        .bind(&payload.description)
        .bind(payload.latitude)
        .bind(payload.longitude)
        .bind(uploaded_by)
        .fetch_one(executor)
        .await?;

        Ok(document)
    }

    pub async fn list_documents(
        &self,
        intervention_id: Uuid,
    ) -> Result<Vec<InterventionDocument>, AppError> {
        let documents = sqlx::query_as::<_, InterventionDocument>(
            "SELECT * FROM intervention_documents WHERE intervention_id = $1 ORDER BY uploaded_at DESC",
        )
        .bind(intervention_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }

    pub async fn create_note<'e, E>(
        &self,
        executor: E,
        intervention_id: Uuid,
        payload: &CreateNotePayload,
        created_by: Option<Uuid>,
    ) -> Result<InterventionNote, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let note = sqlx::query_as::<_, InterventionNote>(
            r#"
            INSERT INTO intervention_notes (
                intervention_id, task_id, title, content, is_internal, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(intervention_id)
        .bind(payload.task_id)
        .bind(&payload.title)
        .bind(&payload.content)
        .bind(payload.is_internal)
        .bind(created_by)
        .fetch_one(executor)
        .await?;

        Ok(note)
    }

    pub async fn list_notes(
        &self,
        intervention_id: Uuid,
    ) -> Result<Vec<InterventionNote>, AppError> {
        let notes = sqlx::query_as::<_, InterventionNote>(
            "SELECT * FROM intervention_notes WHERE intervention_id = $1 ORDER BY created_at DESC",
        )
        .bind(intervention_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notes)
    }
}
