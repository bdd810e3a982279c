// src/db/report_repo.rs

use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::reports::{
        CreateReportPayload, CreateReportTemplatePayload, InterventionReport, ReportExport,
        ReportExportStatus, ReportHistory, ReportStatus, ReportTemplate, ReportType,
        UpdateReportPayload,
    },
};

#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  TEMPLATES
    // =========================================================================

    pub async fn create_template<'e, E>(
        &self,
        executor: E,
        payload: &CreateReportTemplatePayload,
        created_by: Option<Uuid>,
    ) -> Result<ReportTemplate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let template = sqlx::query_as::<_, ReportTemplate>(
            r#"
            INSERT INTO report_templates (name, description, template_type, sections, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(payload.template_type)
        .bind(&payload.sections)
        .bind(created_by)
        .fetch_one(executor)
        .await?;

        Ok(template)
    }

    pub async fn find_template_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<ReportTemplate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let template =
            sqlx::query_as::<_, ReportTemplate>("SELECT * FROM report_templates WHERE id = $1")
                .bind(id)
                .fetch_optional(executor)
                .await?;

        Ok(template)
    }

    pub async fn list_templates(&self, only_active: bool) -> Result<Vec<ReportTemplate>, AppError> {
        let templates = sqlx::query_as::<_, ReportTemplate>(
            r#"
            SELECT * FROM report_templates
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
    //  RAPPORTS
    // =========================================================================

    pub async fn create_report<'e, E>(
        &self,
        executor: E,
        payload: &CreateReportPayload,
        content: &Value,
        created_by: Option<Uuid>,
    ) -> Result<InterventionReport, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let report = sqlx::query_as::<_, InterventionReport>(
            r#"
            INSERT INTO intervention_reports (
                intervention_id, template_id, report_type, title,
                summary, recommendations, next_steps, content, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(payload.intervention_id)
        .bind(payload.template_id)
        .bind(payload.report_type.unwrap_or(ReportType::Final))
        .bind(&payload.title)
        .bind(&payload.summary)
        .bind(&payload.recommendations)
        .bind(&payload.next_steps)
        .bind(content)
        .bind(created_by)
        .fetch_one(executor)
        .await?;

        Ok(report)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<InterventionReport>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let report = sqlx::query_as::<_, InterventionReport>(
            "SELECT * FROM intervention_reports WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(report)
    }

    pub async fn list_reports(
        &self,
        status: Option<ReportStatus>,
        intervention_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<InterventionReport>, AppError> {
        let reports = sqlx::query_as::<_, InterventionReport>(
            r#"
            SELECT * FROM intervention_reports
            WHERE ($1::report_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR intervention_id = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(status)
        .bind(intervention_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(reports)
    }

    pub async fn update_report<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &UpdateReportPayload,
    ) -> Result<InterventionReport, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, InterventionReport>(
            r#"
            UPDATE intervention_reports SET
                title = COALESCE($2, title),
                summary = COALESCE($3, summary),
                recommendations = COALESCE($4, recommendations),
                next_steps = COALESCE($5, next_steps),
                content = COALESCE($6, content),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.title)
        .bind(&payload.summary)
        .bind(&payload.recommendations)
        .bind(&payload.next_steps)
        .bind(&payload.content)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("report"))
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: ReportStatus,
        reviewed_by: Option<Uuid>,
        review_notes: Option<&str>,
    ) -> Result<InterventionReport, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, InterventionReport>(
            r#"
            UPDATE intervention_reports SET
                status = $2,
                reviewed_by = COALESCE($3, reviewed_by),
                reviewed_at = CASE WHEN $3::uuid IS NULL THEN reviewed_at ELSE NOW() END,
                review_notes = COALESCE($4, review_notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(reviewed_by)
        .bind(review_notes)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("report"))
    }

    pub async fn delete_report<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM intervention_reports WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  HISTORIQUE / EXPORTS
    // =========================================================================

    // Sempre na mesma transação da ação de workflow que ela registra.
    pub async fn append_history<'e, E>(
        &self,
        executor: E,
        report_id: Uuid,
        action: &str,
        detail: Option<&str>,
        user_id: Option<Uuid>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO report_history (report_id, action, detail, user_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(report_id)
        .bind(action)
        .bind(detail)
        .bind(user_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn list_history(&self, report_id: Uuid) -> Result<Vec<ReportHistory>, AppError> {
        let history = sqlx::query_as::<_, ReportHistory>(
            "SELECT * FROM report_history WHERE report_id = $1 ORDER BY created_at ASC",
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(history)
    }

    pub async fn create_export<'e, E>(
        &self,
        executor: E,
        report_id: Uuid,
        format: &str,
        generated_by: Option<Uuid>,
    ) -> Result<ReportExport, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let export = sqlx::query_as::<_, ReportExport>(
            r#"
            INSERT INTO report_exports (report_id, format, generated_by)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(report_id)
        .bind(format)
        .bind(generated_by)
        .fetch_one(executor)
        .await?;

        Ok(export)
    }

    pub async fn finish_export<'e, E>(
        &self,
        executor: E,
        export_id: Uuid,
        status: ReportExportStatus,
        file_size: Option<i32>,
        error_message: Option<&str>,
    ) -> Result<ReportExport, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ReportExport>(
            r#"
            UPDATE report_exports SET
                status = $2,
                file_size = $3,
                error_message = $4,
                generated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(export_id)
        .bind(status)
        .bind(file_size)
        .bind(error_message)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("export"))
    }

    pub async fn list_exports(&self, report_id: Uuid) -> Result<Vec<ReportExport>, AppError> {
        let exports = sqlx::query_as::<_, ReportExport>(
            "SELECT * FROM report_exports WHERE report_id = $1 ORDER BY created_at DESC",
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(exports)
    }
}
