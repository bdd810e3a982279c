// src/services/report_service.rs

use serde_json::{json, Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{InterventionRepository, ReportRepository},
    models::reports::{
        CreateReportPayload, CreateReportTemplatePayload, InterventionReport, ReportExport,
        ReportExportStatus, ReportHistory, ReportStatus, ReportTemplate, UpdateReportPayload,
    },
    services::document_service::DocumentService,
};

// Máquina de estados do workflow de aprovação
pub fn transition_target(
    current: ReportStatus,
    action: &'static str,
) -> Result<ReportStatus, AppError> {
    use ReportStatus::*;

    let target = match (action, current) {
        ("submit", Draft) => Some(PendingReview),
        ("approve", PendingReview) => Some(Approved),
        ("reject", PendingReview) => Some(Rejected),
        ("archive", Approved) => Some(Archived),
        _ => None,
    };

    target.ok_or(AppError::InvalidTransition {
        entity: "report",
        current: current.as_str().to_string(),
        action,
    })
}

// Esqueleto do conteúdo a partir das seções do template, mesclado com o
// conteúdo inicial fornecido. Chaves extras do inicial são preservadas.
pub fn build_content(sections: &Value, initial: Option<&Value>) -> Value {
    let mut content = Map::new();

    if let Some(sections) = sections.as_array() {
        for section in sections {
            if let Some(key) = section.get("key").and_then(Value::as_str) {
                content.insert(key.to_string(), Value::String(String::new()));
            }
        }
    }

    if let Some(Value::Object(initial)) = initial {
        for (key, value) in initial {
            content.insert(key.clone(), value.clone());
        }
    }

    Value::Object(content)
}

#[derive(Clone)]
pub struct ReportService {
    repo: ReportRepository,
    intervention_repo: InterventionRepository,
    document_service: DocumentService,
}

impl ReportService {
    pub fn new(
        repo: ReportRepository,
        intervention_repo: InterventionRepository,
        document_service: DocumentService,
    ) -> Self {
        Self {
            repo,
            intervention_repo,
            document_service,
        }
    }

    // =========================================================================
    //  TEMPLATES
    // =========================================================================

    pub async fn create_template(
        &self,
        pool: &PgPool,
        payload: &CreateReportTemplatePayload,
        created_by: Option<Uuid>,
    ) -> Result<ReportTemplate, AppError> {
        self.repo.create_template(pool, payload, created_by).await
    }

    pub async fn list_templates(&self, only_active: bool) -> Result<Vec<ReportTemplate>, AppError> {
        self.repo.list_templates(only_active).await
    }

    // =========================================================================
    //  RAPPORTS
    // =========================================================================

    pub async fn create_report(
        &self,
        pool: &PgPool,
        payload: &CreateReportPayload,
        created_by: Option<Uuid>,
    ) -> Result<InterventionReport, AppError> {
        // A intervenção precisa existir; um id errado vira 404
        self.intervention_repo
            .find_by_id(pool, payload.intervention_id)
            .await?
            .ok_or(AppError::NotFound("intervention"))?;

        // O template (quando dado) fornece o esqueleto das seções
        let sections = match payload.template_id {
            Some(template_id) => {
                let template = self
                    .repo
                    .find_template_by_id(pool, template_id)
                    .await?
                    .ok_or(AppError::NotFound("report template"))?;
                template.sections
            }
            None => json!([]),
        };

        let content = build_content(&sections, payload.content.as_ref());

        let mut tx = pool.begin().await?;

        let report = self
            .repo
            .create_report(&mut *tx, payload, &content, created_by)
            .await?;

        self.repo
            .append_history(&mut *tx, report.id, "created", None, created_by)
            .await?;

        tx.commit().await?;

        Ok(report)
    }

    pub async fn get_report(&self, pool: &PgPool, id: Uuid) -> Result<InterventionReport, AppError> {
        self.repo
            .find_by_id(pool, id)
            .await?
            .ok_or(AppError::NotFound("report"))
    }

    pub async fn list_reports(
        &self,
        status: Option<ReportStatus>,
        intervention_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<InterventionReport>, AppError> {
        self.repo
            .list_reports(status, intervention_id, limit, offset)
            .await
    }

    // Só rascunhos e rapports rejeitados podem ser editados
    pub async fn update_report(
        &self,
        pool: &PgPool,
        id: Uuid,
        payload: &UpdateReportPayload,
        user_id: Option<Uuid>,
    ) -> Result<InterventionReport, AppError> {
        let report = self.get_report(pool, id).await?;

        if !matches!(report.status, ReportStatus::Draft | ReportStatus::Rejected) {
            return Err(AppError::InvalidTransition {
                entity: "report",
                current: report.status.as_str().to_string(),
                action: "update",
            });
        }

        let mut tx = pool.begin().await?;

        let report = self.repo.update_report(&mut *tx, id, payload).await?;
        self.repo
            .append_history(&mut *tx, id, "updated", None, user_id)
            .await?;

        tx.commit().await?;

        Ok(report)
    }

    pub async fn delete_report(&self, pool: &PgPool, id: Uuid) -> Result<(), AppError> {
        let deleted = self.repo.delete_report(pool, id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound("report"));
        }
        Ok(())
    }

    pub async fn list_history(&self, report_id: Uuid) -> Result<Vec<ReportHistory>, AppError> {
        self.repo.list_history(report_id).await
    }

    // =========================================================================
    //  WORKFLOW
    // =========================================================================

    pub async fn submit(
        &self,
        pool: &PgPool,
        id: Uuid,
        user_id: Option<Uuid>,
    ) -> Result<InterventionReport, AppError> {
        self.apply_transition(pool, id, "submit", None, user_id, false)
            .await
    }

    pub async fn approve(
        &self,
        pool: &PgPool,
        id: Uuid,
        notes: Option<&str>,
        user_id: Option<Uuid>,
    ) -> Result<InterventionReport, AppError> {
        self.apply_transition(pool, id, "approve", notes, user_id, true)
            .await
    }

    pub async fn reject(
        &self,
        pool: &PgPool,
        id: Uuid,
        notes: Option<&str>,
        user_id: Option<Uuid>,
    ) -> Result<InterventionReport, AppError> {
        self.apply_transition(pool, id, "reject", notes, user_id, true)
            .await
    }

    pub async fn archive(
        &self,
        pool: &PgPool,
        id: Uuid,
        user_id: Option<Uuid>,
    ) -> Result<InterventionReport, AppError> {
        self.apply_transition(pool, id, "archive", None, user_id, false)
            .await
    }

    // Toda transição grava o novo status e a linha de histórico na mesma
    // transação.
    async fn apply_transition(
        &self,
        pool: &PgPool,
        id: Uuid,
        action: &'static str,
        notes: Option<&str>,
        user_id: Option<Uuid>,
        is_review: bool,
    ) -> Result<InterventionReport, AppError> {
        let mut tx = pool.begin().await?;

        let report = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("report"))?;

        let target = transition_target(report.status, action)?;

        let reviewed_by = if is_review { user_id } else { None };

        let report = self
            .repo
            .update_status(&mut *tx, id, target, reviewed_by, notes)
            .await?;

        self.repo
            .append_history(&mut *tx, id, action, notes, user_id)
            .await?;

        tx.commit().await?;

        Ok(report)
    }

    // =========================================================================
    //  EXPORT PDF
    // =========================================================================

    // Renderiza o PDF do rapport aprovado e registra o export (sucesso ou falha).
    pub async fn export_pdf(
        &self,
        pool: &PgPool,
        id: Uuid,
        user_id: Option<Uuid>,
    ) -> Result<(ReportExport, Vec<u8>), AppError> {
        let report = self.get_report(pool, id).await?;

        if report.status != ReportStatus::Approved {
            return Err(AppError::InvalidTransition {
                entity: "report",
                current: report.status.as_str().to_string(),
                action: "export",
            });
        }

        let export = self.repo.create_export(pool, id, "pdf", user_id).await?;

        match self.document_service.generate_report_pdf(pool, &report).await {
            Ok(bytes) => {
                let export = self
                    .repo
                    .finish_export(
                        pool,
                        export.id,
                        ReportExportStatus::Completed,
                        Some(bytes.len() as i32),
                        None,
                    )
                    .await?;

                self.repo
                    .append_history(pool, id, "exported", Some("pdf"), user_id)
                    .await?;

                Ok((export, bytes))
            }
            Err(e) => {
                self.repo
                    .finish_export(
                        pool,
                        export.id,
                        ReportExportStatus::Failed,
                        None,
                        Some(&e.to_string()),
                    )
                    .await?;

                Err(e)
            }
        }
    }

    pub async fn list_exports(&self, report_id: Uuid) -> Result<Vec<ReportExport>, AppError> {
        self.repo.list_exports(report_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_happy_path() {
        let status = transition_target(ReportStatus::Draft, "submit").unwrap();
        assert_eq!(status, ReportStatus::PendingReview);
        let status = transition_target(status, "approve").unwrap();
        assert_eq!(status, ReportStatus::Approved);
        let status = transition_target(status, "archive").unwrap();
        assert_eq!(status, ReportStatus::Archived);
    }

    #[test]
    fn rejected_report_cannot_be_archived() {
        let status = transition_target(ReportStatus::PendingReview, "reject").unwrap();
        assert_eq!(status, ReportStatus::Rejected);
        assert!(transition_target(status, "archive").is_err());
    }

    #[test]
    fn draft_cannot_be_approved_directly() {
        assert!(transition_target(ReportStatus::Draft, "approve").is_err());
    }

    #[test]
    fn content_skeleton_follows_template_sections() {
        let sections = json!([
            { "key": "findings", "title": "Constatations" },
            { "key": "methodology", "title": "Méthodologie" }
        ]);
        let content = build_content(&sections, None);
        assert_eq!(content["findings"], "");
        assert_eq!(content["methodology"], "");
    }

    #[test]
    fn initial_content_overrides_skeleton_and_keeps_extras() {
        let sections = json!([{ "key": "findings" }]);
        let initial = json!({ "findings": "Fuite au sous-sol", "extra": 42 });
        let content = build_content(&sections, Some(&initial));
        assert_eq!(content["findings"], "Fuite au sous-sol");
        assert_eq!(content["extra"], 42);
    }

    #[test]
    fn empty_template_keeps_initial_only() {
        let content = build_content(&json!([]), Some(&json!({ "notes": "ok" })));
        assert_eq!(content, json!({ "notes": "ok" }));
    }
}
