// src/services/intervention_service.rs

use chrono::{DateTime, Datelike, Utc};
use serde_json::json;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::InterventionRepository,
    models::{
        interventions::{
            CreateInterventionDocumentPayload, CreateInterventionPayload, CreateNotePayload,
            CreateTaskPayload, Intervention, InterventionDocument, InterventionNote,
            InterventionPriority, InterventionStats, InterventionStatus, InterventionTask,
            InterventionType, TaskStatus, UpdateInterventionPayload,
        },
        notifications::NotificationTrigger,
    },
    services::notification_service::NotificationService,
};

// Referência sequencial por ano: INT-2026-001, INT-2026-002, ...
pub fn build_reference(year: i32, sequence: i64) -> String {
    format!("INT-{}-{:03}", year, sequence)
}

// A máquina de estados das intervenções. Retorna o status de destino ou
// a transição inválida com o status atual.
pub fn transition_target(
    current: InterventionStatus,
    action: &'static str,
) -> Result<InterventionStatus, AppError> {
    use InterventionStatus::*;

    let target = match (action, current) {
        ("start", Scheduled) => Some(InProgress),
        ("complete", InProgress) => Some(Completed),
        ("cancel", Scheduled) | ("cancel", InProgress) | ("cancel", Postponed) => Some(Cancelled),
        ("postpone", Scheduled) => Some(Postponed),
        _ => None,
    };

    target.ok_or(AppError::InvalidTransition {
        entity: "intervention",
        current: current.as_str().to_string(),
        action,
    })
}

#[derive(Clone)]
pub struct InterventionService {
    repo: InterventionRepository,
    notification_service: NotificationService,
}

impl InterventionService {
    pub fn new(repo: InterventionRepository, notification_service: NotificationService) -> Self {
        Self {
            repo,
            notification_service,
        }
    }

    // =========================================================================
    //  CRUD
    // =========================================================================

    pub async fn create_intervention<'e, E>(
        &self,
        executor: E,
        payload: &CreateInterventionPayload,
        created_by: Option<Uuid>,
    ) -> Result<Intervention, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // Numeração dentro da transação para não duplicar a referência
        let year = Utc::now().year();
        let sequence = self.repo.count_for_year(&mut *tx, year).await? + 1;
        let reference = build_reference(year, sequence);

        let intervention = self
            .repo
            .create_intervention(&mut *tx, &reference, payload, created_by)
            .await?;

        tx.commit().await?;

        // Avisa o técnico escalado; a intervenção já está criada, então uma
        // falha aqui só é registrada.
        if let Some(technician) = intervention.assigned_technician {
            let sent = self
                .notification_service
                .notify_trigger(
                    NotificationTrigger::InterventionScheduled,
                    technician,
                    "Nouvelle intervention planifiée",
                    &format!(
                        "L'intervention {} est planifiée pour le {}.",
                        intervention.reference,
                        intervention.scheduled_date.format("%d/%m/%Y %H:%M")
                    ),
                    json!({
                        "reference": intervention.reference,
                        "scheduledDate": intervention.scheduled_date,
                    }),
                    "intervention",
                    intervention.id,
                )
                .await;

            if let Err(e) = sent {
                tracing::warn!(
                    "Falha ao notificar o técnico da intervenção {}: {}",
                    intervention.reference,
                    e
                );
            }
        }

        Ok(intervention)
    }

    pub async fn get_intervention(&self, pool: &sqlx::PgPool, id: Uuid) -> Result<Intervention, AppError> {
        self.repo
            .find_by_id(pool, id)
            .await?
            .ok_or(AppError::NotFound("intervention"))
    }

    #[allow(clippy::too_many_arguments)]
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
        self.repo
            .list_interventions(
                status,
                priority,
                intervention_type,
                client_id,
                technician,
                q,
                limit,
                offset,
            )
            .await
    }

    pub async fn list_calendar(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        technician: Option<Uuid>,
    ) -> Result<Vec<Intervention>, AppError> {
        self.repo.list_calendar(from, to, technician).await
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
        self.repo.update_intervention(executor, id, payload).await
    }

    pub async fn delete_intervention<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deleted = self.repo.delete_intervention(executor, id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound("intervention"));
        }
        Ok(())
    }

    pub async fn stats(&self) -> Result<InterventionStats, AppError> {
        self.repo.stats().await
    }

    // =========================================================================
    //  WORKFLOW
    // =========================================================================

    pub async fn start<'e, E>(&self, executor: E, id: Uuid) -> Result<Intervention, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let intervention = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("intervention"))?;

        let target = transition_target(intervention.status, "start")?;

        let intervention = self
            .repo
            .update_status(&mut *tx, id, target, Some(Utc::now()), None, None)
            .await?;

        tx.commit().await?;

        Ok(intervention)
    }

    pub async fn complete<'e, E>(&self, executor: E, id: Uuid) -> Result<Intervention, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let intervention = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("intervention"))?;

        let target = transition_target(intervention.status, "complete")?;

        let intervention = self
            .repo
            .update_status(&mut *tx, id, target, None, Some(Utc::now()), None)
            .await?;

        tx.commit().await?;

        if let Some(technician) = intervention.assigned_technician {
            let sent = self
                .notification_service
                .notify_trigger(
                    NotificationTrigger::InterventionCompleted,
                    technician,
                    "Intervention terminée",
                    &format!("L'intervention {} est terminée.", intervention.reference),
                    json!({ "reference": intervention.reference }),
                    "intervention",
                    intervention.id,
                )
                .await;

            if let Err(e) = sent {
                tracing::warn!(
                    "Falha ao notificar a conclusão da intervenção {}: {}",
                    intervention.reference,
                    e
                );
            }
        }

        Ok(intervention)
    }

    pub async fn cancel<'e, E>(&self, executor: E, id: Uuid) -> Result<Intervention, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let intervention = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("intervention"))?;

        let target = transition_target(intervention.status, "cancel")?;

        let intervention = self
            .repo
            .update_status(&mut *tx, id, target, None, None, None)
            .await?;

        tx.commit().await?;

        Ok(intervention)
    }

    pub async fn postpone<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        new_scheduled_date: DateTime<Utc>,
    ) -> Result<Intervention, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let intervention = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("intervention"))?;

        let target = transition_target(intervention.status, "postpone")?;

        let intervention = self
            .repo
            .update_status(&mut *tx, id, target, None, None, Some(new_scheduled_date))
            .await?;

        tx.commit().await?;

        Ok(intervention)
    }

    // =========================================================================
    //  TÂCHES / DOCUMENTS / NOTES
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
        self.repo.create_task(executor, intervention_id, payload).await
    }

    pub async fn list_tasks(&self, intervention_id: Uuid) -> Result<Vec<InterventionTask>, AppError> {
        self.repo.list_tasks(intervention_id).await
    }

    // Mudança de status de tarefa com os carimbos correspondentes
    pub async fn set_task_status<'e, E>(
        &self,
        executor: E,
        task_id: Uuid,
        status: TaskStatus,
    ) -> Result<InterventionTask, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (started_at, completed_at) = match status {
            TaskStatus::InProgress => (Some(Utc::now()), None),
            TaskStatus::Completed => (None, Some(Utc::now())),
            _ => (None, None),
        };

        self.repo
            .update_task_status(executor, task_id, status, started_at, completed_at)
            .await
    }

    pub async fn delete_task<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deleted = self.repo.delete_task(executor, id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound("task"));
        }
        Ok(())
    }

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
        self.repo
            .create_document(executor, intervention_id, payload, uploaded_by)
            .await
    }

    pub async fn list_documents(
        &self,
        intervention_id: Uuid,
    ) -> Result<Vec<InterventionDocument>, AppError> {
        self.repo.list_documents(intervention_id).await
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
        self.repo
            .create_note(executor, intervention_id, payload, created_by)
            .await
    }

    pub async fn list_notes(
        &self,
        intervention_id: Uuid,
    ) -> Result<Vec<InterventionNote>, AppError> {
        self.repo.list_notes(intervention_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_is_zero_padded() {
        assert_eq!(build_reference(2026, 1), "INT-2026-001");
        assert_eq!(build_reference(2026, 42), "INT-2026-042");
        assert_eq!(build_reference(2026, 1234), "INT-2026-1234");
    }

    #[test]
    fn scheduled_can_start() {
        let target = transition_target(InterventionStatus::Scheduled, "start").unwrap();
        assert_eq!(target, InterventionStatus::InProgress);
    }

    #[test]
    fn completed_cannot_start_again() {
        let err = transition_target(InterventionStatus::Completed, "start").unwrap_err();
        match err {
            AppError::InvalidTransition { current, action, .. } => {
                assert_eq!(current, "completed");
                assert_eq!(action, "start");
            }
            other => panic!("erro inesperado: {:?}", other),
        }
    }

    #[test]
    fn only_in_progress_can_complete() {
        assert!(transition_target(InterventionStatus::InProgress, "complete").is_ok());
        assert!(transition_target(InterventionStatus::Scheduled, "complete").is_err());
        assert!(transition_target(InterventionStatus::Postponed, "complete").is_err());
    }

    #[test]
    fn cancel_allowed_from_active_states() {
        assert!(transition_target(InterventionStatus::Scheduled, "cancel").is_ok());
        assert!(transition_target(InterventionStatus::InProgress, "cancel").is_ok());
        assert!(transition_target(InterventionStatus::Postponed, "cancel").is_ok());
        assert!(transition_target(InterventionStatus::Completed, "cancel").is_err());
        assert!(transition_target(InterventionStatus::Cancelled, "cancel").is_err());
    }

    #[test]
    fn postpone_only_from_scheduled() {
        assert!(transition_target(InterventionStatus::Scheduled, "postpone").is_ok());
        assert!(transition_target(InterventionStatus::InProgress, "postpone").is_err());
    }
}
