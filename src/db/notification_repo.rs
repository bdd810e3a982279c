// src/db/notification_repo.rs

use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::notifications::{
        CreateNotificationTemplatePayload, Notification, NotificationChannel, NotificationLog,
        NotificationLogAction, NotificationPreference, NotificationStatus, NotificationTemplate,
        NotificationTrigger, UpdatePreferencePayload,
    },
};

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  TEMPLATES
    // =========================================================================

    pub async fn create_template<'e, E>(
        &self,
        executor: E,
        payload: &CreateNotificationTemplatePayload,
        created_by: Option<Uuid>,
    ) -> Result<NotificationTemplate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let template = sqlx::query_as::<_, NotificationTemplate>(
            r#"
            INSERT INTO notification_templates (name, channel, trigger, subject, message, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(payload.channel)
        .bind(payload.trigger)
        .bind(&payload.subject)
        .bind(&payload.message)
        .bind(created_by)
        .fetch_one(executor)
        .await?;

        Ok(template)
    }

    pub async fn find_template_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<NotificationTemplate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let template = sqlx::query_as::<_, NotificationTemplate>(
            "SELECT * FROM notification_templates WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(template)
    }

    // Primeiro template ativo que reage ao gatilho
    pub async fn find_template_by_trigger(
        &self,
        trigger: NotificationTrigger,
    ) -> Result<Option<NotificationTemplate>, AppError> {
        let template = sqlx::query_as::<_, NotificationTemplate>(
            r#"
            SELECT * FROM notification_templates
            WHERE trigger = $1 AND is_active
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(trigger)
        .fetch_optional(&self.pool)
        .await?;

        Ok(template)
    }

    pub async fn list_templates(&self) -> Result<Vec<NotificationTemplate>, AppError> {
        let templates = sqlx::query_as::<_, NotificationTemplate>(
            "SELECT * FROM notification_templates WHERE is_active ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(templates)
    }

    // =========================================================================
    //  NOTIFICATIONS
    // =========================================================================

    pub async fn create_notification<'e, E>(
        &self,
        executor: E,
        recipient: Uuid,
        channel: NotificationChannel,
        template_id: Option<Uuid>,
        title: &str,
        message: &str,
        related_object_type: Option<&str>,
        related_object_id: Option<Uuid>,
        data: &Value,
    ) -> Result<Notification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (
                recipient, channel, template_id, title, message,
                related_object_type, related_object_id, data
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(recipient)
        .bind(channel)
        .bind(template_id)
        .bind(title)
        .bind(message)
        .bind(related_object_type)
        .bind(related_object_id)
        .bind(data)
        .fetch_one(executor)
        .await?;

        Ok(notification)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Notification>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let notification =
            sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = $1")
                .bind(id)
                .fetch_optional(executor)
                .await?;

        Ok(notification)
    }

    pub async fn list_for_recipient(
        &self,
        recipient: Uuid,
        status: Option<NotificationStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, AppError> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE recipient = $1
              AND ($2::notification_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(recipient)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    pub async fn count_unread(&self, recipient: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM notifications
            WHERE recipient = $1 AND status IN ('pending', 'sent', 'delivered')
            "#,
        )
        .bind(recipient)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    // Transições de entrega. Cada carimbo só é gravado pela transição que o define.
    pub async fn mark_sent<'e, E>(&self, executor: E, id: Uuid) -> Result<Notification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET status = 'sent', sent_at = NOW(), error_message = NULL, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("notification"))
    }

    pub async fn mark_delivered<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Notification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET status = 'delivered', delivered_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("notification"))
    }

    pub async fn mark_read<'e, E>(&self, executor: E, id: Uuid) -> Result<Notification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET status = 'read', read_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("notification"))
    }

    pub async fn mark_failed<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        error_message: &str,
    ) -> Result<Notification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET status = 'failed', error_message = $2, retry_count = retry_count + 1,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(error_message)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("notification"))
    }

    pub async fn reset_for_retry<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Notification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET status = 'pending', error_message = NULL, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("notification"))
    }

    // =========================================================================
    //  LOGS / PRÉFÉRENCES
    // =========================================================================

    pub async fn append_log<'e, E>(
        &self,
        executor: E,
        notification_id: Uuid,
        action: NotificationLogAction,
        details: Option<&str>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO notification_logs (notification_id, action, details)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(notification_id)
        .bind(action)
        .bind(details)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn list_logs(&self, notification_id: Uuid) -> Result<Vec<NotificationLog>, AppError> {
        let logs = sqlx::query_as::<_, NotificationLog>(
            "SELECT * FROM notification_logs WHERE notification_id = $1 ORDER BY created_at ASC",
        )
        .bind(notification_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }

    // Cria a linha de preferências na primeira consulta (defaults do schema)
    pub async fn get_or_create_preferences(
        &self,
        user_id: Uuid,
    ) -> Result<NotificationPreference, AppError> {
        let preference = sqlx::query_as::<_, NotificationPreference>(
            r#"
            INSERT INTO notification_preferences (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING *
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(preference)
    }

    pub async fn update_preferences(
        &self,
        user_id: Uuid,
        payload: &UpdatePreferencePayload,
    ) -> Result<NotificationPreference, AppError> {
        sqlx::query_as::<_, NotificationPreference>(
            r#"
            UPDATE notification_preferences SET
                email_enabled = COALESCE($2, email_enabled),
                sms_enabled = COALESCE($3, sms_enabled),
                push_enabled = COALESCE($4, push_enabled),
                in_app_enabled = COALESCE($5, in_app_enabled),
                quiet_hours_start = COALESCE($6, quiet_hours_start),
                quiet_hours_end = COALESCE($7, quiet_hours_end),
                timezone = COALESCE($8, timezone),
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(payload.email_enabled)
        .bind(payload.sms_enabled)
        .bind(payload.push_enabled)
        .bind(payload.in_app_enabled)
        .bind(payload.quiet_hours_start)
        .bind(payload.quiet_hours_end)
        .bind(&payload.timezone)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("notification preferences"))
    }
}
