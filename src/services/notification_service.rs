// src/services/notification_service.rs

use chrono::{NaiveTime, Utc};
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::{field_error, AppError},
    db::NotificationRepository,
    models::notifications::{
        CreateNotificationPayload, Notification, NotificationChannel, NotificationLog,
        NotificationLogAction, NotificationPreference, NotificationStatus, NotificationTemplate,
        NotificationTrigger, UpdatePreferencePayload,
    },
};

const MAX_RETRIES: i32 = 3;

// Substitui os placeholders {{chave}} pelos valores do contexto.
// Chaves ausentes ficam como estão, para não esconder um template mal preenchido.
pub fn render_template(template: &str, context: &Value) -> String {
    let mut rendered = template.to_string();

    if let Some(obj) = context.as_object() {
        for (key, value) in obj {
            let placeholder = format!("{{{{{}}}}}", key);
            let replacement = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            rendered = rendered.replace(&placeholder, &replacement);
        }
    }

    rendered
}

// Janela silenciosa, com suporte a faixas que cruzam a meia-noite
// (ex: 22:00 -> 07:00).
pub fn in_quiet_hours(now: NaiveTime, start: Option<NaiveTime>, end: Option<NaiveTime>) -> bool {
    match (start, end) {
        (Some(start), Some(end)) => {
            if start <= end {
                now >= start && now < end
            } else {
                now >= start || now < end
            }
        }
        _ => false,
    }
}

fn channel_enabled(preference: &NotificationPreference, channel: NotificationChannel) -> bool {
    match channel {
        NotificationChannel::Email => preference.email_enabled,
        NotificationChannel::Sms => preference.sms_enabled,
        NotificationChannel::Push => preference.push_enabled,
        NotificationChannel::InApp => preference.in_app_enabled,
    }
}

#[derive(Clone)]
pub struct NotificationService {
    repo: NotificationRepository,
    pool: PgPool,
}

impl NotificationService {
    pub fn new(repo: NotificationRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    // =========================================================================
    //  TEMPLATES
    // =========================================================================

    pub async fn create_template(
        &self,
        payload: &crate::models::notifications::CreateNotificationTemplatePayload,
        created_by: Option<Uuid>,
    ) -> Result<NotificationTemplate, AppError> {
        self.repo
            .create_template(&self.pool, payload, created_by)
            .await
    }

    pub async fn list_templates(&self) -> Result<Vec<NotificationTemplate>, AppError> {
        self.repo.list_templates().await
    }

    // =========================================================================
    //  CRÉATION
    // =========================================================================

    pub async fn create_notification(
        &self,
        payload: &CreateNotificationPayload,
    ) -> Result<Notification, AppError> {
        let context = payload.context.clone().unwrap_or_else(|| json!({}));

        // Ou o template resolve título/mensagem/canal, ou eles vêm diretos
        let (channel, title, message, template_id) = match payload.template_id {
            Some(template_id) => {
                let template = self
                    .repo
                    .find_template_by_id(&self.pool, template_id)
                    .await?
                    .ok_or(AppError::NotFound("notification template"))?;

                (
                    payload.channel.unwrap_or(template.channel),
                    render_template(&template.subject, &context),
                    render_template(&template.message, &context),
                    Some(template.id),
                )
            }
            None => {
                let title = payload
                    .title
                    .clone()
                    .ok_or_else(|| field_error("title", "required"))?;
                let message = payload
                    .message
                    .clone()
                    .ok_or_else(|| field_error("message", "required"))?;

                (
                    payload.channel.unwrap_or(NotificationChannel::InApp),
                    title,
                    message,
                    None,
                )
            }
        };

        let notification = self
            .repo
            .create_notification(
                &self.pool,
                payload.recipient,
                channel,
                template_id,
                &title,
                &message,
                payload.related_object_type.as_deref(),
                payload.related_object_id,
                &context,
            )
            .await?;

        self.dispatch(notification.clone());

        Ok(notification)
    }

    // Dispara a notificação para um gatilho de negócio. Usa o template ativo
    // do gatilho quando existe; caso contrário cai no in-app simples.
    pub async fn notify_trigger(
        &self,
        trigger: NotificationTrigger,
        recipient: Uuid,
        fallback_title: &str,
        fallback_message: &str,
        context: Value,
        related_object_type: &str,
        related_object_id: Uuid,
    ) -> Result<Notification, AppError> {
        let template: Option<NotificationTemplate> =
            self.repo.find_template_by_trigger(trigger).await?;

        let (channel, title, message, template_id) = match &template {
            Some(template) => (
                template.channel,
                render_template(&template.subject, &context),
                render_template(&template.message, &context),
                Some(template.id),
            ),
            None => (
                NotificationChannel::InApp,
                fallback_title.to_string(),
                fallback_message.to_string(),
                None,
            ),
        };

        let notification = self
            .repo
            .create_notification(
                &self.pool,
                recipient,
                channel,
                template_id,
                &title,
                &message,
                Some(related_object_type),
                Some(related_object_id),
                &context,
            )
            .await?;

        self.dispatch(notification.clone());

        Ok(notification)
    }

    // =========================================================================
    //  ENVOI (fire-and-forget)
    // =========================================================================

    // Entrega assíncrona: a requisição não espera o envio.
    pub fn dispatch(&self, notification: Notification) {
        let repo = self.repo.clone();
        let pool = self.pool.clone();

        tokio::spawn(async move {
            if let Err(e) = deliver(&repo, &pool, &notification).await {
                tracing::error!(
                    "Falha ao entregar a notificação {}: {}",
                    notification.id,
                    e
                );
                let _ = repo
                    .mark_failed(&pool, notification.id, &e.to_string())
                    .await;
                let _ = repo
                    .append_log(
                        &pool,
                        notification.id,
                        NotificationLogAction::Failed,
                        Some(&e.to_string()),
                    )
                    .await;
            }
        });
    }

    // =========================================================================
    //  CYCLE DE VIE
    // =========================================================================

    pub async fn list_for_recipient(
        &self,
        recipient: Uuid,
        status: Option<NotificationStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, AppError> {
        self.repo
            .list_for_recipient(recipient, status, limit, offset)
            .await
    }

    pub async fn count_unread(&self, recipient: Uuid) -> Result<i64, AppError> {
        self.repo.count_unread(recipient).await
    }

    pub async fn mark_read(&self, id: Uuid, recipient: Uuid) -> Result<Notification, AppError> {
        let notification = self
            .repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("notification"))?;

        // Só o destinatário pode marcar como lida
        if notification.recipient != recipient {
            return Err(AppError::NotFound("notification"));
        }

        let notification = self.repo.mark_read(&self.pool, id).await?;
        self.repo
            .append_log(&self.pool, id, NotificationLogAction::Read, None)
            .await?;

        Ok(notification)
    }

    pub async fn mark_delivered(&self, id: Uuid) -> Result<Notification, AppError> {
        let notification = self.repo.mark_delivered(&self.pool, id).await?;
        self.repo
            .append_log(&self.pool, id, NotificationLogAction::Delivered, None)
            .await?;

        Ok(notification)
    }

    // Reenfileira um envio que falhou, até o limite de tentativas
    pub async fn retry(&self, id: Uuid) -> Result<Notification, AppError> {
        let notification = self
            .repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("notification"))?;

        if notification.status != NotificationStatus::Failed {
            return Err(AppError::InvalidTransition {
                entity: "notification",
                current: notification.status.as_str().to_string(),
                action: "retry",
            });
        }

        if notification.retry_count >= MAX_RETRIES {
            return Err(AppError::RetryLimitReached);
        }

        let notification = self.repo.reset_for_retry(&self.pool, id).await?;
        self.repo
            .append_log(
                &self.pool,
                id,
                NotificationLogAction::Retry,
                Some(&format!("tentative {}", notification.retry_count + 1)),
            )
            .await?;

        self.dispatch(notification.clone());

        Ok(notification)
    }

    pub async fn list_logs(&self, notification_id: Uuid) -> Result<Vec<NotificationLog>, AppError> {
        self.repo.list_logs(notification_id).await
    }

    // =========================================================================
    //  PRÉFÉRENCES
    // =========================================================================

    pub async fn get_preferences(&self, user_id: Uuid) -> Result<NotificationPreference, AppError> {
        self.repo.get_or_create_preferences(user_id).await
    }

    pub async fn update_preferences(
        &self,
        user_id: Uuid,
        payload: &UpdatePreferencePayload,
    ) -> Result<NotificationPreference, AppError> {
        // Garante que a linha existe antes do UPDATE
        self.repo.get_or_create_preferences(user_id).await?;
        self.repo.update_preferences(user_id, payload).await
    }
}

// A entrega em si. SMS e push são registrados de forma estruturada; o envio
// real fica atrás de integrações externas fora deste serviço.
async fn deliver(
    repo: &NotificationRepository,
    pool: &PgPool,
    notification: &Notification,
) -> Result<(), AppError> {
    let preference = repo.get_or_create_preferences(notification.recipient).await?;

    if !channel_enabled(&preference, notification.channel) {
        repo.append_log(
            pool,
            notification.id,
            NotificationLogAction::Skipped,
            Some("canal désactivé par les préférences"),
        )
        .await?;
        return Ok(());
    }

    let quiet = in_quiet_hours(
        Utc::now().time(),
        preference.quiet_hours_start,
        preference.quiet_hours_end,
    );

    match notification.channel {
        NotificationChannel::Email => {
            tracing::info!(
                notification = %notification.id,
                "📧 E-mail '{}' para o usuário {}",
                notification.title,
                notification.recipient
            );
        }
        NotificationChannel::Sms => {
            tracing::info!(
                notification = %notification.id,
                "📱 SMS para o usuário {}: {}",
                notification.recipient,
                notification.message
            );
        }
        NotificationChannel::Push => {
            tracing::info!(
                notification = %notification.id,
                "🔔 Push para o usuário {}: {}",
                notification.recipient,
                notification.title
            );
        }
        // In-app já está no banco; nada a enviar
        NotificationChannel::InApp => {}
    }

    repo.mark_sent(pool, notification.id).await?;
    repo.append_log(
        pool,
        notification.id,
        NotificationLogAction::Sent,
        if quiet {
            Some("envoyé pendant les heures silencieuses")
        } else {
            None
        },
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_replaces_placeholders() {
        let context = json!({ "reference": "INT-2026-014", "client_name": "Les Tilleuls" });
        let rendered = render_template(
            "Intervention {{reference}} chez {{client_name}} terminée",
            &context,
        );
        assert_eq!(rendered, "Intervention INT-2026-014 chez Les Tilleuls terminée");
    }

    #[test]
    fn render_keeps_unknown_placeholders() {
        let rendered = render_template("Bonjour {{name}}", &json!({}));
        assert_eq!(rendered, "Bonjour {{name}}");
    }

    #[test]
    fn render_stringifies_non_string_values() {
        let rendered = render_template("{{count}} fuites", &json!({ "count": 3 }));
        assert_eq!(rendered, "3 fuites");
    }

    #[test]
    fn quiet_hours_simple_window() {
        let start = NaiveTime::from_hms_opt(12, 0, 0);
        let end = NaiveTime::from_hms_opt(14, 0, 0);
        assert!(in_quiet_hours(NaiveTime::from_hms_opt(13, 0, 0).unwrap(), start, end));
        assert!(!in_quiet_hours(NaiveTime::from_hms_opt(15, 0, 0).unwrap(), start, end));
    }

    #[test]
    fn quiet_hours_wrap_midnight() {
        let start = NaiveTime::from_hms_opt(22, 0, 0);
        let end = NaiveTime::from_hms_opt(7, 0, 0);
        assert!(in_quiet_hours(NaiveTime::from_hms_opt(23, 30, 0).unwrap(), start, end));
        assert!(in_quiet_hours(NaiveTime::from_hms_opt(6, 0, 0).unwrap(), start, end));
        assert!(!in_quiet_hours(NaiveTime::from_hms_opt(12, 0, 0).unwrap(), start, end));
    }

    #[test]
    fn quiet_hours_absent_means_never() {
        assert!(!in_quiet_hours(NaiveTime::from_hms_opt(3, 0, 0).unwrap(), None, None));
    }
}
