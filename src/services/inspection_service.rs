// src/services/inspection_service.rs

use chrono::{NaiveDate, Utc};
use serde_json::Value;
use sqlx::{Acquire, Executor, Postgres};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::InspectionRepository,
    models::inspections::{
        CreateInspectionPayload, CreateItemPayload, CreateMediaPayload, CreateSignaturePayload,
        CreateTemplatePayload, FieldType, Inspection, InspectionItem, InspectionMedia,
        InspectionSignature, InspectionStatus, InspectionTemplate, UpdateInspectionPayload,
        UpdateItemValuePayload,
    },
};

// Máquina de estados das inspeções
pub fn transition_target(
    current: InspectionStatus,
    action: &'static str,
) -> Result<InspectionStatus, AppError> {
    use InspectionStatus::*;

    let target = match (action, current) {
        ("start", Draft) => Some(InProgress),
        ("complete", InProgress) => Some(Completed),
        ("validate", Completed) => Some(Validated),
        ("reject", Completed) => Some(Rejected),
        _ => None,
    };

    target.ok_or(AppError::InvalidTransition {
        entity: "inspection",
        current: current.as_str().to_string(),
        action,
    })
}

// --- MOTEUR DE VALIDATION ---
// Valida os valores coletados contra os campos tipados da inspeção.
// O valor de um campo é o `value` do item ou, na falta dele, a entrada
// correspondente no form_data do documento.
pub fn validate_form_data(
    items: &[InspectionItem],
    form_data: &Value,
) -> Result<(), AppError> {
    let doc = form_data.as_object();

    // Mapa de erros: chave do campo -> código do erro
    let mut errors: HashMap<String, String> = HashMap::new();

    for item in items {
        let value = item
            .value
            .as_ref()
            .or_else(|| doc.and_then(|d| d.get(&item.key_name)));

        // Obrigatoriedade: ausente OU null
        if item.is_required && value.is_none_or(Value::is_null) {
            errors.insert(item.key_name.clone(), "required".to_string());
            continue;
        }

        let Some(value) = value else { continue };
        if value.is_null() {
            continue;
        }

        let valid = match item.field_type {
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Multiselect => value.is_array(),
            FieldType::Text | FieldType::Select => value.is_string(),

            // Validação real de data (YYYY-MM-DD)
            FieldType::Date => value
                .as_str()
                .is_some_and(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()),
        };

        if !valid {
            let code = match item.field_type {
                FieldType::Number => "invalid_number",
                FieldType::Date => "invalid_date_format",
                FieldType::Boolean => "invalid_boolean",
                FieldType::Multiselect => "invalid_list",
                _ => "invalid_text",
            };
            errors.insert(item.key_name.clone(), code.to_string());
        }
    }

    if !errors.is_empty() {
        return Err(AppError::FormValidationError(errors));
    }

    Ok(())
}

#[derive(Clone)]
pub struct InspectionService {
    repo: InspectionRepository,
}

impl InspectionService {
    pub fn new(repo: InspectionRepository) -> Self {
        Self { repo }
    }

    // =========================================================================
    //  MODÈLES
    // =========================================================================

    pub async fn create_template<'e, E>(
        &self,
        executor: E,
        payload: &CreateTemplatePayload,
    ) -> Result<InspectionTemplate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.create_template(executor, payload).await
    }

    pub async fn list_templates(&self, only_active: bool) -> Result<Vec<InspectionTemplate>, AppError> {
        self.repo.list_templates(only_active).await
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
        self.repo.create_inspection(executor, payload).await
    }

    pub async fn get_inspection(
        &self,
        pool: &sqlx::PgPool,
        id: Uuid,
    ) -> Result<Inspection, AppError> {
        self.repo
            .find_by_id(pool, id)
            .await?
            .ok_or(AppError::NotFound("inspection"))
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
        self.repo
            .list_inspections(status, client_id, inspector, q, limit, offset)
            .await
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
        self.repo.update_inspection(executor, id, payload).await
    }

    pub async fn delete_inspection<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deleted = self.repo.delete_inspection(executor, id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound("inspection"));
        }
        Ok(())
    }

    // =========================================================================
    //  WORKFLOW
    // =========================================================================

    pub async fn start<'e, E>(&self, executor: E, id: Uuid) -> Result<Inspection, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let inspection = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("inspection"))?;

        let target = transition_target(inspection.status, "start")?;

        let inspection = self.repo.update_status(&mut *tx, id, target, None).await?;

        tx.commit().await?;

        Ok(inspection)
    }

    // Concluir exige que os campos obrigatórios estejam preenchidos
    // com o tipo declarado.
    pub async fn complete<'e, E>(&self, executor: E, id: Uuid) -> Result<Inspection, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let inspection = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("inspection"))?;

        let target = transition_target(inspection.status, "complete")?;

        let items = self.repo.list_items(&mut *tx, id).await?;
        validate_form_data(&items, &inspection.form_data)?;

        let inspection = self
            .repo
            .update_status(&mut *tx, id, target, Some(Utc::now()))
            .await?;

        tx.commit().await?;

        Ok(inspection)
    }

    pub async fn validate<'e, E>(&self, executor: E, id: Uuid) -> Result<Inspection, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let inspection = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("inspection"))?;

        let target = transition_target(inspection.status, "validate")?;

        let inspection = self.repo.update_status(&mut *tx, id, target, None).await?;

        tx.commit().await?;

        Ok(inspection)
    }

    pub async fn reject<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        reason: &str,
    ) -> Result<Inspection, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if reason.trim().is_empty() {
            return Err(crate::common::error::field_error("reason", "required"));
        }

        let mut tx = executor.begin().await?;

        let inspection = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("inspection"))?;

        let target = transition_target(inspection.status, "reject")?;

        let inspection = self
            .repo
            .update_status_with_reason(&mut *tx, id, target, reason)
            .await?;

        tx.commit().await?;

        Ok(inspection)
    }

    // =========================================================================
    //  ITEMS / MÉDIAS / SIGNATURES
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
        self.repo.create_item(executor, inspection_id, payload).await
    }

    pub async fn list_items(
        &self,
        pool: &sqlx::PgPool,
        inspection_id: Uuid,
    ) -> Result<Vec<InspectionItem>, AppError> {
        self.repo.list_items(pool, inspection_id).await
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
        self.repo.update_item_value(executor, item_id, payload).await
    }

    pub async fn create_media<'e, E>(
        &self,
        executor: E,
        inspection_id: Uuid,
        payload: &CreateMediaPayload,
    ) -> Result<InspectionMedia, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.create_media(executor, inspection_id, payload).await
    }

    pub async fn list_media(&self, inspection_id: Uuid) -> Result<Vec<InspectionMedia>, AppError> {
        self.repo.list_media(inspection_id).await
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
        self.repo
            .create_signature(executor, inspection_id, payload)
            .await
    }

    pub async fn list_signatures(
        &self,
        inspection_id: Uuid,
    ) -> Result<Vec<InspectionSignature>, AppError> {
        self.repo.list_signatures(inspection_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn item(key: &str, field_type: FieldType, required: bool, value: Option<Value>) -> InspectionItem {
        InspectionItem {
            id: Uuid::new_v4(),
            inspection_id: Uuid::new_v4(),
            name: key.to_string(),
            key_name: key.to_string(),
            description: None,
            field_type,
            options: None,
            is_required: required,
            value,
            is_checked: false,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn error_map(err: AppError) -> HashMap<String, String> {
        match err {
            AppError::FormValidationError(map) => map,
            other => panic!("erro inesperado: {:?}", other),
        }
    }

    #[test]
    fn missing_required_field_is_reported() {
        let items = vec![item("pressure_bar", FieldType::Number, true, None)];
        let errors = error_map(validate_form_data(&items, &json!({})).unwrap_err());
        assert_eq!(errors["pressure_bar"], "required");
    }

    #[test]
    fn value_can_come_from_form_data() {
        let items = vec![item("pressure_bar", FieldType::Number, true, None)];
        let data = json!({ "pressure_bar": 3.2 });
        assert!(validate_form_data(&items, &data).is_ok());
    }

    #[test]
    fn item_value_takes_precedence() {
        let items = vec![item("pressure_bar", FieldType::Number, true, Some(json!(2.8)))];
        // O form_data traz lixo, mas o valor do item vale primeiro
        let data = json!({ "pressure_bar": "n/a" });
        assert!(validate_form_data(&items, &data).is_ok());
    }

    #[test]
    fn type_mismatches_use_specific_codes() {
        let items = vec![
            item("flow", FieldType::Number, false, Some(json!("beaucoup"))),
            item("leak_found", FieldType::Boolean, false, Some(json!("oui"))),
            item("zones", FieldType::Multiselect, false, Some(json!("cave"))),
            item("visited_on", FieldType::Date, false, Some(json!("14/02/2026"))),
        ];
        let errors = error_map(validate_form_data(&items, &json!({})).unwrap_err());
        assert_eq!(errors["flow"], "invalid_number");
        assert_eq!(errors["leak_found"], "invalid_boolean");
        assert_eq!(errors["zones"], "invalid_list");
        assert_eq!(errors["visited_on"], "invalid_date_format");
    }

    #[test]
    fn iso_date_passes() {
        let items = vec![item("visited_on", FieldType::Date, true, Some(json!("2026-02-14")))];
        assert!(validate_form_data(&items, &json!({})).is_ok());
    }

    #[test]
    fn optional_null_is_fine() {
        let items = vec![item("notes", FieldType::Text, false, Some(Value::Null))];
        assert!(validate_form_data(&items, &json!({})).is_ok());
    }

    #[test]
    fn draft_starts_and_completed_validates() {
        assert_eq!(
            transition_target(InspectionStatus::Draft, "start").unwrap(),
            InspectionStatus::InProgress
        );
        assert_eq!(
            transition_target(InspectionStatus::Completed, "validate").unwrap(),
            InspectionStatus::Validated
        );
        assert!(transition_target(InspectionStatus::Validated, "reject").is_err());
        assert!(transition_target(InspectionStatus::Draft, "complete").is_err());
    }
}
