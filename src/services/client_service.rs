// src/services/client_service.rs

use serde_json::json;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{field_error, AppError},
    db::ClientRepository,
    models::clients::{
        ActivityAction, Client, ClientActivityLog, ClientContact, ClientContract, ClientDocument,
        ClientSite, ClientStatus, ClientType, CreateClientDocumentPayload, CreateClientPayload,
        CreateContactPayload, CreateContractPayload, CreateSitePayload, UpdateClientPayload,
    },
};

#[derive(Clone)]
pub struct ClientService {
    repo: ClientRepository,
}

// Gera o número único do cliente (CLI-XXXXXXXX)
pub fn generate_client_number() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("CLI-{}", id[..8].to_uppercase())
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

// SIRET/SIREN: o tamanho é validado pelo `validator`, aqui só os dígitos.
fn check_registration_numbers(
    siret: Option<&str>,
    siren: Option<&str>,
) -> Result<(), AppError> {
    if let Some(siret) = siret {
        if !is_all_digits(siret) {
            return Err(field_error("siret", "invalid_siret"));
        }
    }
    if let Some(siren) = siren {
        if !is_all_digits(siren) {
            return Err(field_error("siren", "invalid_siren"));
        }
    }
    Ok(())
}

impl ClientService {
    pub fn new(repo: ClientRepository) -> Self {
        Self { repo }
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn create_client<'e, E>(
        &self,
        executor: E,
        payload: &CreateClientPayload,
        created_by: Option<Uuid>,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        check_registration_numbers(payload.siret.as_deref(), payload.siren.as_deref())?;

        let client_number = generate_client_number();

        let mut tx = executor.begin().await?;

        let client = self
            .repo
            .create_client(&mut *tx, &client_number, payload, created_by)
            .await?;

        // Auditoria na mesma transação da escrita
        self.repo
            .log_activity(
                &mut *tx,
                client.id,
                ActivityAction::Created,
                &format!("Client {} créé", client.client_number),
                None,
                Some(&json!({ "name": client.name, "clientNumber": client.client_number })),
                created_by,
            )
            .await?;

        tx.commit().await?;

        Ok(client)
    }

    pub async fn get_client(&self, id: Uuid) -> Result<Client, AppError> {
        self.repo
            .find_client_by_id(id)
            .await?
            .ok_or(AppError::NotFound("client"))
    }

    pub async fn list_clients(
        &self,
        status: Option<ClientStatus>,
        client_type: Option<ClientType>,
        q: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Client>, AppError> {
        self.repo
            .list_clients(status, client_type, q, limit, offset)
            .await
    }

    pub async fn update_client<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &UpdateClientPayload,
        user_id: Option<Uuid>,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        check_registration_numbers(payload.siret.as_deref(), payload.siren.as_deref())?;

        // Valores antigos para o journal
        let old = self
            .repo
            .find_client_by_id(id)
            .await?
            .ok_or(AppError::NotFound("client"))?;

        let mut tx = executor.begin().await?;

        let client = self.repo.update_client(&mut *tx, id, payload).await?;

        self.repo
            .log_activity(
                &mut *tx,
                id,
                ActivityAction::Updated,
                &format!("Client {} modifié", client.client_number),
                Some(&json!({ "name": old.name, "status": old.status })),
                Some(&json!({ "name": client.name, "status": client.status })),
                user_id,
            )
            .await?;

        tx.commit().await?;

        Ok(client)
    }

    pub async fn delete_client<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // O journal é apagado em cascata junto com o cliente
        let deleted = self.repo.delete_client(executor, id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound("client"));
        }
        Ok(())
    }

    pub async fn record_gdpr_consent<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        consent: bool,
        user_id: Option<Uuid>,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let client = self.repo.record_gdpr_consent(&mut *tx, id, consent).await?;

        self.repo
            .log_activity(
                &mut *tx,
                id,
                ActivityAction::Updated,
                if consent {
                    "Consentement RGPD enregistré"
                } else {
                    "Consentement RGPD retiré"
                },
                None,
                Some(&json!({ "gdprConsent": consent })),
                user_id,
            )
            .await?;

        tx.commit().await?;

        Ok(client)
    }

    pub async fn list_activity(
        &self,
        client_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ClientActivityLog>, AppError> {
        self.repo.list_activity(client_id, limit).await
    }

    // =========================================================================
    //  SITES / CONTACTS / CONTRATS / DOCUMENTS
    // =========================================================================

    pub async fn create_site<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        payload: &CreateSitePayload,
    ) -> Result<ClientSite, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // O site referencia o cliente; um id inexistente vira 404 e não 500
        self.get_client(client_id).await?;
        self.repo.create_site(executor, client_id, payload).await
    }

    pub async fn list_sites(&self, client_id: Uuid) -> Result<Vec<ClientSite>, AppError> {
        self.repo.list_sites(client_id).await
    }

    pub async fn delete_site<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deleted = self.repo.delete_site(executor, id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound("site"));
        }
        Ok(())
    }

    pub async fn create_contact<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        payload: &CreateContactPayload,
    ) -> Result<ClientContact, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.get_client(client_id).await?;
        self.repo.create_contact(executor, client_id, payload).await
    }

    pub async fn list_contacts(&self, client_id: Uuid) -> Result<Vec<ClientContact>, AppError> {
        self.repo.list_contacts(client_id).await
    }

    pub async fn delete_contact<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deleted = self.repo.delete_contact(executor, id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound("contact"));
        }
        Ok(())
    }

    pub async fn create_contract<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        payload: &CreateContractPayload,
        created_by: Option<Uuid>,
    ) -> Result<ClientContract, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        self.get_client(client_id).await?;

        let mut tx = executor.begin().await?;

        let contract = self
            .repo
            .create_contract(&mut *tx, client_id, payload, created_by)
            .await?;

        self.repo
            .log_activity(
                &mut *tx,
                client_id,
                ActivityAction::Created,
                &format!("Contrat {} créé", contract.contract_number),
                None,
                Some(&json!({ "contractNumber": contract.contract_number })),
                created_by,
            )
            .await?;

        tx.commit().await?;

        Ok(contract)
    }

    pub async fn list_contracts(&self, client_id: Uuid) -> Result<Vec<ClientContract>, AppError> {
        self.repo.list_contracts(client_id).await
    }

    pub async fn create_document<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        payload: &CreateClientDocumentPayload,
        uploaded_by: Option<Uuid>,
    ) -> Result<ClientDocument, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.get_client(client_id).await?;
        self.repo
            .create_document(executor, client_id, payload, uploaded_by)
            .await
    }

    pub async fn list_documents(&self, client_id: Uuid) -> Result<Vec<ClientDocument>, AppError> {
        self.repo.list_documents(client_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_number_has_expected_shape() {
        let number = generate_client_number();
        assert!(number.starts_with("CLI-"));
        assert_eq!(number.len(), 12);
        assert!(number[4..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn client_numbers_are_unique_enough() {
        let a = generate_client_number();
        let b = generate_client_number();
        assert_ne!(a, b);
    }

    #[test]
    fn siret_with_letters_is_rejected() {
        let err = check_registration_numbers(Some("1234567890123A"), None).unwrap_err();
        match err {
            AppError::ValidationError(errors) => {
                assert!(errors.field_errors().contains_key("siret"));
            }
            other => panic!("erro inesperado: {:?}", other),
        }
    }

    #[test]
    fn valid_registration_numbers_pass() {
        assert!(check_registration_numbers(Some("12345678901234"), Some("123456789")).is_ok());
        assert!(check_registration_numbers(None, None).is_ok());
    }
}
