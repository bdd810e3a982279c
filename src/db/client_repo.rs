// src/db/client_repo.rs

use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::clients::{
        ActivityAction, Client, ClientActivityLog, ClientContact, ClientContract, ClientDocument,
        ClientSite, ClientStatus, ClientType, CreateClientDocumentPayload, CreateClientPayload,
        CreateContactPayload, CreateContractPayload, CreateSitePayload, UpdateClientPayload,
    },
};

#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn create_client<'e, E>(
        &self,
        executor: E,
        client_number: &str,
        payload: &CreateClientPayload,
        created_by: Option<Uuid>,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (
                client_number, name, client_type,
                email, phone, secondary_email, secondary_phone,
                address, city, postal_code, country, latitude, longitude,
                contract_type, contract_start_date, contract_end_date,
                billing_address, billing_city, billing_postal_code,
                siret, siren, vat_number, preferred_payment_method, bank_details,
                visit_preferences, access_constraints, preferred_visit_days, preferred_visit_hours,
                notes, gdpr_consent, gdpr_consent_date, data_retention_until, created_by
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24,
                $25, $26, $27, $28, $29, $30,
                CASE WHEN $30 THEN NOW() ELSE NULL END, $31, $32
            )
            RETURNING *
            "#,
        )
        .bind(client_number)
        .bind(&payload.name)
        .bind(payload.client_type)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.secondary_email)
        .bind(&payload.secondary_phone)
        .bind(&payload.address)
        .bind(&payload.city)
        .bind(&payload.postal_code)
        .bind(payload.country.as_deref().unwrap_or("France"))
        .bind(payload.latitude)
        .bind(payload.longitude)
        .bind(payload.contract_type)
        .bind(payload.contract_start_date)
        .bind(payload.contract_end_date)
        .bind(&payload.billing_address)
        .bind(&payload.billing_city)
        .bind(&payload.billing_postal_code)
        .bind(&payload.siret)
        .bind(&payload.siren)
        .bind(&payload.vat_number)
        .bind(payload.preferred_payment_method)
        .bind(&payload.bank_details)
        .bind(&payload.visit_preferences)
        .bind(&payload.access_constraints)
        .bind(&payload.preferred_visit_days)
        .bind(&payload.preferred_visit_hours)
        .bind(&payload.notes)
        .bind(payload.gdpr_consent)
        .bind(payload.data_retention_until)
        .bind(created_by)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(format!(
                        "numéro client '{}'",
                        client_number
                    ));
                }
            }
            e.into()
        })
    }

    pub async fn find_client_by_id(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(client)
    }

    // Listagem com filtros opcionais. Os parâmetros nulos desligam o filtro.
    pub async fn list_clients(
        &self,
        status: Option<ClientStatus>,
        client_type: Option<ClientType>,
        q: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Client>, AppError> {
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT * FROM clients
            WHERE ($1::client_status IS NULL OR status = $1)
              AND ($2::client_type IS NULL OR client_type = $2)
              AND ($3::text IS NULL OR
                   name ILIKE '%' || $3 || '%'
                   OR client_number ILIKE '%' || $3 || '%'
                   OR email ILIKE '%' || $3 || '%')
            ORDER BY name ASC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(status)
        .bind(client_type)
        .bind(q)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    pub async fn update_client<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &UpdateClientPayload,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients SET
                name = COALESCE($2, name),
                client_type = COALESCE($3, client_type),
                status = COALESCE($4, status),
                email = COALESCE($5, email),
                phone = COALESCE($6, phone),
                secondary_email = COALESCE($7, secondary_email),
                secondary_phone = COALESCE($8, secondary_phone),
                address = COALESCE($9, address),
                city = COALESCE($10, city),
                postal_code = COALESCE($11, postal_code),
                country = COALESCE($12, country),
                latitude = COALESCE($13, latitude),
                longitude = COALESCE($14, longitude),
                contract_type = COALESCE($15, contract_type),
                contract_start_date = COALESCE($16, contract_start_date),
                contract_end_date = COALESCE($17, contract_end_date),
                billing_address = COALESCE($18, billing_address),
                billing_city = COALESCE($19, billing_city),
                billing_postal_code = COALESCE($20, billing_postal_code),
                siret = COALESCE($21, siret),
                siren = COALESCE($22, siren),
                vat_number = COALESCE($23, vat_number),
                preferred_payment_method = COALESCE($24, preferred_payment_method),
                bank_details = COALESCE($25, bank_details),
                visit_preferences = COALESCE($26, visit_preferences),
                access_constraints = COALESCE($27, access_constraints),
                preferred_visit_days = COALESCE($28, preferred_visit_days),
                preferred_visit_hours = COALESCE($29, preferred_visit_hours),
                notes = COALESCE($30, notes),
                is_active = COALESCE($31, is_active),
                data_retention_until = COALESCE($32, data_retention_until),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(payload.client_type)
        .bind(payload.status)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.secondary_email)
        .bind(&payload.secondary_phone)
        .bind(&payload.address)
        .bind(&payload.city)
        .bind(&payload.postal_code)
        .bind(&payload.country)
        .bind(payload.latitude)
        .bind(payload.longitude)
        .bind(payload.contract_type)
        .bind(payload.contract_start_date)
        .bind(payload.contract_end_date)
        .bind(&payload.billing_address)
        .bind(&payload.billing_city)
        .bind(&payload.billing_postal_code)
        .bind(&payload.siret)
        .bind(&payload.siren)
        .bind(&payload.vat_number)
        .bind(payload.preferred_payment_method)
        .bind(&payload.bank_details)
        .bind(&payload.visit_preferences)
        .bind(&payload.access_constraints)
        .bind(&payload.preferred_visit_days)
        .bind(&payload.preferred_visit_hours)
        .bind(&payload.notes)
        .bind(payload.is_active)
        .bind(payload.data_retention_until)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("client"))
    }

    pub async fn delete_client<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    // Registra o consentimento RGPD com carimbo de data
    pub async fn record_gdpr_consent<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        consent: bool,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET gdpr_consent = $2,
                gdpr_consent_date = CASE WHEN $2 THEN NOW() ELSE NULL END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(consent)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("client"))
    }

    // =========================================================================
    //  SITES
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
        let site = sqlx::query_as::<_, ClientSite>(
            r#"
            INSERT INTO client_sites (
                client_id, name, description, address, city, postal_code, country,
                latitude, longitude, contact_name, contact_phone, contact_email,
                access_instructions, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(client_id)
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(&payload.address)
        .bind(&payload.city)
        .bind(&payload.postal_code)
        .bind(payload.country.as_deref().unwrap_or("France"))
        .bind(payload.latitude)
        .bind(payload.longitude)
        .bind(&payload.contact_name)
        .bind(&payload.contact_phone)
        .bind(&payload.contact_email)
        .bind(&payload.access_instructions)
        .bind(&payload.notes)
        .fetch_one(executor)
        .await?;

        Ok(site)
    }

    pub async fn find_site_by_id(&self, id: Uuid) -> Result<Option<ClientSite>, AppError> {
        let site = sqlx::query_as::<_, ClientSite>("SELECT * FROM client_sites WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(site)
    }

    pub async fn list_sites(&self, client_id: Uuid) -> Result<Vec<ClientSite>, AppError> {
        let sites = sqlx::query_as::<_, ClientSite>(
            "SELECT * FROM client_sites WHERE client_id = $1 ORDER BY name ASC",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sites)
    }

    pub async fn delete_site<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM client_sites WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  CONTATOS
    // =========================================================================

    pub async fn create_contact<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        payload: &CreateContactPayload,
    ) -> Result<ClientContact, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contact = sqlx::query_as::<_, ClientContact>(
            r#"
            INSERT INTO client_contacts (
                client_id, first_name, last_name, role, position,
                email, phone, mobile, notes, is_primary
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(client_id)
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(payload.role)
        .bind(&payload.position)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.mobile)
        .bind(&payload.notes)
        .bind(payload.is_primary)
        .fetch_one(executor)
        .await?;

        Ok(contact)
    }

    pub async fn list_contacts(&self, client_id: Uuid) -> Result<Vec<ClientContact>, AppError> {
        let contacts = sqlx::query_as::<_, ClientContact>(
            r#"
            SELECT * FROM client_contacts
            WHERE client_id = $1
            ORDER BY is_primary DESC, last_name ASC, first_name ASC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(contacts)
    }

    pub async fn delete_contact<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM client_contacts WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  CONTRATOS
    // =========================================================================

    pub async fn create_contract<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        payload: &CreateContractPayload,
        created_by: Option<Uuid>,
    ) -> Result<ClientContract, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ClientContract>(
            r#"
            INSERT INTO client_contracts (
                client_id, contract_number, contract_type,
                start_date, end_date, renewal_date,
                monthly_amount, annual_amount, currency,
                description, terms_conditions, special_conditions, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(client_id)
        .bind(&payload.contract_number)
        .bind(payload.contract_type)
        .bind(payload.start_date)
        .bind(payload.end_date)
        .bind(payload.renewal_date)
        .bind(payload.monthly_amount)
        .bind(payload.annual_amount)
        .bind(payload.currency.as_deref().unwrap_or("EUR"))
        .bind(&payload.description)
        .bind(&payload.terms_conditions)
        .bind(&payload.special_conditions)
        .bind(created_by)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(format!(
                        "numéro de contrat '{}'",
                        payload.contract_number
                    ));
                }
            }
            e.into()
        })
    }

    pub async fn list_contracts(&self, client_id: Uuid) -> Result<Vec<ClientContract>, AppError> {
        let contracts = sqlx::query_as::<_, ClientContract>(
            "SELECT * FROM client_contracts WHERE client_id = $1 ORDER BY start_date DESC",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(contracts)
    }

    // =========================================================================
    //  DOCUMENTOS (apenas metadados)
    // =========================================================================

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
        let document = sqlx::query_as::<_, ClientDocument>(
            r#"
            INSERT INTO client_documents (
                client_id, document_type, title, description,
                file_path, file_size, file_type, uploaded_by, is_public
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(client_id)
        .bind(payload.document_type)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(&payload.file_path)
        .bind(payload.file_size)
        .bind(&payload.file_type)
        .bind(uploaded_by)
        .bind(payload.is_public)
        .fetch_one(executor)
        .await?;

        Ok(document)
    }

    pub async fn list_documents(&self, client_id: Uuid) -> Result<Vec<ClientDocument>, AppError> {
        let documents = sqlx::query_as::<_, ClientDocument>(
            "SELECT * FROM client_documents WHERE client_id = $1 ORDER BY uploaded_at DESC",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }

    // =========================================================================
    //  JOURNAL D'ACTIVITÉ
    // =========================================================================

    // Chamado dentro da mesma transação da escrita que ele descreve.
    pub async fn log_activity<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        action: ActivityAction,
        description: &str,
        old_values: Option<&Value>,
        new_values: Option<&Value>,
        user_id: Option<Uuid>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO client_activity_log (
                client_id, action, description, old_values, new_values, user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(client_id)
        .bind(action)
        .bind(description)
        .bind(old_values)
        .bind(new_values)
        .bind(user_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    // =========================================================================
    //  PROXIMITÉ (haversine em SQL, distâncias em metros na esfera WGS-84)
    // =========================================================================

    pub async fn nearby_clients(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
        limit: i64,
    ) -> Result<Vec<crate::models::geo::NearbyEntry>, AppError> {
        let entries = sqlx::query_as::<_, crate::models::geo::NearbyEntry>(
            r#"
            SELECT id, name, address, latitude, longitude, distance_meters
            FROM (
                SELECT id, name, address, latitude, longitude,
                       2 * 6371000.0 * asin(sqrt(
                           power(sin(radians(latitude - $1) / 2), 2) +
                           cos(radians($1)) * cos(radians(latitude)) *
                           power(sin(radians(longitude - $2) / 2), 2)
                       )) AS distance_meters
                FROM clients
                WHERE latitude IS NOT NULL AND longitude IS NOT NULL
            ) AS with_distance
            WHERE distance_meters <= $3
            ORDER BY distance_meters ASC
            LIMIT $4
            "#,
        )
        .bind(latitude)
        .bind(longitude)
        .bind(radius_meters)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn nearby_sites(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
        limit: i64,
    ) -> Result<Vec<crate::models::geo::NearbyEntry>, AppError> {
        let entries = sqlx::query_as::<_, crate::models::geo::NearbyEntry>(
            r#"
            SELECT id, name, address, latitude, longitude, distance_meters
            FROM (
                SELECT id, name, address, latitude, longitude,
                       2 * 6371000.0 * asin(sqrt(
                           power(sin(radians(latitude - $1) / 2), 2) +
                           cos(radians($1)) * cos(radians(latitude)) *
                           power(sin(radians(longitude - $2) / 2), 2)
                       )) AS distance_meters
                FROM client_sites
                WHERE latitude IS NOT NULL AND longitude IS NOT NULL
            ) AS with_distance
            WHERE distance_meters <= $3
            ORDER BY distance_meters ASC
            LIMIT $4
            "#,
        )
        .bind(latitude)
        .bind(longitude)
        .bind(radius_meters)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn list_activity(
        &self,
        client_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ClientActivityLog>, AppError> {
        let entries = sqlx::query_as::<_, ClientActivityLog>(
            r#"
            SELECT * FROM client_activity_log
            WHERE client_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(client_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
