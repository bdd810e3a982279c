// src/models/clients.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "client_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ClientType {
    Individual,
    Company,
    Public,
    Syndic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "client_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    Active,
    Inactive,
    Prospect,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "contract_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    Maintenance,
    Detection,
    Emergency,
    Consulting,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "contract_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Draft,
    Active,
    Suspended,
    Expired,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    Check,
    Card,
    Cash,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "contact_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContactRole {
    Primary,
    Technical,
    Billing,
    Emergency,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "client_document_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ClientDocumentType {
    Contract,
    Invoice,
    Plan,
    Photo,
    Report,
    Certificate,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "activity_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Created,
    Updated,
    Deleted,
    Viewed,
    Contacted,
    Visited,
    Other,
}

// --- CLIENTE ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,

    // Número único gerado na criação (CLI-XXXXXXXX)
    #[schema(example = "CLI-9F3A21BC")]
    pub client_number: String,

    #[schema(example = "Copropriété Les Tilleuls")]
    pub name: String,
    pub client_type: ClientType,
    pub status: ClientStatus,

    // Contato
    pub email: Option<String>,
    pub phone: Option<String>,
    pub secondary_email: Option<String>,
    pub secondary_phone: Option<String>,

    // Endereço principal
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    // Resumo contratual
    pub contract_type: Option<ContractType>,
    pub contract_start_date: Option<NaiveDate>,
    pub contract_end_date: Option<NaiveDate>,

    // Faturamento
    pub billing_address: Option<String>,
    pub billing_city: Option<String>,
    pub billing_postal_code: Option<String>,
    #[schema(example = "12345678901234")]
    pub siret: Option<String>,
    pub siren: Option<String>,
    pub vat_number: Option<String>,
    pub preferred_payment_method: Option<PaymentMethod>,
    pub bank_details: Option<String>,

    // Preferências de visita
    pub visit_preferences: Option<String>,
    pub access_constraints: Option<String>,
    pub preferred_visit_days: Option<String>,
    pub preferred_visit_hours: Option<String>,

    pub notes: Option<String>,
    pub is_active: bool,

    // RGPD
    pub gdpr_consent: bool,
    pub gdpr_consent_date: Option<DateTime<Utc>>,
    pub data_retention_until: Option<NaiveDate>,

    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientSite {
    pub id: Uuid,
    pub client_id: Uuid,

    #[schema(example = "Bâtiment B - Chaufferie")]
    pub name: String,
    pub description: Option<String>,

    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,

    pub access_instructions: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientContact {
    pub id: Uuid,
    pub client_id: Uuid,

    pub first_name: String,
    pub last_name: String,
    pub role: ContactRole,
    pub position: Option<String>,

    pub email: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,

    pub notes: Option<String>,
    pub is_primary: bool,
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientContract {
    pub id: Uuid,
    pub client_id: Uuid,

    #[schema(example = "CTR-2026-0042")]
    pub contract_number: String,
    pub contract_type: ContractType,
    pub status: ContractStatus,

    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub renewal_date: Option<NaiveDate>,

    #[schema(example = "180.00")]
    pub monthly_amount: Option<Decimal>,
    pub annual_amount: Option<Decimal>,
    pub currency: String,

    pub description: Option<String>,
    pub terms_conditions: Option<String>,
    pub special_conditions: Option<String>,

    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Documento de cliente: apenas o registro (caminho/tamanho/tipo). O upload
// físico fica fora da API JSON.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientDocument {
    pub id: Uuid,
    pub client_id: Uuid,

    pub document_type: ClientDocumentType,
    pub title: String,
    pub description: Option<String>,

    pub file_path: String,
    pub file_size: Option<i32>,
    pub file_type: Option<String>,

    pub uploaded_by: Option<Uuid>,
    pub uploaded_at: DateTime<Utc>,
    pub is_public: bool,
}

// Trilha de auditoria por cliente: toda escrita registra uma linha aqui,
// na mesma transação.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientActivityLog {
    pub id: Uuid,
    pub client_id: Uuid,

    pub action: ActivityAction,
    pub description: String,

    pub old_values: Option<Value>,
    pub new_values: Option<Value>,

    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Copropriété Les Tilleuls")]
    pub name: String,
    pub client_type: ClientType,

    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub secondary_email: Option<String>,
    pub secondary_phone: Option<String>,

    #[validate(length(min = 1, message = "required"))]
    pub address: String,
    #[validate(length(min = 1, message = "required"))]
    pub city: String,
    #[validate(length(min = 1, message = "required"))]
    pub postal_code: String,
    #[serde(default)]
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub contract_type: Option<ContractType>,
    pub contract_start_date: Option<NaiveDate>,
    pub contract_end_date: Option<NaiveDate>,

    pub billing_address: Option<String>,
    pub billing_city: Option<String>,
    pub billing_postal_code: Option<String>,
    #[validate(length(equal = 14, message = "invalid_siret"))]
    pub siret: Option<String>,
    #[validate(length(equal = 9, message = "invalid_siren"))]
    pub siren: Option<String>,
    pub vat_number: Option<String>,
    pub preferred_payment_method: Option<PaymentMethod>,
    pub bank_details: Option<String>,

    pub visit_preferences: Option<String>,
    pub access_constraints: Option<String>,
    pub preferred_visit_days: Option<String>,
    pub preferred_visit_hours: Option<String>,

    pub notes: Option<String>,
    #[serde(default)]
    pub gdpr_consent: bool,
    pub data_retention_until: Option<NaiveDate>,
}

// Atualização parcial: campos ausentes são preservados (COALESCE no repo)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientPayload {
    pub name: Option<String>,
    pub client_type: Option<ClientType>,
    pub status: Option<ClientStatus>,

    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub secondary_email: Option<String>,
    pub secondary_phone: Option<String>,

    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub contract_type: Option<ContractType>,
    pub contract_start_date: Option<NaiveDate>,
    pub contract_end_date: Option<NaiveDate>,

    pub billing_address: Option<String>,
    pub billing_city: Option<String>,
    pub billing_postal_code: Option<String>,
    #[validate(length(equal = 14, message = "invalid_siret"))]
    pub siret: Option<String>,
    #[validate(length(equal = 9, message = "invalid_siren"))]
    pub siren: Option<String>,
    pub vat_number: Option<String>,
    pub preferred_payment_method: Option<PaymentMethod>,
    pub bank_details: Option<String>,

    pub visit_preferences: Option<String>,
    pub access_constraints: Option<String>,
    pub preferred_visit_days: Option<String>,
    pub preferred_visit_hours: Option<String>,

    pub notes: Option<String>,
    pub is_active: Option<bool>,
    pub data_retention_until: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSitePayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub description: Option<String>,

    #[validate(length(min = 1, message = "required"))]
    pub address: String,
    #[validate(length(min = 1, message = "required"))]
    pub city: String,
    #[validate(length(min = 1, message = "required"))]
    pub postal_code: String,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub contact_email: Option<String>,

    pub access_instructions: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactPayload {
    #[validate(length(min = 1, message = "required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "required"))]
    pub last_name: String,
    pub role: ContactRole,
    pub position: Option<String>,

    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,

    pub notes: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContractPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "CTR-2026-0042")]
    pub contract_number: String,
    pub contract_type: ContractType,

    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub renewal_date: Option<NaiveDate>,

    pub monthly_amount: Option<Decimal>,
    pub annual_amount: Option<Decimal>,
    pub currency: Option<String>,

    pub description: Option<String>,
    pub terms_conditions: Option<String>,
    pub special_conditions: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientDocumentPayload {
    pub document_type: ClientDocumentType,
    #[validate(length(min = 1, message = "required"))]
    pub title: String,
    pub description: Option<String>,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "clients/2026/plan-reseau.pdf")]
    pub file_path: String,
    pub file_size: Option<i32>,
    pub file_type: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}
