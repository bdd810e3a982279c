// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Clients ---
        handlers::clients::create_client,
        handlers::clients::list_clients,
        handlers::clients::get_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,
        handlers::clients::record_gdpr_consent,
        handlers::clients::list_activity,
        handlers::clients::create_site,
        handlers::clients::list_sites,
        handlers::clients::delete_site,
        handlers::clients::create_contact,
        handlers::clients::list_contacts,
        handlers::clients::delete_contact,
        handlers::clients::create_contract,
        handlers::clients::list_contracts,
        handlers::clients::create_document,
        handlers::clients::list_documents,

        // --- Interventions ---
        handlers::interventions::create_intervention,
        handlers::interventions::list_interventions,
        handlers::interventions::calendar,
        handlers::interventions::stats,
        handlers::interventions::get_intervention,
        handlers::interventions::update_intervention,
        handlers::interventions::delete_intervention,
        handlers::interventions::start_intervention,
        handlers::interventions::complete_intervention,
        handlers::interventions::cancel_intervention,
        handlers::interventions::postpone_intervention,
        handlers::interventions::create_task,
        handlers::interventions::list_tasks,
        handlers::interventions::set_task_status,
        handlers::interventions::delete_task,
        handlers::interventions::create_document,
        handlers::interventions::list_documents,
        handlers::interventions::create_note,
        handlers::interventions::list_notes,

        // --- Inspections ---
        handlers::inspections::create_template,
        handlers::inspections::list_templates,
        handlers::inspections::create_inspection,
        handlers::inspections::list_inspections,
        handlers::inspections::get_inspection,
        handlers::inspections::update_inspection,
        handlers::inspections::delete_inspection,
        handlers::inspections::start_inspection,
        handlers::inspections::complete_inspection,
        handlers::inspections::validate_inspection,
        handlers::inspections::reject_inspection,
        handlers::inspections::create_item,
        handlers::inspections::list_items,
        handlers::inspections::update_item_value,
        handlers::inspections::create_media,
        handlers::inspections::list_media,
        handlers::inspections::create_signature,
        handlers::inspections::list_signatures,

        // --- Reports ---
        handlers::reports::create_template,
        handlers::reports::list_templates,
        handlers::reports::create_report,
        handlers::reports::list_reports,
        handlers::reports::get_report,
        handlers::reports::update_report,
        handlers::reports::delete_report,
        handlers::reports::list_history,
        handlers::reports::submit_report,
        handlers::reports::approve_report,
        handlers::reports::reject_report,
        handlers::reports::archive_report,
        handlers::reports::export_report,
        handlers::reports::list_exports,

        // --- Notifications ---
        handlers::notifications::create_template,
        handlers::notifications::list_templates,
        handlers::notifications::create_notification,
        handlers::notifications::list_my_notifications,
        handlers::notifications::unread_count,
        handlers::notifications::mark_read,
        handlers::notifications::mark_delivered,
        handlers::notifications::retry_notification,
        handlers::notifications::list_logs,
        handlers::notifications::get_preferences,
        handlers::notifications::update_preferences,

        // --- Geo ---
        handlers::geo::geocode,
        handlers::geo::reverse_geocode,
        handlers::geo::distance,
        handlers::geo::nearby,
        handlers::geo::bounds,

        // --- Sync ---
        handlers::sync::push,
        handlers::sync::pull,
        handlers::sync::list_conflicts,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Clients ---
            models::clients::ClientType,
            models::clients::ClientStatus,
            models::clients::ContractType,
            models::clients::ContractStatus,
            models::clients::PaymentMethod,
            models::clients::ContactRole,
            models::clients::ClientDocumentType,
            models::clients::ActivityAction,
            models::clients::Client,
            models::clients::ClientSite,
            models::clients::ClientContact,
            models::clients::ClientContract,
            models::clients::ClientDocument,
            models::clients::ClientActivityLog,
            models::clients::CreateClientPayload,
            models::clients::UpdateClientPayload,
            models::clients::CreateSitePayload,
            models::clients::CreateContactPayload,
            models::clients::CreateContractPayload,
            models::clients::CreateClientDocumentPayload,
            handlers::clients::GdprConsentPayload,

            // --- Interventions ---
            models::interventions::InterventionType,
            models::interventions::InterventionStatus,
            models::interventions::InterventionPriority,
            models::interventions::TaskStatus,
            models::interventions::InterventionDocumentType,
            models::interventions::Intervention,
            models::interventions::InterventionTask,
            models::interventions::InterventionDocument,
            models::interventions::InterventionNote,
            models::interventions::InterventionStats,
            models::interventions::CreateInterventionPayload,
            models::interventions::UpdateInterventionPayload,
            models::interventions::CreateTaskPayload,
            models::interventions::CreateInterventionDocumentPayload,
            models::interventions::CreateNotePayload,
            models::interventions::PostponePayload,
            handlers::interventions::TaskStatusPayload,

            // --- Inspections ---
            models::inspections::InspectionStatus,
            models::inspections::FieldType,
            models::inspections::InspectionTemplate,
            models::inspections::Inspection,
            models::inspections::InspectionItem,
            models::inspections::InspectionMedia,
            models::inspections::InspectionSignature,
            models::inspections::CreateTemplatePayload,
            models::inspections::CreateInspectionPayload,
            models::inspections::UpdateInspectionPayload,
            models::inspections::CreateItemPayload,
            models::inspections::UpdateItemValuePayload,
            models::inspections::CreateMediaPayload,
            models::inspections::CreateSignaturePayload,
            models::inspections::RejectPayload,

            // --- Reports ---
            models::reports::ReportTemplateType,
            models::reports::ReportType,
            models::reports::ReportStatus,
            models::reports::ReportExportStatus,
            models::reports::ReportTemplate,
            models::reports::InterventionReport,
            models::reports::ReportHistory,
            models::reports::ReportExport,
            models::reports::CreateReportTemplatePayload,
            models::reports::CreateReportPayload,
            models::reports::UpdateReportPayload,
            models::reports::ReviewPayload,

            // --- Notifications ---
            models::notifications::NotificationChannel,
            models::notifications::NotificationTrigger,
            models::notifications::NotificationStatus,
            models::notifications::NotificationLogAction,
            models::notifications::NotificationTemplate,
            models::notifications::Notification,
            models::notifications::NotificationPreference,
            models::notifications::NotificationLog,
            models::notifications::UnreadCount,
            models::notifications::CreateNotificationTemplatePayload,
            models::notifications::CreateNotificationPayload,
            models::notifications::UpdatePreferencePayload,

            // --- Geo ---
            models::geo::NearbyKind,
            models::geo::GeoPoint,
            models::geo::GeocodeResult,
            models::geo::ReverseGeocodeResult,
            models::geo::DistanceResult,
            models::geo::NearbyEntry,
            models::geo::GeoBounds,
            handlers::geo::DistancePayload,
            handlers::geo::BoundsPayload,

            // --- Sync ---
            models::sync::SyncAction,
            models::sync::SyncEntity,
            models::sync::SyncOutcome,
            models::sync::SyncItem,
            models::sync::SyncItemResult,
            models::sync::SyncPushResponse,
            models::sync::SyncConflict,
            handlers::sync::SyncPushPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e registro"),
        (name = "Users", description = "Dados do usuário"),
        (name = "Clients", description = "Clientes, sites, contatos e contratos"),
        (name = "Interventions", description = "Ordens de serviço e planejamento"),
        (name = "Inspections", description = "Formulários de inspeção em campo"),
        (name = "Reports", description = "Rapports de intervenção e aprovação"),
        (name = "Notifications", description = "Notificações e preferências"),
        (name = "Geo", description = "Geocodificação e proximidade"),
        (name = "Sync", description = "Sincronização offline")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
