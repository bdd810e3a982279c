// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{
        ClientRepository, InspectionRepository, InterventionRepository, NotificationRepository,
        ReportRepository, SyncRepository, UserRepository,
    },
    services::{
        auth::AuthService, client_service::ClientService, document_service::DocumentService,
        geo_service::GeoService, inspection_service::InspectionService,
        intervention_service::InterventionService, notification_service::NotificationService,
        report_service::ReportService, sync_service::SyncService,
    },
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,

    pub auth_service: AuthService,
    pub client_service: ClientService,
    pub intervention_service: InterventionService,
    pub inspection_service: InspectionService,
    pub report_service: ReportService,
    pub notification_service: NotificationService,
    pub geo_service: GeoService,
    pub sync_service: SyncService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let client_repo = ClientRepository::new(db_pool.clone());
        let intervention_repo = InterventionRepository::new(db_pool.clone());
        let inspection_repo = InspectionRepository::new(db_pool.clone());
        let report_repo = ReportRepository::new(db_pool.clone());
        let notification_repo = NotificationRepository::new(db_pool.clone());
        let sync_repo = SyncRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, jwt_secret.clone());
        let notification_service =
            NotificationService::new(notification_repo, db_pool.clone());
        let client_service = ClientService::new(client_repo.clone());
        let intervention_service =
            InterventionService::new(intervention_repo.clone(), notification_service.clone());
        let inspection_service = InspectionService::new(inspection_repo.clone());
        let document_service = DocumentService::new(intervention_repo.clone(), client_repo.clone());
        let report_service =
            ReportService::new(report_repo, intervention_repo, document_service);
        let geo_service = GeoService::new(client_repo);
        let sync_service = SyncService::new(sync_repo, inspection_repo);

        Ok(Self {
            db_pool,
            jwt_secret,
            auth_service,
            client_service,
            intervention_service,
            inspection_service,
            report_service,
            notification_service,
            geo_service,
            sync_service,
        })
    }
}
