// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("backend=info")),
        )
        .with_target(false)
        .compact()
        .init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rotas de usuário (protegidas)
    let user_routes = Router::new().route("/me", get(handlers::auth::get_me));

    let client_routes = Router::new()
        .route(
            "/",
            post(handlers::clients::create_client).get(handlers::clients::list_clients),
        )
        .route(
            "/{id}",
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        )
        .route("/{id}/gdpr-consent", post(handlers::clients::record_gdpr_consent))
        .route("/{id}/activity", get(handlers::clients::list_activity))
        .route(
            "/{id}/sites",
            post(handlers::clients::create_site).get(handlers::clients::list_sites),
        )
        .route("/sites/{site_id}", axum::routing::delete(handlers::clients::delete_site))
        .route(
            "/{id}/contacts",
            post(handlers::clients::create_contact).get(handlers::clients::list_contacts),
        )
        .route(
            "/contacts/{contact_id}",
            axum::routing::delete(handlers::clients::delete_contact),
        )
        .route(
            "/{id}/contracts",
            post(handlers::clients::create_contract).get(handlers::clients::list_contracts),
        )
        .route(
            "/{id}/documents",
            post(handlers::clients::create_document).get(handlers::clients::list_documents),
        );

    let intervention_routes = Router::new()
        .route(
            "/",
            post(handlers::interventions::create_intervention)
                .get(handlers::interventions::list_interventions),
        )
        .route("/calendar", get(handlers::interventions::calendar))
        .route("/stats", get(handlers::interventions::stats))
        .route(
            "/{id}",
            get(handlers::interventions::get_intervention)
                .put(handlers::interventions::update_intervention)
                .delete(handlers::interventions::delete_intervention),
        )
        .route("/{id}/start", post(handlers::interventions::start_intervention))
        .route("/{id}/complete", post(handlers::interventions::complete_intervention))
        .route("/{id}/cancel", post(handlers::interventions::cancel_intervention))
        .route("/{id}/postpone", post(handlers::interventions::postpone_intervention))
        .route(
            "/{id}/tasks",
            post(handlers::interventions::create_task).get(handlers::interventions::list_tasks),
        )
        .route(
            "/tasks/{task_id}/status",
            put(handlers::interventions::set_task_status),
        )
        .route(
            "/tasks/{task_id}",
            axum::routing::delete(handlers::interventions::delete_task),
        )
        .route(
            "/{id}/documents",
            post(handlers::interventions::create_document)
                .get(handlers::interventions::list_documents),
        )
        .route(
            "/{id}/notes",
            post(handlers::interventions::create_note).get(handlers::interventions::list_notes),
        );

    let inspection_routes = Router::new()
        .route(
            "/templates",
            post(handlers::inspections::create_template)
                .get(handlers::inspections::list_templates),
        )
        .route(
            "/",
            post(handlers::inspections::create_inspection)
                .get(handlers::inspections::list_inspections),
        )
        .route(
            "/{id}",
            get(handlers::inspections::get_inspection)
                .put(handlers::inspections::update_inspection)
                .delete(handlers::inspections::delete_inspection),
        )
        .route("/{id}/start", post(handlers::inspections::start_inspection))
        .route("/{id}/complete", post(handlers::inspections::complete_inspection))
        .route("/{id}/validate", post(handlers::inspections::validate_inspection))
        .route("/{id}/reject", post(handlers::inspections::reject_inspection))
        .route(
            "/{id}/items",
            post(handlers::inspections::create_item).get(handlers::inspections::list_items),
        )
        .route(
            "/items/{item_id}",
            put(handlers::inspections::update_item_value),
        )
        .route(
            "/{id}/media",
            post(handlers::inspections::create_media).get(handlers::inspections::list_media),
        )
        .route(
            "/{id}/signatures",
            post(handlers::inspections::create_signature)
                .get(handlers::inspections::list_signatures),
        );

    let report_routes = Router::new()
        .route(
            "/templates",
            post(handlers::reports::create_template).get(handlers::reports::list_templates),
        )
        .route(
            "/",
            post(handlers::reports::create_report).get(handlers::reports::list_reports),
        )
        .route(
            "/{id}",
            get(handlers::reports::get_report)
                .put(handlers::reports::update_report)
                .delete(handlers::reports::delete_report),
        )
        .route("/{id}/history", get(handlers::reports::list_history))
        .route("/{id}/submit", post(handlers::reports::submit_report))
        .route("/{id}/approve", post(handlers::reports::approve_report))
        .route("/{id}/reject", post(handlers::reports::reject_report))
        .route("/{id}/archive", post(handlers::reports::archive_report))
        .route("/{id}/export", post(handlers::reports::export_report))
        .route("/{id}/exports", get(handlers::reports::list_exports));

    let notification_routes = Router::new()
        .route(
            "/templates",
            post(handlers::notifications::create_template)
                .get(handlers::notifications::list_templates),
        )
        .route(
            "/",
            post(handlers::notifications::create_notification)
                .get(handlers::notifications::list_my_notifications),
        )
        .route("/unread-count", get(handlers::notifications::unread_count))
        .route(
            "/preferences",
            get(handlers::notifications::get_preferences)
                .put(handlers::notifications::update_preferences),
        )
        .route("/{id}/mark-read", post(handlers::notifications::mark_read))
        .route("/{id}/mark-delivered", post(handlers::notifications::mark_delivered))
        .route("/{id}/retry", post(handlers::notifications::retry_notification))
        .route("/{id}/logs", get(handlers::notifications::list_logs));

    let geo_routes = Router::new()
        .route("/geocode", get(handlers::geo::geocode))
        .route("/reverse", get(handlers::geo::reverse_geocode))
        .route("/distance", post(handlers::geo::distance))
        .route("/nearby", get(handlers::geo::nearby))
        .route("/bounds", post(handlers::geo::bounds));

    let sync_routes = Router::new()
        .route("/push", post(handlers::sync::push))
        .route("/pull", get(handlers::sync::pull))
        .route("/conflicts", get(handlers::sync::list_conflicts));

    // Tudo que não é auth passa pelo guard de autenticação
    let protected = Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/clients", client_routes)
        .nest("/api/interventions", intervention_routes)
        .nest("/api/inspections", inspection_routes)
        .nest("/api/reports", report_routes)
        .nest("/api/notifications", notification_routes)
        .nest("/api/geo", geo_routes)
        .nest("/api/sync", sync_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .merge(protected)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
