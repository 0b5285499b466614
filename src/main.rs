// src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post, put},
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
use crate::middleware::auth::authorization_gate;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação (públicas, liberadas pelo gate)
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/register", post(handlers::auth::register))
        .route("/logout", post(handlers::auth::logout));

    let permission_routes = Router::new()
        .route(
            "/",
            get(handlers::permission::list_tree)
                .post(handlers::permission::create)
                .put(handlers::permission::update)
                .delete(handlers::permission::delete),
        )
        .route("/buttons", get(handlers::permission::list_buttons));

    let role_routes = Router::new()
        .route(
            "/",
            get(handlers::role::list)
                .post(handlers::role::create)
                .put(handlers::role::update)
                .delete(handlers::role::delete),
        )
        .route("/status", put(handlers::role::update_status));

    let user_routes = Router::new()
        .route(
            "/",
            get(handlers::user::list)
                .post(handlers::user::create)
                .put(handlers::user::update)
                .delete(handlers::user::delete),
        )
        .route("/me", get(handlers::auth::get_me))
        .route("/password", put(handlers::user::update_password));

    let content_routes = Router::new()
        .route(
            "/",
            get(handlers::content::list)
                .post(handlers::content::create)
                .put(handlers::content::update)
                .delete(handlers::content::delete),
        )
        .route("/{id}", get(handlers::content::detail))
        .route("/{id}/reviews", get(handlers::content::review_history))
        .route("/{id}/submit", post(handlers::content::submit_for_review))
        .route("/{id}/review", post(handlers::content::review))
        .route("/{id}/archive", post(handlers::content::archive));

    let log_routes = Router::new().route("/", get(handlers::audit::list));

    // O gate cobre tudo; as rotas públicas passam pela lista de exceções
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/permissions", permission_routes)
        .nest("/api/roles", role_routes)
        .nest("/api/users", user_routes)
        .nest("/api/contents", content_routes)
        .nest("/api/logs", log_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            authorization_gate,
        ))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
