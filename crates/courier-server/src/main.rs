use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use courier_api::auth::{self, AppState, AppStateInner};
use courier_api::messages;
use courier_api::middleware::require_principal;
use courier_api::users;
use courier_core::credentials::{CredentialStore, HashSettings};
use courier_core::directory::Directory;
use courier_core::messages::MessageStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "courier=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let db_path = std::env::var("COURIER_DB_PATH").unwrap_or_else(|_| "courier.db".into());
    let host = std::env::var("COURIER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("COURIER_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let hash = hash_settings_from_env()?;

    // Init database
    let db = Arc::new(courier_db::Database::open(&PathBuf::from(&db_path))?);

    // Shared state
    let directory = Directory::new(db.clone());
    let app_state: AppState = Arc::new(AppStateInner {
        credentials: CredentialStore::new(db.clone(), hash),
        messages: MessageStore::new(db, directory),
    });

    // Routes
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(app_state.clone());

    let protected_routes = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/{username}", get(users::get_user))
        .route("/users/{username}/messages/from", get(users::messages_from))
        .route("/users/{username}/messages/to", get(users::messages_to))
        .route("/messages", post(messages::send_message))
        .route("/messages/{id}", get(messages::get_message))
        .route("/messages/{id}/read", post(messages::mark_read))
        .layer(middleware::from_fn(require_principal))
        .with_state(app_state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("courier listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Argon2 work factor is deployment configuration; unset variables fall
/// back to the library defaults.
fn hash_settings_from_env() -> anyhow::Result<HashSettings> {
    let mut settings = HashSettings::default();
    if let Ok(v) = std::env::var("COURIER_ARGON2_MEMORY_KIB") {
        settings.memory_kib = v.parse()?;
    }
    if let Ok(v) = std::env::var("COURIER_ARGON2_ITERATIONS") {
        settings.iterations = v.parse()?;
    }
    if let Ok(v) = std::env::var("COURIER_ARGON2_PARALLELISM") {
        settings.parallelism = v.parse()?;
    }
    Ok(settings)
}
