//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;

use std::net::SocketAddr;

use auth::{
    AuthAppState, AuthBackend, PgCredentialStore, SqliteCredentialStore, auth_router,
    ensure_admin,
};
use axum::{
    Router, http,
    http::{Method, header},
};
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{AppConfig, Database};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "retomas_api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        environment = ?config.environment,
        database = config.database.kind(),
        "Configuration loaded"
    );

    match config.database.clone() {
        Database::Postgres(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&url)
                .await?;
            let store = PgCredentialStore::new(pool);
            store.migrate().await?;
            run(store, config).await
        }
        Database::Sqlite(url) => {
            let pool = SqlitePoolOptions::new()
                .max_connections(5)
                .connect(&url)
                .await?;
            let store = SqliteCredentialStore::new(pool);
            store.migrate().await?;
            run(store, config).await
        }
    }
}

async fn run<S>(store: S, config: AppConfig) -> anyhow::Result<()>
where
    S: AuthBackend,
{
    tracing::info!("Migrations completed");

    // First-run bootstrap
    match config.bootstrap_admin_password {
        Some(password) => {
            if ensure_admin(&store, password, config.auth.hash_algorithm).await? {
                tracing::warn!("Created the initial admin account; change its password");
            }
        }
        None => tracing::info!("BOOTSTRAP_ADMIN_PASSWORD not set, skipping admin bootstrap"),
    }

    if store.find_group(&config.auth.default_role).await?.is_none() {
        tracing::warn!(
            role = %config.auth.default_role,
            "DEFAULT_ROLE does not name an existing group"
        );
    }

    let state = AuthAppState::new(store, config.auth)?;
    let app = build_app(state, &config.frontend_origins);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn build_app<S>(state: AuthAppState<S>, frontend_origins: &[String]) -> Router
where
    S: AuthBackend,
{
    let allow_origin = if frontend_origins.is_empty() {
        AllowOrigin::any()
    } else {
        let origins: Vec<http::HeaderValue> = frontend_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
        ]));

    Router::new()
        .nest("/api", auth_router(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
