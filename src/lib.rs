//! North Country Cooling site backend: public read models, link previews and
//! the session-protected admin API.

pub mod auth;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod facebook;
pub mod logging;
pub mod preview;
pub mod routes;
pub mod state;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use crate::config::{Config, ConfigError};
use crate::db::{ContentStore, DbConfig, MemoryStore, PgStore};
use crate::logging::LogConfig;
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("database setup failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("could not build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// CORS from `ALLOWED_ORIGINS` / `FRONTEND_ORIGIN`, falling back to the local
/// frontend dev server. Credentials are allowed so the session cookie flows.
pub fn configure_cors(config: &Config) -> CorsLayer {
    let mut origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    if origins.is_empty() {
        origins = vec![
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ];
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    let cors = configure_cors(&state.config);

    Router::new()
        .route("/api/site-data", get(routes::public::site_data))
        .route("/api/facebook-posts", get(routes::public::facebook_posts))
        .route("/api/links-data", get(routes::public::links_data))
        .route("/api/contact-links", get(routes::public::contact_links))
        .route("/api/link-previews", get(routes::public::link_previews))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/auth/session", get(routes::auth::session))
        .nest("/api/admin", routes::admin::router(state.clone()))
        .route("/health", get(routes::health::health_ping))
        .route("/health/database", get(routes::health::health_database))
        .with_state(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024))
        .layer(cors)
}

/// Postgres when `DATABASE_URL` is set, otherwise an in-memory store seeded
/// with the configured admin account.
async fn build_store(config: &Config) -> Result<Arc<dyn ContentStore>, StartupError> {
    let Some(url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set; using the in-memory content store, nothing is persisted");
        let store = MemoryStore::new();
        if let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password)
        {
            if let Err(e) = auth::ensure_admin(&store, username, password).await {
                tracing::error!(error = %e, "failed to seed admin user");
            }
        } else {
            tracing::warn!("ADMIN_USERNAME/ADMIN_PASSWORD not set; admin login is disabled");
        }
        return Ok(Arc::new(store));
    };

    let db_config = DbConfig::new(url.clone());
    let pool = match db::init_pool(&db_config).await {
        Ok(pool) => {
            if let Err(e) = db::run_migrations(&pool).await {
                tracing::error!(error = %e, "failed to run database migrations");
            }
            pool
        }
        Err(e) => {
            // Keep serving: public pages fall back to defaults until the
            // database comes back.
            tracing::error!(
                error = %e,
                url = %db::mask_database_url(url),
                "database unreachable at startup; migrations skipped"
            );
            db::lazy_pool(&db_config)?
        }
    };

    Ok(Arc::new(PgStore::new(pool)))
}

/// Run the server (used by main).
pub async fn run() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    // Guards MUST be held for the programme's lifetime; dropping them early
    // shuts down background log-writer threads and loses buffered log lines.
    let _log_guards = logging::init(&LogConfig::for_environment(config.is_production()));

    routes::health::init_start_time();

    if config.admin_username.is_none() {
        tracing::warn!("ADMIN_USERNAME not set; no session token will be accepted");
    }

    let store = build_store(&config).await?;
    let addr = config.bind_addr;
    let state = AppState::new(config, store)?;
    let app = create_app(state);

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
