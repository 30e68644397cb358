//! Study Vault catalog backend
//!
//! REST backend for browsing universities and study materials, with SQLite persistence.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use study_vault_backend::auth::TokenService;
use study_vault_backend::config::{Config, LogFormat};
use study_vault_backend::db::{self, Repository};
use study_vault_backend::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!("Starting Study Vault backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.admin.is_none() {
        tracing::warn!(
            "No super admin configured (CATALOG_ADMIN_EMAIL / CATALOG_ADMIN_PASSWORD). Bypass login is disabled!"
        );
    }
    if config.jwt_secret_ephemeral {
        tracing::warn!("No CATALOG_JWT_SECRET set. Tokens will not survive a restart!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    let orphans = repo.purge_orphaned_materials().await?;
    if orphans > 0 {
        tracing::warn!("Removed {} materials referencing deleted universities", orphans);
    }

    let tokens = Arc::new(TokenService::new(&config.jwt_secret));

    // Create application state
    let state = AppState {
        repo,
        tokens,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
